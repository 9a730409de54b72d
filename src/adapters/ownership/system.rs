// Default AccountDb implementation backed by the system user/group database (Unix-only)

use nix::unistd::{Group, User};

use super::AccountDb;
use crate::types::OwnershipError;

#[derive(Copy, Clone, Debug, Default)]
pub struct SystemAccountDb;

impl AccountDb for SystemAccountDb {
    fn uid_of(&self, name: &str) -> Result<Option<u32>, OwnershipError> {
        User::from_name(name)
            .map(|u| u.map(|u| u.uid.as_raw()))
            .map_err(|e| OwnershipError::Lookup {
                name: name.to_string(),
                source: e.into(),
            })
    }

    fn gid_of(&self, name: &str) -> Result<Option<u32>, OwnershipError> {
        Group::from_name(name)
            .map(|g| g.map(|g| g.gid.as_raw()))
            .map_err(|e| OwnershipError::Lookup {
                name: name.to_string(),
                source: e.into(),
            })
    }
}
