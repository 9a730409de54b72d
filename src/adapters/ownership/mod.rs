//! Owner spec parsing (`USER[:GROUP]` / `USER[.GROUP]`) and application.
//!
//! Parsing is pure given an [`AccountDb`]; application issues a single `chown(2)` and is
//! skipped entirely when neither id changes.
pub mod system;

use std::path::Path;

use nix::unistd::{chown, Gid, Uid};

use crate::constants::OWNER_DELIMITERS;
use crate::types::{OwnerChange, OwnershipError};

pub use system::SystemAccountDb;

/// Name-to-id lookups against a user/group database.
pub trait AccountDb: Send + Sync {
    /// Resolve a user name. `Ok(None)` means the name does not exist.
    /// # Errors
    /// Returns an error if the database itself cannot be queried.
    fn uid_of(&self, name: &str) -> Result<Option<u32>, OwnershipError>;
    /// Resolve a group name. `Ok(None)` means the name does not exist.
    /// # Errors
    /// Returns an error if the database itself cannot be queried.
    fn gid_of(&self, name: &str) -> Result<Option<u32>, OwnershipError>;
}

fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Split on the first `:`, or on the first `.` when no `:` is present.
fn split_spec(spec: &str) -> (&str, Option<&str>) {
    let delim = OWNER_DELIMITERS
        .iter()
        .find_map(|d| spec.find(*d));
    match delim {
        Some(i) => (&spec[..i], Some(&spec[i + 1..])),
        None => (spec, None),
    }
}

/// Parse an owner spec into numeric ids.
///
/// Empty user or empty/absent group leave that id unchanged; the group never defaults to
/// the user's primary group.
///
/// # Errors
///
/// Returns `UnknownUser`/`UnknownGroup` for names the database does not know, or an id
/// that does not fit in 32 bits.
pub fn parse_owner_spec(spec: &str, db: &dyn AccountDb) -> Result<OwnerChange, OwnershipError> {
    let (user, group) = split_spec(spec.trim());
    let uid = match user {
        "" => None,
        u if is_numeric_id(u) => Some(
            u.parse::<u32>()
                .map_err(|_| OwnershipError::UnknownUser(u.to_string()))?,
        ),
        u => Some(
            db.uid_of(u)?
                .ok_or_else(|| OwnershipError::UnknownUser(u.to_string()))?,
        ),
    };
    let gid = match group {
        None | Some("") => None,
        Some(g) if is_numeric_id(g) => Some(
            g.parse::<u32>()
                .map_err(|_| OwnershipError::UnknownGroup(g.to_string()))?,
        ),
        Some(g) => Some(
            db.gid_of(g)?
                .ok_or_else(|| OwnershipError::UnknownGroup(g.to_string()))?,
        ),
    };
    Ok(OwnerChange { uid, gid })
}

/// Apply `change` to `path`. A change with both ids unset issues no syscall.
///
/// # Errors
///
/// Returns `OwnershipError::Chown` carrying the OS error (e.g. `EPERM`).
pub fn apply_owner_change(change: OwnerChange, path: &Path) -> Result<(), OwnershipError> {
    if change.is_noop() {
        return Ok(());
    }
    chown(
        path,
        change.uid.map(Uid::from_raw),
        change.gid.map(Gid::from_raw),
    )
    .map_err(|e| OwnershipError::Chown {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Parse `spec` against the system database and apply it to `path`.
///
/// # Errors
///
/// Propagates parse and chown failures.
pub fn parse_and_apply(spec: &str, path: &Path) -> Result<(), OwnershipError> {
    parse_and_apply_with(spec, path, &SystemAccountDb).map(|_| ())
}

/// [`parse_and_apply`] with an explicit database.
///
/// # Errors
///
/// Propagates parse and chown failures.
pub fn parse_and_apply_with(
    spec: &str,
    path: &Path,
    db: &dyn AccountDb,
) -> Result<OwnerChange, OwnershipError> {
    let change = parse_owner_spec(spec, db)?;
    apply_owner_change(change, path)?;
    Ok(change)
}
