//! Ownership changes that an unprivileged test run can perform: handing a file to the
//! caller's own uid/gid, by number and through a name database.

use std::os::unix::fs::MetadataExt;

use crate::common::{strays, with_temp_root, writer};
use nix::unistd::{getgid, getuid};
use stagedwrite::adapters::AccountDb;
use stagedwrite::types::OwnershipError;
use stagedwrite::{WriteError, WriteRequest};

/// Knows one user `svc` and one group `svcgrp`, both mapped to the caller's ids.
struct SelfDb;

impl AccountDb for SelfDb {
    fn uid_of(&self, name: &str) -> Result<Option<u32>, OwnershipError> {
        Ok((name == "svc").then(|| getuid().as_raw()))
    }
    fn gid_of(&self, name: &str) -> Result<Option<u32>, OwnershipError> {
        Ok((name == "svcgrp").then(|| getgid().as_raw()))
    }
}

#[test]
fn numeric_owner_spec_applies() {
    let td = with_temp_root();
    let target = td.path().join("t");
    let spec = format!("{}:{}", getuid().as_raw(), getgid().as_raw());
    writer()
        .write(WriteRequest::new(&target).bytes(b"x").owner(spec))
        .unwrap();
    let md = std::fs::metadata(&target).unwrap();
    assert_eq!(md.uid(), getuid().as_raw());
    assert_eq!(md.gid(), getgid().as_raw());
}

#[test]
fn group_only_spec_applies() {
    let td = with_temp_root();
    let target = td.path().join("t");
    writer()
        .write(
            WriteRequest::new(&target)
                .bytes(b"x")
                .owner(format!(":{}", getgid().as_raw())),
        )
        .unwrap();
    assert_eq!(std::fs::metadata(&target).unwrap().gid(), getgid().as_raw());
}

#[test]
fn names_resolve_through_account_db() {
    let td = with_temp_root();
    let w = writer().with_account_db(Box::new(SelfDb));
    for (name, spec) in [("colon", "svc:svcgrp"), ("dot", "svc.svcgrp"), ("user", "svc")] {
        let target = td.path().join(name);
        w.write(WriteRequest::new(&target).bytes(b"x").owner(spec))
            .unwrap();
        assert_eq!(std::fs::metadata(&target).unwrap().uid(), getuid().as_raw());
    }
}

#[test]
fn unknown_group_aborts_without_rename() {
    let td = with_temp_root();
    let target = td.path().join("t");
    std::fs::write(&target, b"original").unwrap();
    let err = writer()
        .with_account_db(Box::new(SelfDb))
        .write(WriteRequest::new(&target).bytes(b"new").owner("svc:nogroup"))
        .unwrap_err();
    assert!(matches!(
        err,
        WriteError::Ownership(OwnershipError::UnknownGroup(ref g)) if g == "nogroup"
    ));
    assert_eq!(std::fs::read(&target).unwrap(), b"original");
    assert!(strays(td.path(), &["t"]).is_empty());
}

/// The caller's own user and group names, when the system database knows them.
fn own_names() -> Option<(String, String)> {
    use nix::unistd::{Group, User};
    let user = User::from_uid(getuid()).ok().flatten()?;
    let group = Group::from_gid(getgid()).ok().flatten()?;
    Some((user.name, group.name))
}

#[test]
fn parse_and_apply_resolves_names_from_system_db() {
    use stagedwrite::adapters::ownership::parse_and_apply;

    let Some((user, group)) = own_names() else {
        return;
    };
    let td = with_temp_root();
    for spec in [format!("{user}:{group}"), format!(":{group}")] {
        let path = td.path().join("f");
        std::fs::write(&path, b"x").unwrap();
        parse_and_apply(&spec, &path).unwrap();
        let md = std::fs::metadata(&path).unwrap();
        assert_eq!(md.uid(), getuid().as_raw(), "{spec}");
        assert_eq!(md.gid(), getgid().as_raw(), "{spec}");
    }
}

#[test]
fn write_resolves_owner_names_from_system_db() {
    let Some((user, group)) = own_names() else {
        return;
    };
    let td = with_temp_root();
    let target = td.path().join("t");
    writer()
        .write(
            WriteRequest::new(&target)
                .bytes(b"x")
                .owner(format!("{user}:{group}")),
        )
        .unwrap();
    let md = std::fs::metadata(&target).unwrap();
    assert_eq!(md.uid(), getuid().as_raw());
    assert_eq!(md.gid(), getgid().as_raw());
}
