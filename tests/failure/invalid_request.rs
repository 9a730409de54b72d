//! Requests missing required fields are rejected before anything touches the disk.

use crate::common::{strays, with_temp_root, writer};
use stagedwrite::{WriteError, WriteRequest};

#[test]
fn missing_target_is_invalid() {
    let req = WriteRequest {
        target: None,
        ..WriteRequest::default()
    }
    .bytes(b"x");
    assert!(matches!(writer().write(req), Err(WriteError::InvalidRequest(_))));
}

#[test]
fn missing_source_is_invalid() {
    let td = with_temp_root();
    let target = td.path().join("t");
    let err = writer().write(WriteRequest::new(&target)).unwrap_err();
    assert!(matches!(err, WriteError::InvalidRequest(_)));
    assert!(strays(td.path(), &[]).is_empty());
}

#[test]
fn target_without_file_name_is_invalid() {
    let td = with_temp_root();
    let err = writer()
        .write(WriteRequest::new(td.path().join("..")).bytes(b"x"))
        .unwrap_err();
    assert!(matches!(err, WriteError::InvalidRequest(_)));
}

#[test]
fn missing_parent_without_permission_fails() {
    let td = with_temp_root();
    let target = td.path().join("no/such/dir/t");
    let err = writer()
        .write(WriteRequest::new(&target).bytes(b"x"))
        .unwrap_err();
    assert!(matches!(err, WriteError::MissingParentDir(_)));
    assert!(!td.path().join("no").exists());
}
