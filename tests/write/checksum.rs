//! Checksum verification re-reads the staged file from disk.

use std::io::Cursor;

use crate::common::{sha256_hex, strays, with_temp_root, writer};
use stagedwrite::adapters::Sha512Checksum;
use stagedwrite::{WriteError, WriteRequest};

#[test]
fn streamed_digest_round_trip_succeeds() {
    let td = with_temp_root();
    let target = td.path().join("t");
    let report = writer()
        .write(
            WriteRequest::new(&target)
                .reader(Cursor::new(b"payload".to_vec()))
                .checksum(true),
        )
        .unwrap();
    assert_eq!(report.checksum.as_deref(), Some(sha256_hex(b"payload").as_str()));
}

#[test]
fn matching_expected_checksum_is_accepted_case_insensitively() {
    let td = with_temp_root();
    let target = td.path().join("t");
    let expected = sha256_hex(b"payload").to_ascii_uppercase();
    writer()
        .write(
            WriteRequest::new(&target)
                .bytes(b"payload")
                .expected_checksum(expected),
        )
        .unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"payload");
}

#[test]
fn wrong_expected_checksum_is_rejected_and_target_kept() {
    let td = with_temp_root();
    let target = td.path().join("t");
    std::fs::write(&target, b"keep me").unwrap();
    let err = writer()
        .write(
            WriteRequest::new(&target)
                .bytes(b"payload")
                .checksum(true)
                .expected_checksum(sha256_hex(b"something else")),
        )
        .unwrap_err();
    match err {
        WriteError::ChecksumMismatch { expected, actual } => {
            assert_eq!(expected, sha256_hex(b"something else"));
            assert_eq!(actual, sha256_hex(b"payload"));
        }
        other => panic!("expected ChecksumMismatch, got {other:?}"),
    }
    assert_eq!(std::fs::read(&target).unwrap(), b"keep me");
    assert!(strays(td.path(), &["t"]).is_empty());
}

#[test]
fn alternate_algorithm_is_used_for_both_passes() {
    let td = with_temp_root();
    let target = td.path().join("t");
    let w = writer().with_checksum_algorithm(Box::new(Sha512Checksum));
    let report = w
        .write(WriteRequest::new(&target).bytes(b"abc").checksum(true))
        .unwrap();
    assert_eq!(report.checksum.map(|c| c.len()), Some(128));
}
