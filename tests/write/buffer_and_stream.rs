//! Successful writes leave exactly the supplied bytes at the target, whatever the source.

use std::io::Cursor;

use crate::common::{strays, with_temp_root, writer};
use stagedwrite::policy::Policy;
use stagedwrite::logging::JsonlSink;
use stagedwrite::{AtomicWriter, WriteRequest};

#[test]
fn buffer_source_creates_target() {
    let td = with_temp_root();
    let target = td.path().join("motd");
    let report = writer()
        .write(WriteRequest::new(&target).bytes(b"hello\n"))
        .unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"hello\n");
    assert_eq!(report.bytes_written, 6);
    assert_eq!(report.target, target);
    assert!(report.checksum.is_none());
    assert!(strays(td.path(), &["motd"]).is_empty());
}

#[test]
fn stream_source_replaces_existing_target() {
    let td = with_temp_root();
    let target = td.path().join("data.bin");
    std::fs::write(&target, b"old contents that are longer than the new ones").unwrap();
    let payload: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    writer()
        .write(WriteRequest::new(&target).reader(Cursor::new(payload.clone())))
        .unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), payload);
    assert!(strays(td.path(), &["data.bin"]).is_empty());
}

#[test]
fn stream_spanning_many_small_chunks() {
    let td = with_temp_root();
    let target = td.path().join("chunked");
    let mut policy = Policy::default();
    policy.staging.copy_buffer_size = 7;
    let w = AtomicWriter::new(JsonlSink, JsonlSink, policy);
    let payload = b"the quick brown fox jumps over the lazy dog".to_vec();
    let report = w
        .write(
            WriteRequest::new(&target)
                .reader(Cursor::new(payload.clone()))
                .checksum(true),
        )
        .unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), payload);
    assert_eq!(report.bytes_written, payload.len() as u64);
}

#[test]
fn empty_buffer_produces_empty_file() {
    let td = with_temp_root();
    let target = td.path().join("empty");
    writer().write(WriteRequest::new(&target).bytes(b"")).unwrap();
    assert_eq!(std::fs::metadata(&target).unwrap().len(), 0);
}

#[test]
fn missing_parent_is_created_when_allowed() {
    let td = with_temp_root();
    let target = td.path().join("etc/app/conf.d/app.conf");
    writer()
        .write(
            WriteRequest::new(&target)
                .bytes(b"k=v\n")
                .create_parent_dirs(true),
        )
        .unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"k=v\n");
}

#[test]
fn binary_mode_does_not_alter_bytes() {
    let td = with_temp_root();
    let target = td.path().join("crlf");
    let payload = b"line1\r\nline2\n\x00\xff";
    writer()
        .write(WriteRequest::new(&target).bytes(payload).binary_mode(true))
        .unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), payload);
}
