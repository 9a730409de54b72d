//! Cancellation via the token aborts the write and removes the temp file.

use std::io::{self, Read};

use crate::common::{strays, with_temp_root, writer};
use stagedwrite::{CancelToken, WriteError, WriteRequest};

/// Cancels the token after serving its first chunk.
struct CancelAfterFirst {
    token: CancelToken,
    remaining: usize,
}

impl Read for CancelAfterFirst {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Ok(0);
        }
        let n = self.remaining.min(buf.len()).min(16);
        buf[..n].fill(b'z');
        self.remaining -= n;
        self.token.cancel();
        Ok(n)
    }
}

#[test]
fn cancel_mid_stream_aborts() {
    let td = with_temp_root();
    let target = td.path().join("t");
    std::fs::write(&target, b"original").unwrap();
    let token = CancelToken::new();
    let w = writer().with_cancel_token(token.clone());
    let src = CancelAfterFirst {
        token,
        remaining: 1024,
    };
    let err = w
        .write(WriteRequest::new(&target).reader(src))
        .unwrap_err();
    assert!(matches!(err, WriteError::Cancelled));
    assert_eq!(std::fs::read(&target).unwrap(), b"original");
    assert!(strays(td.path(), &["t"]).is_empty());
}

#[test]
fn cancelled_token_rejects_buffer_write() {
    let td = with_temp_root();
    let target = td.path().join("t");
    let token = CancelToken::new();
    token.cancel();
    let w = writer().with_cancel_token(token);
    let err = w
        .write(WriteRequest::new(&target).bytes(b"data"))
        .unwrap_err();
    assert!(matches!(err, WriteError::Cancelled));
    assert!(!target.exists());
    assert!(strays(td.path(), &[]).is_empty());
}

#[test]
fn token_tracks_temp_file_only_while_staged() {
    use stagedwrite::WriteOptions;
    use std::io::Write;

    let td = with_temp_root();
    let token = CancelToken::new();
    let w = writer().with_cancel_token(token.clone());

    let mut staged = w.begin(td.path().join("a"), WriteOptions::default()).unwrap();
    staged.write_all(b"a").unwrap();
    assert_eq!(token.staged_paths(), vec![staged.path().to_path_buf()]);
    staged.commit().unwrap();
    assert!(token.staged_paths().is_empty());

    let mut staged = w.begin(td.path().join("b"), WriteOptions::default()).unwrap();
    staged.write_all(b"b").unwrap();
    // A host giving up on a stuck write removes the file through the token.
    token.remove_staged().unwrap();
    assert!(!staged.path().exists());
    staged.abort().unwrap();
    assert!(token.staged_paths().is_empty());
    assert!(strays(td.path(), &["a"]).is_empty());
}
