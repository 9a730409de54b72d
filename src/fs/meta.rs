//! Metadata helpers applied to the staged file: permission bits and on-disk digest.
use std::io::{self, Read};
use std::path::Path;

use rustix::fs::{chmod, Mode, RawMode};

use crate::adapters::ChecksumAlgorithm;
use crate::fs::atomic::errno_to_io;
use crate::types::errors::{Result, WriteError};
use crate::types::request::check_mode;

/// Set permission bits on `path`.
///
/// # Errors
///
/// `InvalidMode` for values above `0o7777` or not representable on this platform,
/// `ChmodFailed` if the syscall fails.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let mode = check_mode(mode)?;
    let raw = RawMode::try_from(mode)
        .map_err(|_| WriteError::InvalidMode(format!("{mode:o} not representable")))?;
    chmod(path, Mode::from_raw_mode(raw)).map_err(|e| WriteError::ChmodFailed {
        path: path.to_path_buf(),
        mode,
        source: errno_to_io(e),
    })
}

/// Hex digest of the file at `path`, read back from disk in `chunk`-sized reads.
///
/// # Errors
///
/// Returns an IO error if the file cannot be opened or read.
pub fn digest_of(path: &Path, algo: &dyn ChecksumAlgorithm, chunk: usize) -> io::Result<String> {
    let mut f = std::fs::File::open(path)?;
    let mut hasher = algo.hasher();
    let mut buf = vec![0u8; chunk.max(1)];
    loop {
        match f.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buf[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(hasher.finalize_hex())
}
