//! Rename primitives for the final commit step.
//!
//! The rename is issued through directory handles:
//! `open(staging_dir, O_DIRECTORY) + open(target_dir, O_DIRECTORY)`, then
//! `renameat -> fsync(target_dir)`.
//! Both directories sit on the same partition (checked earlier), so `renameat` replaces the
//! target's directory entry in one step: readers see the old file or the new one, never a
//! mixture and never a missing file.
use std::io;
use std::path::Path;

use rustix::fd::OwnedFd;
use rustix::fs::{openat, renameat, Mode, OFlags, CWD};
use rustix::io::Errno;

pub(crate) fn errno_to_io(e: Errno) -> io::Error {
    io::Error::from_raw_os_error(e.raw_os_error())
}

/// Directory that holds `path`; `.` for bare file names.
pub(crate) fn dir_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Open a directory with `O_DIRECTORY` for `*at` operations.
///
/// # Errors
///
/// Returns an IO error if the directory cannot be opened.
pub fn open_dir(dir: &Path) -> io::Result<OwnedFd> {
    openat(
        CWD,
        dir,
        OFlags::RDONLY | OFlags::DIRECTORY | OFlags::CLOEXEC,
        Mode::empty(),
    )
    .map_err(errno_to_io)
}

/// Fsync the parent directory of `path` for durability.
///
/// # Errors
///
/// Returns an IO error if the parent directory cannot be opened or fsynced.
pub fn fsync_parent_dir(path: &Path) -> io::Result<()> {
    let dirfd = open_dir(dir_of(path))?;
    rustix::fs::fsync(&dirfd).map_err(errno_to_io)
}

/// Atomically rename `staged` onto `target`.
///
/// # Errors
///
/// Returns an IO error if either directory cannot be opened or `renameat` fails
/// (`EXDEV` when the two sit on different filesystems).
pub fn rename_into_place(staged: &Path, target: &Path) -> io::Result<()> {
    let invalid = |what: &str| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{what} has no file name"),
        )
    };
    let staged_name = staged.file_name().ok_or_else(|| invalid("staged path"))?;
    let target_name = target.file_name().ok_or_else(|| invalid("target path"))?;
    let from_dir = open_dir(dir_of(staged))?;
    let to_dir = open_dir(dir_of(target))?;
    renameat(&from_dir, staged_name, &to_dir, target_name).map_err(errno_to_io)
}
