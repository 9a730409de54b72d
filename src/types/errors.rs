//! Error types used across stagedwrite.
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::StageState;

/// Failure while resolving or applying an owner spec.
#[derive(Debug, Error)]
pub enum OwnershipError {
    #[error("unknown user: {0}")]
    UnknownUser(String),
    #[error("unknown group: {0}")]
    UnknownGroup(String),
    #[error("user/group database lookup failed for {name}: {source}")]
    Lookup {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("chown {path}: {source}")]
    Chown {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Every way a staged write can fail. All variants are terminal for the write that produced
/// them; nothing is retried internally.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("parent directory {0} does not exist")]
    MissingParentDir(PathBuf),
    #[error("{dir}: cannot create directory: {source}")]
    CreateDirFailed {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "staging directory {staging} (dev {staging_dev}) is on a different partition than \
         {parent} (dev {parent_dev})"
    )]
    CrossPartition {
        staging: PathBuf,
        staging_dev: u64,
        parent: PathBuf,
        parent_dev: u64,
    },
    #[error("invalid temp name template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },
    #[error("cannot create temp file in {dir}: {source}")]
    StageFailed {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write to {path} failed: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sync of {path} failed: {source}")]
    SyncFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("wrote {written} bytes, which does not exceed min_size {min_size}")]
    BelowMinSize { written: u64, min_size: u64 },
    #[error("checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },
    #[error("close of {path} failed: {source}")]
    CloseFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid file mode: {0}")]
    InvalidMode(String),
    #[error("chmod {mode:o} on {path} failed: {source}")]
    ChmodFailed {
        path: PathBuf,
        mode: u32,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Ownership(#[from] OwnershipError),
    #[error("rename {from} -> {to} failed: {source}")]
    RenameFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write cancelled")]
    Cancelled,
    #[error("staged write is {0}, not open")]
    NotOpen(StageState),
}

/// Convenient alias for results returning a `WriteError`.
pub type Result<T> = std::result::Result<T, WriteError>;

impl From<WriteError> for io::Error {
    fn from(e: WriteError) -> Self {
        match e {
            WriteError::WriteFailed { source, .. } => source,
            WriteError::NotOpen(_) => io::Error::new(io::ErrorKind::BrokenPipe, e),
            WriteError::Cancelled => io::Error::new(io::ErrorKind::Interrupted, e),
            other => io::Error::other(other),
        }
    }
}
