//! Caller-facing description of one atomic write.
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::errors::{Result, WriteError};
use crate::constants::MAX_FILE_MODE;

/// Where the new content comes from.
pub enum DataSource<'a> {
    /// In-memory buffer, written in one call.
    Bytes(&'a [u8]),
    /// Readable stream, copied chunk by chunk until EOF.
    Reader(Box<dyn Read + 'a>),
}

impl fmt::Debug for DataSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            DataSource::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

/// Staging, validation and finalization knobs shared by [`crate::AtomicWriter::write`] and
/// [`crate::AtomicWriter::begin`].
#[derive(Clone, Debug, Default)]
pub struct WriteOptions {
    /// Directory to stage the temp file in. Defaults to the target's parent directory and
    /// must live on the same partition.
    pub temp_dir: Option<PathBuf>,
    /// Temp filename template ending in a run of `X`. Defaults to `Policy::default_template`.
    pub temp_template: Option<String>,
    /// Create missing parent (and staging) directories instead of failing.
    pub create_parent_dirs: bool,
    /// Written length must be strictly greater than this.
    pub min_size: Option<u64>,
    /// Hash bytes while streaming and verify them against a re-read of the staged file.
    pub checksum: bool,
    /// Hex digest to verify against instead of the streamed one. Implies `checksum`.
    pub expected_checksum: Option<String>,
    /// Raw transfer mode. Unix has no text mode, so this never alters bytes.
    pub binary_mode: bool,
    /// Permission bits applied to the staged file before rename.
    pub file_mode: Option<u32>,
    /// `USER[:GROUP]` applied to the staged file before rename.
    pub owner: Option<String>,
}

impl WriteOptions {
    #[must_use]
    pub fn verifies_checksum(&self) -> bool {
        self.checksum || self.expected_checksum.is_some()
    }

    /// Whether digest state must be accumulated while streaming.
    #[must_use]
    pub fn streams_checksum(&self) -> bool {
        self.checksum && self.expected_checksum.is_none()
    }
}

/// One atomic replacement of `target` with the bytes of `source`.
///
/// Both `target` and `source` are required; [`crate::AtomicWriter::write`] rejects a
/// request missing either with `WriteError::InvalidRequest`.
#[derive(Debug, Default)]
pub struct WriteRequest<'a> {
    pub target: Option<PathBuf>,
    pub source: Option<DataSource<'a>>,
    pub options: WriteOptions,
}

impl<'a> WriteRequest<'a> {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: Some(target.into()),
            source: None,
            options: WriteOptions::default(),
        }
    }

    #[must_use]
    pub fn bytes(mut self, data: &'a [u8]) -> Self {
        self.source = Some(DataSource::Bytes(data));
        self
    }

    #[must_use]
    pub fn reader(mut self, r: impl Read + 'a) -> Self {
        self.source = Some(DataSource::Reader(Box::new(r)));
        self
    }

    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.temp_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn temp_template(mut self, template: impl Into<String>) -> Self {
        self.options.temp_template = Some(template.into());
        self
    }

    #[must_use]
    pub fn create_parent_dirs(mut self, yes: bool) -> Self {
        self.options.create_parent_dirs = yes;
        self
    }

    #[must_use]
    pub fn min_size(mut self, bytes: u64) -> Self {
        self.options.min_size = Some(bytes);
        self
    }

    #[must_use]
    pub fn checksum(mut self, yes: bool) -> Self {
        self.options.checksum = yes;
        self
    }

    #[must_use]
    pub fn expected_checksum(mut self, hex: impl Into<String>) -> Self {
        self.options.expected_checksum = Some(hex.into());
        self
    }

    #[must_use]
    pub fn binary_mode(mut self, yes: bool) -> Self {
        self.options.binary_mode = yes;
        self
    }

    #[must_use]
    pub fn file_mode(mut self, mode: u32) -> Self {
        self.options.file_mode = Some(mode);
        self
    }

    #[must_use]
    pub fn owner(mut self, spec: impl Into<String>) -> Self {
        self.options.owner = Some(spec.into());
        self
    }
}

/// Check that `target` names a file we can rename onto.
pub(crate) fn validate_target(target: Option<&Path>) -> Result<&Path> {
    let target = target.ok_or_else(|| WriteError::InvalidRequest("missing target path".into()))?;
    if target.as_os_str().is_empty() {
        return Err(WriteError::InvalidRequest("empty target path".into()));
    }
    if target.file_name().is_none() {
        return Err(WriteError::InvalidRequest(format!(
            "target {} does not name a file",
            target.display()
        )));
    }
    Ok(target)
}

/// Parse an octal permission string: `"0640"`, `"640"` or `"0o640"`.
///
/// # Errors
///
/// Returns `WriteError::InvalidMode` if the string is not octal or exceeds `0o7777`.
pub fn parse_mode(s: &str) -> Result<u32> {
    let digits = s.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    if digits.is_empty() {
        return Err(WriteError::InvalidMode(format!("{s:?} is empty")));
    }
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|e| WriteError::InvalidMode(format!("{s:?}: {e}")))?;
    check_mode(mode)
}

pub(crate) fn check_mode(mode: u32) -> Result<u32> {
    if mode > MAX_FILE_MODE {
        return Err(WriteError::InvalidMode(format!(
            "{mode:o} exceeds {MAX_FILE_MODE:o}"
        )));
    }
    Ok(mode)
}
