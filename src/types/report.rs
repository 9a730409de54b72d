use serde::Serialize;
use std::path::PathBuf;

/// Outcome of a committed write.
#[derive(Clone, Debug, Serialize)]
pub struct WriteReport {
    pub target: PathBuf,
    pub bytes_written: u64,
    /// Hex digest verified against the on-disk bytes, when checksum verification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    pub duration_ms: u64,
}
