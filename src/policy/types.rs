/// Durability knobs applied around the final rename.
#[derive(Clone, Copy, Debug)]
pub struct Durability {
    /// `fsync(2)` the staged file before validation. Disabling trades crash safety for speed.
    pub sync_file: bool,
    /// Best-effort `fsync(2)` of the target directory after the rename.
    pub fsync_parent_dir: bool,
}

impl Default for Durability {
    fn default() -> Self {
        Self {
            sync_file: true,
            fsync_parent_dir: true,
        }
    }
}

/// Staging knobs that are not per-write.
#[derive(Clone, Debug)]
pub struct Staging {
    /// Template used when a write does not supply its own.
    pub default_template: String,
    /// Chunk size for streaming and checksum re-reads.
    pub copy_buffer_size: usize,
}
