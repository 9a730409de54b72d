//! Filesystem device identification used to keep staging on the target's partition.
use std::io;
use std::path::Path;

pub trait DeviceProbe: Send + Sync {
    /// Device id of the filesystem holding `dir`.
    ///
    /// # Errors
    ///
    /// Returns an IO error if `dir` cannot be stat'ed.
    fn device_of(&self, dir: &Path) -> io::Result<u64>;
}

/// Production probe: `st_dev` from `stat(2)`.
#[derive(Copy, Clone, Debug, Default)]
pub struct StatDeviceProbe;

impl DeviceProbe for StatDeviceProbe {
    fn device_of(&self, dir: &Path) -> io::Result<u64> {
        use std::os::unix::fs::MetadataExt;
        Ok(std::fs::metadata(dir)?.dev())
    }
}
