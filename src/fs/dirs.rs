//! Parent and staging directory resolution.
use std::path::{Path, PathBuf};

use crate::adapters::DeviceProbe;
use crate::fs::atomic::dir_of;
use crate::types::errors::{Result, WriteError};

/// Directories taking part in one write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDirs {
    /// Directory that will hold the target.
    pub parent: PathBuf,
    /// Directory the temp file is created in.
    pub staging: PathBuf,
}

/// Make sure `dir` exists, creating it (recursively) only when `create` is set.
///
/// # Errors
///
/// `MissingParentDir` when absent and `create` is false, `InvalidRequest` when the path
/// exists but is not a directory, `CreateDirFailed` when creation fails.
pub fn ensure_dir(dir: &Path, create: bool) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(WriteError::InvalidRequest(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    if !create {
        return Err(WriteError::MissingParentDir(dir.to_path_buf()));
    }
    std::fs::create_dir_all(dir).map_err(|source| WriteError::CreateDirFailed {
        dir: dir.to_path_buf(),
        source,
    })
}

/// Resolve the target's parent and the staging directory, enforcing that both exist
/// (or may be created) and share a device.
///
/// # Errors
///
/// See [`ensure_dir`]; additionally `CrossPartition` when the device ids differ, or
/// `StageFailed` when a device id cannot be read.
pub fn resolve(
    target: &Path,
    temp_dir: Option<&Path>,
    create: bool,
    probe: &dyn DeviceProbe,
) -> Result<ResolvedDirs> {
    let parent = dir_of(target).to_path_buf();
    ensure_dir(&parent, create)?;
    let staging = match temp_dir {
        Some(d) if d != parent.as_path() => {
            ensure_dir(d, create)?;
            let dev = |dir: &Path| {
                probe.device_of(dir).map_err(|source| WriteError::StageFailed {
                    dir: dir.to_path_buf(),
                    source,
                })
            };
            let staging_dev = dev(d)?;
            let parent_dev = dev(&parent)?;
            if staging_dev != parent_dev {
                return Err(WriteError::CrossPartition {
                    staging: d.to_path_buf(),
                    staging_dev,
                    parent: parent.clone(),
                    parent_dev,
                });
            }
            d.to_path_buf()
        }
        _ => parent.clone(),
    };
    Ok(ResolvedDirs { parent, staging })
}
