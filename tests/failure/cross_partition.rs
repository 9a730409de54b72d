//! Staging on another partition is refused before any temp file is created.

use std::io;
use std::path::{Path, PathBuf};

use crate::common::{strays, with_temp_root, writer};
use stagedwrite::adapters::DeviceProbe;
use stagedwrite::{WriteError, WriteRequest};

/// Reports `staging` on device 2 and everything else on device 1.
struct TwoDevices {
    staging: PathBuf,
}

impl DeviceProbe for TwoDevices {
    fn device_of(&self, dir: &Path) -> io::Result<u64> {
        Ok(if dir == self.staging { 2 } else { 1 })
    }
}

#[test]
fn different_device_ids_fail_with_cross_partition() {
    let td = with_temp_root();
    let stage = td.path().join("mnt");
    std::fs::create_dir(&stage).unwrap();
    let target = td.path().join("t");
    std::fs::write(&target, b"original").unwrap();
    let w = writer().with_device_probe(Box::new(TwoDevices {
        staging: stage.clone(),
    }));
    let err = w
        .write(WriteRequest::new(&target).bytes(b"new").temp_dir(&stage))
        .unwrap_err();
    match err {
        WriteError::CrossPartition {
            staging,
            staging_dev,
            parent_dev,
            ..
        } => {
            assert_eq!(staging, stage);
            assert_ne!(staging_dev, parent_dev);
        }
        other => panic!("expected CrossPartition, got {other:?}"),
    }
    assert!(strays(&stage, &[]).is_empty());
    assert_eq!(std::fs::read(&target).unwrap(), b"original");
}

#[test]
fn staging_in_parent_skips_device_check() {
    let td = with_temp_root();
    let target = td.path().join("t");
    // Would refuse any distinct staging dir, but the default stages next to the target.
    let w = writer().with_device_probe(Box::new(TwoDevices {
        staging: td.path().to_path_buf(),
    }));
    w.write(WriteRequest::new(&target).bytes(b"v")).unwrap();
    assert_eq!(std::fs::read(&target).unwrap(), b"v");
}
