//! Output directory checks run before any document is touched.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::PreflightError;

/// Free space required in the output directory, in MB.
pub const MIN_FREE_MB: u64 = 100;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Source of free space figures for a directory.
pub trait DiskSpace {
    fn available_bytes(&self, dir: &Path) -> io::Result<u64>;
}

/// Free space as reported by the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDiskSpace;

impl DiskSpace for SystemDiskSpace {
    fn available_bytes(&self, dir: &Path) -> io::Result<u64> {
        fs2::available_space(dir)
    }
}

/// A fixed free space figure.
#[derive(Debug, Clone, Copy)]
pub struct FixedDiskSpace(pub u64);

impl DiskSpace for FixedDiskSpace {
    fn available_bytes(&self, _dir: &Path) -> io::Result<u64> {
        Ok(self.0)
    }
}

/// Create `dir` if needed, then check that it is writable and has room.
pub fn check_output_dir(dir: &Path, space: &dyn DiskSpace) -> Result<(), PreflightError> {
    let not_writable = |source| PreflightError::NotWritable {
        dir: dir.to_path_buf(),
        source,
    };

    fs::create_dir_all(dir).map_err(not_writable)?;
    tempfile::Builder::new()
        .prefix(".caselens-probe")
        .tempfile_in(dir)
        .map_err(not_writable)?;
    debug!("Output directory {} is writable", dir.display());

    let available = space
        .available_bytes(dir)
        .map_err(|source| PreflightError::SpaceQuery {
            dir: dir.to_path_buf(),
            source,
        })?;
    let available_mb = available as f64 / BYTES_PER_MB as f64;
    if available < MIN_FREE_MB * BYTES_PER_MB {
        return Err(PreflightError::LowDiskSpace {
            dir: dir.to_path_buf(),
            available_mb,
            required_mb: MIN_FREE_MB,
        });
    }

    info!("Disk space check passed: {available_mb:.2} MB available");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_dir() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a").join("b");
        check_output_dir(&dir, &FixedDiskSpace(u64::MAX)).unwrap();
        assert!(dir.is_dir());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_low_disk_space() {
        let dir = tempfile::tempdir().unwrap();
        let err = check_output_dir(dir.path(), &FixedDiskSpace(50 * BYTES_PER_MB)).unwrap_err();
        match err {
            PreflightError::LowDiskSpace { available_mb, required_mb, .. } => {
                assert_eq!(available_mb, 50.0);
                assert_eq!(required_mb, MIN_FREE_MB);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_output_path_is_a_file() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("taken");
        fs::write(&file, b"x").unwrap();
        let err = check_output_dir(&file, &FixedDiskSpace(u64::MAX)).unwrap_err();
        assert!(matches!(err, PreflightError::NotWritable { .. }));
    }

    #[test]
    fn test_system_space_is_queryable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SystemDiskSpace.available_bytes(dir.path()).is_ok());
    }
}
