//! Filesystem usage via statvfs.

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Usage of the filesystem holding `path`, in bytes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiskUsageStat {
    pub path: String,
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f64,
}

impl DiskUsageStat {
    /// `free` counts blocks available to unprivileged users, so `used_percent`
    /// is relative to `used + free` rather than `total`.
    pub fn from_blocks(path: &Path, block_size: u64, blocks: u64, blocks_free: u64, blocks_avail: u64) -> Self {
        let total = blocks * block_size;
        let free = blocks_avail * block_size;
        let used = blocks.saturating_sub(blocks_free) * block_size;
        let used_percent = if used + free > 0 {
            100.0 * used as f64 / (used + free) as f64
        } else {
            0.0
        };

        Self {
            path: path.to_string_lossy().to_string(),
            total,
            free,
            used,
            used_percent,
        }
    }
}

#[cfg(unix)]
pub fn usage(path: &Path) -> Result<DiskUsageStat, SourceError> {
    use std::ffi::CString;
    use std::mem::MaybeUninit;
    use std::os::unix::ffi::OsStrExt;

    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| SourceError::parse(path, "path contains a NUL byte"))?;
    let mut statvfs = MaybeUninit::<libc::statvfs>::uninit();

    let result = unsafe { libc::statvfs(c_path.as_ptr(), statvfs.as_mut_ptr()) };
    if result != 0 {
        return Err(SourceError::io(path, std::io::Error::last_os_error()));
    }

    let statvfs = unsafe { statvfs.assume_init() };
    Ok(DiskUsageStat::from_blocks(
        path,
        statvfs.f_frsize as u64,
        statvfs.f_blocks as u64,
        statvfs.f_bfree as u64,
        statvfs.f_bavail as u64,
    ))
}

#[cfg(not(unix))]
pub fn usage(_path: &Path) -> Result<DiskUsageStat, SourceError> {
    Err(SourceError::Unsupported("disk_usage"))
}
