//! Virtual memory statistics from /proc/meminfo.

use crate::error::SourceError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Memory usage in bytes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VirtualMemoryStat {
    pub total: u64,
    pub available: u64,
    pub used: u64,
    pub free: u64,
    pub used_percent: f64,
}

pub fn parse_meminfo(path: &Path, content: &str) -> Result<VirtualMemoryStat, SourceError> {
    let mut total: Option<u64> = None;
    let mut free: u64 = 0;
    let mut available: Option<u64> = None;
    let mut buffers: u64 = 0;
    let mut cached: u64 = 0;
    let mut reclaimable: u64 = 0;

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            continue;
        }

        let value: u64 = parts[1].parse::<u64>().unwrap_or(0) * 1024; // kB to bytes

        match parts[0] {
            "MemTotal:" => total = Some(value),
            "MemFree:" => free = value,
            "MemAvailable:" => available = Some(value),
            "Buffers:" => buffers = value,
            "Cached:" => cached = value,
            "SReclaimable:" => reclaimable = value,
            _ => {}
        }
    }

    let total = total.ok_or_else(|| SourceError::parse(path, "missing MemTotal"))?;
    let cached = cached + reclaimable;
    // Kernels before 3.14 lack MemAvailable
    let available = available.unwrap_or(free + buffers + cached);
    let used = total.saturating_sub(free + buffers + cached);

    let used_percent = if total > 0 {
        100.0 * used as f64 / total as f64
    } else {
        0.0
    };

    Ok(VirtualMemoryStat {
        total,
        available,
        used,
        free,
        used_percent,
    })
}
