//! Collector configuration.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_MOUNT_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollectorKind {
    Cpu,
    Memory,
    Disk,
    Network,
}

impl CollectorKind {
    /// Every kind, in run order.
    pub const ALL: [CollectorKind; 4] = [
        CollectorKind::Cpu,
        CollectorKind::Memory,
        CollectorKind::Disk,
        CollectorKind::Network,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Filesystem reported by the disk collector
    pub mount_path: PathBuf,
    /// Collectors to run; order here does not affect run order
    pub collectors: Vec<CollectorKind>,
    /// Per-logical-CPU times instead of the aggregate record
    pub per_cpu: bool,
    /// Per-interface counters instead of the combined record
    pub per_nic: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mount_path: PathBuf::from(DEFAULT_MOUNT_PATH),
            collectors: CollectorKind::ALL.to_vec(),
            per_cpu: false,
            per_nic: false,
        }
    }
}

impl Config {
    pub fn is_enabled(&self, kind: CollectorKind) -> bool {
        self.collectors.contains(&kind)
    }
}
