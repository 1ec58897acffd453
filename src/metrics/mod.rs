//! Platform metrics queries.
//!
//! [`MetricsSource`] is the boundary between collectors and the operating
//! system. [`ProcfsSource`] answers it on Linux from `/proc` and `statvfs(3)`;
//! tests substitute their own implementation.

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;

pub use cpu::{CpuInfoStat, CpuTimesStat};
pub use disk::DiskUsageStat;
pub use memory::VirtualMemoryStat;
pub use network::{AddressFamily, ConnectionKind, ConnectionStat, IoCountersStat, SocketAddr};

use crate::error::SourceError;
use std::fs;
use std::path::{Path, PathBuf};

/// Point-in-time system readings. Every call re-queries the platform.
pub trait MetricsSource: Send + Sync {
    /// One entry per logical processor.
    fn cpu_info(&self) -> Result<Vec<CpuInfoStat>, SourceError>;

    /// Time spent per category, either per logical CPU or as a single
    /// `cpu-total` entry.
    fn cpu_times(&self, per_cpu: bool) -> Result<Vec<CpuTimesStat>, SourceError>;

    /// Logical processor count, or physical core count when `logical` is false.
    fn cpu_count(&self, logical: bool) -> Result<usize, SourceError>;

    fn virtual_memory(&self) -> Result<VirtualMemoryStat, SourceError>;

    /// Usage of the filesystem containing `path`.
    fn disk_usage(&self, path: &Path) -> Result<DiskUsageStat, SourceError>;

    /// Interface counters, or a single combined `all` record when `per_nic`
    /// is false.
    fn net_io_counters(&self, per_nic: bool) -> Result<Vec<IoCountersStat>, SourceError>;

    fn net_connections(&self, kind: ConnectionKind) -> Result<Vec<ConnectionStat>, SourceError>;
}

pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Linux metrics source backed by procfs.
#[derive(Debug, Clone)]
pub struct ProcfsSource {
    root: PathBuf,
}

impl ProcfsSource {
    pub fn new() -> Self {
        Self::with_root(DEFAULT_PROC_ROOT)
    }

    /// Reads procfs files relative to `root` instead of `/proc`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn read(&self, relative: &str) -> Result<(PathBuf, String), SourceError> {
        let path = self.path(relative);
        match fs::read_to_string(&path) {
            Ok(content) => Ok((path, content)),
            Err(e) => Err(SourceError::io(path, e)),
        }
    }
}

impl Default for ProcfsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for ProcfsSource {
    fn cpu_info(&self) -> Result<Vec<CpuInfoStat>, SourceError> {
        let (_, content) = self.read("cpuinfo")?;
        Ok(cpu::parse_cpuinfo(&content))
    }

    fn cpu_times(&self, per_cpu: bool) -> Result<Vec<CpuTimesStat>, SourceError> {
        let (path, content) = self.read("stat")?;
        let times = cpu::parse_stat(&content, per_cpu, cpu::clock_ticks());
        if times.is_empty() {
            return Err(SourceError::parse(path, "no cpu lines"));
        }
        Ok(times)
    }

    fn cpu_count(&self, logical: bool) -> Result<usize, SourceError> {
        let (_, content) = self.read("cpuinfo")?;
        Ok(cpu::count_cpus(&cpu::parse_cpuinfo(&content), logical))
    }

    fn virtual_memory(&self) -> Result<VirtualMemoryStat, SourceError> {
        let (path, content) = self.read("meminfo")?;
        memory::parse_meminfo(&path, &content)
    }

    fn disk_usage(&self, path: &Path) -> Result<DiskUsageStat, SourceError> {
        disk::usage(path)
    }

    fn net_io_counters(&self, per_nic: bool) -> Result<Vec<IoCountersStat>, SourceError> {
        let (_, content) = self.read("net/dev")?;
        let counters = network::parse_net_dev(&content);
        if per_nic {
            Ok(counters)
        } else {
            Ok(vec![network::combine(&counters)])
        }
    }

    fn net_connections(&self, kind: ConnectionKind) -> Result<Vec<ConnectionStat>, SourceError> {
        let mut sockets = Vec::new();
        let mut any_read = false;
        for &(relative, family) in kind.tables() {
            match self.read(relative) {
                Ok((_, content)) => {
                    any_read = true;
                    sockets.extend(network::parse_tcp_table(&content, family));
                }
                // tcp6 is absent on kernels built without IPv6
                Err(SourceError::Io { ref source, .. })
                    if any_read && source.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        if sockets.is_empty() {
            return Ok(Vec::new());
        }
        let owners = network::socket_owners(&self.root);
        Ok(sockets
            .into_iter()
            .map(|socket| socket.into_connection(kind, &owners))
            .collect())
    }
}
