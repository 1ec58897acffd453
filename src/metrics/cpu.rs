//! CPU identity from /proc/cpuinfo and time breakdown from /proc/stat.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One logical processor as described by /proc/cpuinfo
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuInfoStat {
    /// Logical processor index
    pub cpu: u32,
    pub vendor_id: String,
    pub model_name: String,
    /// Current clock in MHz
    pub mhz: f64,
    /// Cores in the physical package
    pub cores: u32,
    /// Cache size in KB
    pub cache_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_id: Option<String>,
}

/// Seconds spent in each scheduler category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CpuTimesStat {
    /// `cpu-total` or `cpuN`
    pub cpu: String,
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub nice: f64,
    pub iowait: f64,
    pub irq: f64,
    pub softirq: f64,
    pub steal: f64,
    pub guest: f64,
    pub guest_nice: f64,
}

/// Raw CPU time values from /proc/stat, in clock ticks
#[derive(Debug, Clone, Default)]
struct CpuJiffies {
    user: u64,
    nice: u64,
    system: u64,
    idle: u64,
    iowait: u64,
    irq: u64,
    softirq: u64,
    steal: u64,
    guest: u64,
    guest_nice: u64,
}

impl CpuJiffies {
    fn into_seconds(self, cpu: String, ticks_per_sec: f64) -> CpuTimesStat {
        let secs = |v: u64| v as f64 / ticks_per_sec;
        CpuTimesStat {
            cpu,
            user: secs(self.user),
            system: secs(self.system),
            idle: secs(self.idle),
            nice: secs(self.nice),
            iowait: secs(self.iowait),
            irq: secs(self.irq),
            softirq: secs(self.softirq),
            steal: secs(self.steal),
            guest: secs(self.guest),
            guest_nice: secs(self.guest_nice),
        }
    }
}

pub const TOTAL_CPU_LABEL: &str = "cpu-total";

/// Clock ticks per second used by /proc/stat.
pub fn clock_ticks() -> f64 {
    #[cfg(unix)]
    {
        let ticks = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if ticks > 0 {
            return ticks as f64;
        }
    }
    100.0
}

pub fn parse_cpuinfo(content: &str) -> Vec<CpuInfoStat> {
    let mut infos: Vec<CpuInfoStat> = Vec::new();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        if key == "processor" {
            infos.push(CpuInfoStat {
                cpu: value.parse().unwrap_or(infos.len() as u32),
                ..Default::default()
            });
            continue;
        }

        // Lines before the first processor entry (e.g. s390 headers) are ignored
        let Some(current) = infos.last_mut() else {
            continue;
        };

        match key {
            "vendor_id" | "vendor" => current.vendor_id = value.to_string(),
            "model name" | "cpu model" => current.model_name = value.to_string(),
            "cpu MHz" => current.mhz = value.parse().unwrap_or(0.0),
            "cpu cores" => current.cores = value.parse().unwrap_or(0),
            "cache size" => {
                current.cache_size = value
                    .split_whitespace()
                    .next()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0)
            }
            "physical id" => current.physical_id = Some(value.to_string()),
            "core id" => current.core_id = Some(value.to_string()),
            _ => {}
        }
    }

    infos
}

pub fn count_cpus(infos: &[CpuInfoStat], logical: bool) -> usize {
    if logical {
        return infos.len();
    }

    let cores: HashSet<(&str, &str)> = infos
        .iter()
        .filter_map(|info| Some((info.physical_id.as_deref()?, info.core_id.as_deref()?)))
        .collect();
    if !cores.is_empty() {
        return cores.len();
    }

    match infos.first() {
        Some(first) if first.cores > 0 => first.cores as usize,
        _ => infos.len(),
    }
}

/// Parses the `cpu` lines of /proc/stat. With `per_cpu` the aggregate line is
/// skipped and each `cpuN` line is returned; otherwise only the aggregate.
pub fn parse_stat(content: &str, per_cpu: bool, ticks_per_sec: f64) -> Vec<CpuTimesStat> {
    let mut times = Vec::new();

    for line in content.lines() {
        let Some(label) = line.split_whitespace().next() else {
            continue;
        };
        if !label.starts_with("cpu") {
            continue;
        }

        let is_total = label == "cpu";
        if is_total == per_cpu {
            continue;
        }

        let cpu = if is_total {
            TOTAL_CPU_LABEL.to_string()
        } else {
            label.to_string()
        };
        times.push(parse_cpu_line(line).into_seconds(cpu, ticks_per_sec));
    }

    times
}

fn parse_cpu_line(line: &str) -> CpuJiffies {
    let parts: Vec<u64> = line
        .split_whitespace()
        .skip(1) // Skip "cpu" or "cpuN"
        .filter_map(|s| s.parse().ok())
        .collect();
    let field = |i: usize| parts.get(i).copied().unwrap_or(0);

    CpuJiffies {
        user: field(0),
        nice: field(1),
        system: field(2),
        idle: field(3),
        iowait: field(4),
        irq: field(5),
        softirq: field(6),
        steal: field(7),
        guest: field(8),
        guest_nice: field(9),
    }
}
