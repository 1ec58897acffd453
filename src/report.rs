//! Report records and the sinks that receive them.
//!
//! Collectors never log directly: every reading goes through a
//! [`ReportSink`]. [`TracingSink`] turns records into structured `tracing`
//! events; [`MemorySink`] keeps them for inspection.

use crate::collectors::cpu::CpuInformation;
use crate::error::CollectError;
use crate::metrics::{ConnectionStat, CpuTimesStat, DiskUsageStat, IoCountersStat, VirtualMemoryStat};
use serde::Serialize;
use serde_json::Value;

/// CPU time breakdown stamped with its capture time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuTimesRecord {
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(flatten)]
    pub times: CpuTimesStat,
}

/// A single structured record produced by a collector.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    CpuInfo(CpuInformation),
    CpuTimes(CpuTimesRecord),
    Memory(VirtualMemoryStat),
    Disk(DiskUsageStat),
    Interface(IoCountersStat),
    Connection(ConnectionStat),
}

impl Report {
    pub fn category(&self) -> &'static str {
        match self {
            Report::CpuInfo(_) => "cpu_info",
            Report::CpuTimes(_) => "cpu_times",
            Report::Memory(_) => "memory",
            Report::Disk(_) => "disk",
            Report::Interface(_) => "interface",
            Report::Connection(_) => "connection",
        }
    }

    /// The record's fields as a JSON object.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Destination for collector output.
pub trait ReportSink {
    fn record(&mut self, report: Report);

    /// A collector returned an error.
    fn failed(&mut self, collector: &'static str, error: &CollectError);

    /// A non-critical query failed and was skipped without failing its collector.
    fn suppressed(&mut self, collector: &'static str, error: &CollectError);
}

/// Emits each record as a `tracing` event with one field per value.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn record(&mut self, report: Report) {
        match &report {
            Report::CpuInfo(info) => tracing::info!(
                target: "glass::cpu",
                vendor = %info.vendor,
                frequency = info.frequency,
                cores = info.cores,
                cache = info.cache,
                vcpu = info.vcpu,
                "cpu info"
            ),
            Report::CpuTimes(record) => {
                let t = &record.times;
                tracing::info!(
                    target: "glass::cpu",
                    cpu = %t.cpu,
                    user = t.user,
                    system = t.system,
                    idle = t.idle,
                    nice = t.nice,
                    iowait = t.iowait,
                    irq = t.irq,
                    softirq = t.softirq,
                    steal = t.steal,
                    guest = t.guest,
                    guest_nice = t.guest_nice,
                    timestamp = record.timestamp,
                    "cpu times"
                )
            }
            Report::Memory(mem) => tracing::info!(
                target: "glass::memory",
                total = mem.total,
                available = mem.available,
                used = mem.used,
                free = mem.free,
                used_percent = mem.used_percent,
                "virtual memory"
            ),
            Report::Disk(disk) => tracing::info!(
                target: "glass::disk",
                path = %disk.path,
                total = disk.total,
                free = disk.free,
                used = disk.used,
                used_percent = disk.used_percent,
                "disk usage"
            ),
            Report::Interface(nic) => tracing::info!(
                target: "glass::network",
                name = %nic.name,
                bytes_sent = nic.bytes_sent,
                bytes_recv = nic.bytes_recv,
                packets_sent = nic.packets_sent,
                packets_recv = nic.packets_recv,
                "io counters"
            ),
            Report::Connection(conn) => tracing::info!(
                target: "glass::network",
                status = %conn.status,
                pid = ?conn.pid,
                connection = %report.to_json(),
                "tcp connection"
            ),
        }
    }

    fn failed(&mut self, collector: &'static str, error: &CollectError) {
        tracing::error!(collector, error = %error, "collection failed");
    }

    fn suppressed(&mut self, collector: &'static str, error: &CollectError) {
        tracing::debug!(collector, error = %error, "non-critical query failed");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Record(Report),
    Failed { collector: &'static str, error: String },
    Suppressed { collector: &'static str, error: String },
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<SinkEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> impl Iterator<Item = &Report> {
        self.events.iter().filter_map(|event| match event {
            SinkEvent::Record(report) => Some(report),
            _ => None,
        })
    }

    pub fn records_in(&self, category: &str) -> Vec<&Report> {
        self.records().filter(|r| r.category() == category).collect()
    }

    /// Collectors that reported a failure, in order.
    pub fn failures(&self) -> Vec<&'static str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Failed { collector, .. } => Some(*collector),
                _ => None,
            })
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn record(&mut self, report: Report) {
        self.events.push(SinkEvent::Record(report));
    }

    fn failed(&mut self, collector: &'static str, error: &CollectError) {
        self.events.push(SinkEvent::Failed {
            collector,
            error: error.to_string(),
        });
    }

    fn suppressed(&mut self, collector: &'static str, error: &CollectError) {
        self.events.push(SinkEvent::Suppressed {
            collector,
            error: error.to_string(),
        });
    }
}
