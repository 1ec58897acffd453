//! The ordered collector set run per invocation.

use crate::collectors::{Collector, CpuCollector, DiskCollector, MemoryCollector, NetworkCollector};
use crate::config::{CollectorKind, Config};
use crate::metrics::MetricsSource;
use std::sync::Arc;

/// Builds the enabled collectors in run order: CPU, memory, disk, network.
pub fn register_collectors(config: &Config, source: Arc<dyn MetricsSource>) -> Vec<Box<dyn Collector>> {
    CollectorKind::ALL
        .into_iter()
        .filter(|kind| config.is_enabled(*kind))
        .map(|kind| -> Box<dyn Collector> {
            match kind {
                CollectorKind::Cpu => Box::new(CpuCollector::new(source.clone()).per_cpu(config.per_cpu)),
                CollectorKind::Memory => Box::new(MemoryCollector::new(source.clone())),
                CollectorKind::Disk => Box::new(DiskCollector::new(source.clone(), &config.mount_path)),
                CollectorKind::Network => Box::new(NetworkCollector::new(source.clone()).per_nic(config.per_nic)),
            }
        })
        .collect()
}

/// All four collectors with default settings.
pub fn default_collectors(source: Arc<dyn MetricsSource>) -> Vec<Box<dyn Collector>> {
    register_collectors(&Config::default(), source)
}
