//! Collector framework.
//!
//! Each [`Collector`] queries one category of host metrics through a shared
//! [`MetricsSource`](crate::metrics::MetricsSource) and hands the readings to
//! a [`ReportSink`]. [`run_collectors`] drives a list of them once, in order.

pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;

pub use cpu::{CpuCollector, CpuInformation};
pub use disk::DiskCollector;
pub use memory::MemoryCollector;
pub use network::NetworkCollector;

use crate::config::CollectorKind;
use crate::error::CollectError;
use crate::report::ReportSink;

/// A source of one category of host metrics.
pub trait Collector: Send + Sync {
    /// Short name used in log fields, e.g. `"cpu"`.
    fn name(&self) -> &'static str;

    fn kind(&self) -> CollectorKind;

    /// Queries current values and reports them to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric the collector is responsible for could
    /// not be read. Readings that did succeed have already been reported.
    fn collect(&self, sink: &mut dyn ReportSink) -> Result<(), CollectError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Runs every collector once, in order. A failure is passed to
/// [`ReportSink::failed`] and the next collector still runs.
pub fn run_collectors(collectors: &[Box<dyn Collector>], sink: &mut dyn ReportSink) -> RunSummary {
    let mut summary = RunSummary::default();

    for collector in collectors {
        match collector.collect(sink) {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                sink.failed(collector.name(), &e);
                summary.failed += 1;
            }
        }
    }

    summary
}
