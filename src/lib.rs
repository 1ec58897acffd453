//! Looking Glass - one-shot host metrics snapshot.
//!
//! Queries CPU, memory, disk, and network statistics once and reports them
//! as structured records. Collectors are independent: one failing never
//! stops the others.

pub mod collectors;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod report;

pub use collectors::{run_collectors, Collector, RunSummary};
pub use config::{CollectorKind, Config};
pub use error::{CollectError, SourceError};
pub use metrics::{MetricsSource, ProcfsSource};
pub use registry::{default_collectors, register_collectors};
pub use report::{MemorySink, Report, ReportSink, TracingSink};
