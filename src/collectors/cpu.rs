use super::Collector;
use crate::config::CollectorKind;
use crate::error::CollectError;
use crate::metrics::MetricsSource;
use crate::report::{CpuTimesRecord, Report, ReportSink};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;

/// Representative identity of the host CPU
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInformation {
    pub vendor: String,
    /// MHz
    pub frequency: f64,
    pub cores: u32,
    /// KB
    pub cache: u32,
    /// Logical CPU count
    pub vcpu: usize,
}

pub struct CpuCollector {
    source: Arc<dyn MetricsSource>,
    per_cpu: bool,
}

impl CpuCollector {
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self {
            source,
            per_cpu: false,
        }
    }

    /// Report one times record per logical CPU instead of the `cpu-total` record.
    pub fn per_cpu(mut self, per_cpu: bool) -> Self {
        self.per_cpu = per_cpu;
        self
    }

    /// Identity fields of the first reported processor; `vcpu` is the number
    /// of processors listed.
    pub fn cpu_information(&self) -> Result<CpuInformation, CollectError> {
        let infos = self
            .source
            .cpu_info()
            .map_err(CollectError::query_failed("cpu_info"))?;
        let first = infos.first().ok_or(CollectError::NoData("cpu info"))?;

        Ok(CpuInformation {
            vendor: first.vendor_id.clone(),
            frequency: first.mhz,
            cores: first.cores,
            cache: first.cache_size,
            vcpu: infos.len(),
        })
    }
}

impl Collector for CpuCollector {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn kind(&self) -> CollectorKind {
        CollectorKind::Cpu
    }

    fn collect(&self, sink: &mut dyn ReportSink) -> Result<(), CollectError> {
        let mut failures = Vec::new();

        let vcpu = match self.source.cpu_count(true) {
            Ok(count) => Some(count),
            Err(e) => {
                failures.push(CollectError::query_failed("cpu_count")(e));
                None
            }
        };

        match self.cpu_information() {
            Ok(mut info) => {
                if let Some(count) = vcpu {
                    info.vcpu = count;
                }
                sink.record(Report::CpuInfo(info));
            }
            Err(e) => failures.push(e),
        }

        match self.source.cpu_times(self.per_cpu) {
            Ok(times) => {
                let timestamp = Utc::now().timestamp_millis();
                for times in times {
                    sink.record(Report::CpuTimes(CpuTimesRecord { timestamp, times }));
                }
            }
            Err(e) => failures.push(CollectError::query_failed("cpu_times")(e)),
        }

        CollectError::from_failures(failures)
    }
}
