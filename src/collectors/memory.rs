use super::Collector;
use crate::config::CollectorKind;
use crate::error::CollectError;
use crate::metrics::MetricsSource;
use crate::report::{Report, ReportSink};
use std::sync::Arc;

pub struct MemoryCollector {
    source: Arc<dyn MetricsSource>,
}

impl MemoryCollector {
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self { source }
    }
}

impl Collector for MemoryCollector {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn kind(&self) -> CollectorKind {
        CollectorKind::Memory
    }

    fn collect(&self, sink: &mut dyn ReportSink) -> Result<(), CollectError> {
        let vmstat = self
            .source
            .virtual_memory()
            .map_err(CollectError::query_failed("virtual_memory"))?;
        sink.record(Report::Memory(vmstat));
        Ok(())
    }
}
