use super::Collector;
use crate::config::CollectorKind;
use crate::error::CollectError;
use crate::metrics::MetricsSource;
use crate::report::{Report, ReportSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct DiskCollector {
    source: Arc<dyn MetricsSource>,
    mount_path: PathBuf,
}

impl DiskCollector {
    pub fn new(source: Arc<dyn MetricsSource>, mount_path: impl Into<PathBuf>) -> Self {
        Self {
            source,
            mount_path: mount_path.into(),
        }
    }

    pub fn mount_path(&self) -> &Path {
        &self.mount_path
    }
}

impl Collector for DiskCollector {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn kind(&self) -> CollectorKind {
        CollectorKind::Disk
    }

    fn collect(&self, sink: &mut dyn ReportSink) -> Result<(), CollectError> {
        let usage = self
            .source
            .disk_usage(&self.mount_path)
            .map_err(CollectError::query_failed("disk_usage"))?;
        sink.record(Report::Disk(usage));
        Ok(())
    }
}
