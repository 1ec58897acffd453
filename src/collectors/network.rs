use super::Collector;
use crate::config::CollectorKind;
use crate::error::CollectError;
use crate::metrics::network::STATUS_ESTABLISHED;
use crate::metrics::{ConnectionKind, MetricsSource};
use crate::report::{Report, ReportSink};
use std::sync::Arc;

pub struct NetworkCollector {
    source: Arc<dyn MetricsSource>,
    per_nic: bool,
}

impl NetworkCollector {
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self {
            source,
            per_nic: false,
        }
    }

    /// Report each interface instead of the combined record.
    pub fn per_nic(mut self, per_nic: bool) -> Self {
        self.per_nic = per_nic;
        self
    }
}

impl Collector for NetworkCollector {
    fn name(&self) -> &'static str {
        "network"
    }

    fn kind(&self) -> CollectorKind {
        CollectorKind::Network
    }

    fn collect(&self, sink: &mut dyn ReportSink) -> Result<(), CollectError> {
        let result = match self.source.net_io_counters(self.per_nic) {
            Ok(counters) => {
                for nic in counters {
                    sink.record(Report::Interface(nic));
                }
                Ok(())
            }
            Err(e) => Err(CollectError::query_failed("net_io_counters")(e)),
        };

        // Connection listing needs privileges on some hosts; never fail the collector over it
        match self.source.net_connections(ConnectionKind::Tcp) {
            Ok(connections) => {
                for conn in connections.into_iter().filter(|c| c.status == STATUS_ESTABLISHED) {
                    sink.record(Report::Connection(conn));
                }
            }
            Err(e) => sink.suppressed(self.name(), &CollectError::query_failed("net_connections")(e)),
        }

        result
    }
}
