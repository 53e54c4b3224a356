//! Status sinks.

use tokio::sync::broadcast;
use tracing::{error, info};

use commentpilot_protocols::{StatusKind, StatusReport, StatusSink};

/// Writes status reports to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn report(&self, report: StatusReport) {
        match report.status {
            StatusKind::Error => error!("Status: {}", report.message),
            StatusKind::Success | StatusKind::Info => info!("Status: {}", report.message),
        }
    }
}

/// Relays status reports to whoever is listening (a settings popup, say).
/// Reports sent while nobody listens are dropped.
pub struct BroadcastStatusSink {
    tx: broadcast::Sender<StatusReport>,
}

impl BroadcastStatusSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StatusReport> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastStatusSink {
    fn default() -> Self {
        Self::new(16)
    }
}

impl StatusSink for BroadcastStatusSink {
    fn report(&self, report: StatusReport) {
        let _ = self.tx.send(report);
    }
}
