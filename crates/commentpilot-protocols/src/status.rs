//! Status reporting protocol.
//!
//! A status sink is whatever shows the user how the last action went (the
//! settings popup in the browser build). Reports are fire-and-forget.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome category of a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// A single status report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    /// Human-readable message.
    pub message: String,
    pub status: StatusKind,
    pub timestamp: DateTime<Utc>,
}

impl StatusReport {
    pub fn new(message: impl Into<String>, status: StatusKind) -> Self {
        Self {
            message: message.into(),
            status,
            timestamp: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, StatusKind::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, StatusKind::Error)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, StatusKind::Info)
    }
}

/// Receiver of status reports.
pub trait StatusSink: Send + Sync {
    fn report(&self, report: StatusReport);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_constructors() {
        assert_eq!(StatusReport::success("ok").status, StatusKind::Success);
        assert_eq!(StatusReport::error("bad").status, StatusKind::Error);
        assert_eq!(StatusReport::info("fyi").status, StatusKind::Info);
    }

    #[test]
    fn test_status_serialization() {
        let report = StatusReport::error("Please set your key");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "Please set your key");
    }
}
