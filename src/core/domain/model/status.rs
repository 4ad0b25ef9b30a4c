//! Status values shared by nodes, guests and node services.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operational status of a node, guest or daemon.
///
/// Nodes and guests use the `Running`..`Unknown` range; services report
/// `Ok`, `Warning`, `Error` or `Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum Status {
    Running,
    Stopped,
    Suspended,
    Error,
    Unknown,
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

impl Status {
    /// Returns `true` for the states the alert evaluator escalates on services.
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Error | Status::Critical)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Running => "Running",
            Status::Stopped => "Stopped",
            Status::Suspended => "Suspended",
            Status::Error => "Error",
            Status::Unknown => "Unknown",
            Status::Ok => "OK",
            Status::Warning => "Warning",
            Status::Critical => "Critical",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
