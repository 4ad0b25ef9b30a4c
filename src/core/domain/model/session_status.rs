//! Classified status shown next to (or instead of) a snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusKind {
    /// The selected endpoint no longer exists in the configured list.
    ConfigError,
    /// URL or token is blank.
    ConfigIncomplete,
    /// URL and token are both present; live data needs a backend proxy.
    RealDataInfo,
    /// Local processing failed unexpectedly.
    FetchError,
    /// Neutral information.
    Info,
}

impl StatusKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::ConfigError => "CONFIG_ERROR",
            StatusKind::ConfigIncomplete => "CONFIG_INCOMPLETE",
            StatusKind::RealDataInfo => "REAL_DATA_INFO",
            StatusKind::FetchError => "FETCH_ERROR",
            StatusKind::Info => "INFO",
        }
    }

    /// Periodic refresh never re-runs for these outcomes; they only change on user action.
    pub fn blocks_refresh(self) -> bool {
        matches!(
            self,
            StatusKind::ConfigError | StatusKind::ConfigIncomplete | StatusKind::RealDataInfo
        )
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionStatus {
    pub kind: StatusKind,
    pub message: String,
}

impl SessionStatus {
    pub fn new(kind: StatusKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}
