use serde::{Deserialize, Serialize};

pub const CONNECTION_OK_MESSAGE: &str = "Connection successful (mock)";

/// Outcome of a simulated endpoint connection test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
}

impl ConnectionTestResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: CONNECTION_OK_MESSAGE.to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
