// Logger configuration
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default directive when `RUST_LOG` is not set, e.g. `info` or
    /// `appointment_service=debug,sqlx=warn`
    pub log_level: String,
    /// Emit newline-delimited JSON instead of human readable lines
    pub json: bool,
    pub redaction_enabled: bool,
    /// Replace redacted values with a short hash so repeated values can
    /// still be correlated across log lines
    pub hash_for_correlation: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            redaction_enabled: true,
            hash_for_correlation: false,
        }
    }
}
