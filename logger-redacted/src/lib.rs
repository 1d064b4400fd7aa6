//! Logging setup with automatic PII redaction
//!
//! Role services log every statement they run and every failure they
//! swallow. Those messages regularly carry patient contact data lifted from
//! driver errors, so this crate pairs subscriber initialisation with a
//! [`PiiRedactor`] and the `redacted_warn!` / `redacted_error!` macros.
//!
//! # Detected Data Types
//!
//! - **Email Addresses**: nimal@example.lk → n***@e***
//! - **Phone Numbers**: 0771234567 → [PHONE]
//! - **National Identity Numbers**: 852341234V → [NIC]
//! - **Card Numbers**: 4111-1111-1111-1234 → ****-****-****-1234
//! - **IP Addresses**: 192.168.1.1 → 192.***.***.***
//!
//! # Example
//!
//! ```rust,no_run
//! use logger_redacted::{init, redacted_warn, LoggerConfig, PiiRedactor};
//!
//! let config = LoggerConfig::default();
//! init(&config).unwrap();
//!
//! let redactor = PiiRedactor::from_config(&config);
//! redacted_warn!(redactor, "Refund insert failed for {}", "nimal@example.lk");
//! // Output: "Refund insert failed for n***@e***"
//! ```

pub mod config;
pub mod macros;
pub mod redactor;

pub use config::*;
pub use redactor::*;

#[doc(hidden)]
pub use tracing;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.log_level` when set.
///
/// # Errors
///
/// Fails when the level directive does not parse or a subscriber is already
/// installed.
pub fn init(config: &LoggerConfig) -> Result<(), LoggerError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|e| LoggerError::InvalidFilter(e.to_string()))?,
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = if config.json {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .json(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_level(true),
            )
            .try_init()
    };

    result.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}
