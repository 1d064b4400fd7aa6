// Service settings
use crate::error::AppointmentResult;
use crate::models::DEFAULT_REFUND_REASON;
use crate::repository::AppointmentRepository;
use crate::workflow::{AppointmentCancellationWorkflow, CancellationPolicy};
use config::{Config, Environment, File};
use database_layer::DatabaseConfig;
use logger_redacted::{LoggerConfig, PiiRedactor};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Environment prefix, e.g. `RUSTCARE__DATABASE__URL` or
/// `RUSTCARE__CANCELLATION__POLICY=strict`
pub const ENV_PREFIX: &str = "RUSTCARE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub database: DatabaseConfig,
    pub cancellation: CancellationSettings,
    pub logging: LoggerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CancellationSettings {
    pub policy: CancellationPolicy,
    pub refund_reason: String,
}

impl Default for CancellationSettings {
    fn default() -> Self {
        Self {
            policy: CancellationPolicy::default(),
            refund_reason: DEFAULT_REFUND_REASON.to_string(),
        }
    }
}

impl ServiceConfig {
    /// Layer defaults, an optional YAML/TOML/JSON file and `RUSTCARE__*`
    /// environment variables, later sources winning.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing or unreadable, or a value does not
    /// deserialize into its field.
    pub fn load(path: Option<&Path>) -> AppointmentResult<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Workflow wired with this configuration's policy, reason and redaction
    pub fn cancellation_workflow(
        &self,
        repository: Arc<dyn AppointmentRepository>,
    ) -> AppointmentCancellationWorkflow {
        AppointmentCancellationWorkflow::new(repository)
            .with_policy(self.cancellation.policy)
            .with_refund_reason(self.cancellation.refund_reason.clone())
            .with_redactor(PiiRedactor::from_config(&self.logging))
    }
}
