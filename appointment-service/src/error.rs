use database_layer::DatabaseError;
use thiserror::Error;

/// Stored identifiers that cannot be advanced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdFormatError {
    #[error("Identifier {id:?} has no numeric part after its {prefix_len}-character prefix")]
    MissingSuffix { id: String, prefix_len: usize },

    #[error("Identifier {id:?} has a non-numeric suffix")]
    NonNumericSuffix { id: String },

    #[error("Identifier {id:?} cannot be incremented further")]
    Overflow { id: String },
}

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment {0} was not cancelled: no matching row")]
    NotCancelled(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Identifier format error: {0}")]
    IdFormat(#[from] IdFormatError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl From<config::ConfigError> for AppointmentError {
    fn from(err: config::ConfigError) -> Self {
        AppointmentError::Config(err.to_string())
    }
}

pub type AppointmentResult<T> = Result<T, AppointmentError>;
