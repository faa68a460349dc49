//! Error types for configuration loading.

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Offending value when it is safe to echo.
        value: Option<String>,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// A required field was not provided.
    #[error("missing configuration field")]
    MissingField {
        /// Field that was required.
        field: &'static str,
    },
    /// The platform reported no data directory and none was configured.
    #[error("data directory unavailable")]
    DataDirUnavailable,
}

impl ConfigError {
    /// Name of the field tied to the failure, when there is one.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::InvalidField { field, .. } | Self::MissingField { field } => Some(*field),
            Self::DataDirUnavailable => None,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
