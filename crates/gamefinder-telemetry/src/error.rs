//! Error types for telemetry operations.

use thiserror::Error;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    #[error("failed to install tracing subscriber")]
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
    /// A log format name was not recognised.
    #[error("unknown log format")]
    UnknownFormat {
        /// Value that failed to parse.
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use tracing_subscriber::util::SubscriberInitExt;

    #[test]
    fn telemetry_error_display_and_source() {
        let _ = tracing_subscriber::registry().try_init();
        let Err(source) = tracing_subscriber::registry().try_init() else {
            panic!("second install must fail");
        };
        let err = TelemetryError::SubscriberInstall { source };
        assert_eq!(err.to_string(), "failed to install tracing subscriber");
        assert!(err.source().is_some());

        let err = TelemetryError::UnknownFormat {
            value: "xml".into(),
        };
        assert_eq!(err.to_string(), "unknown log format");
        assert!(err.source().is_none());
    }
}
