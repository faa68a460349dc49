//! Error types for catalog fetches and wishlist persistence.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Classification of a failed catalog request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// No response arrived (connect failure, timeout, reset).
    Network,
    /// Credential rejected (401/403).
    Auth,
    /// Too many requests (429).
    RateLimited,
    /// Resource missing (404).
    NotFound,
    /// Service failure (5xx and any other unexpected status).
    Server,
    /// Remaining 4xx statuses.
    Client,
    /// Response body did not match the expected shape.
    Parse,
}

impl FetchErrorKind {
    /// Map a non-success HTTP status to its kind. Returns `None` for 2xx.
    #[must_use]
    pub const fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            401 | 403 => Some(Self::Auth),
            404 => Some(Self::NotFound),
            429 => Some(Self::RateLimited),
            400..=499 => Some(Self::Client),
            _ => Some(Self::Server),
        }
    }

    /// Stable snake-case name used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::RateLimited => "rate_limited",
            Self::NotFound => "not_found",
            Self::Server => "server",
            Self::Client => "client",
            Self::Parse => "parse",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failed catalog request, surfaced to the presentation layer with a retry affordance.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("catalog request failed ({kind})")]
pub struct FetchError {
    /// Failure class.
    pub kind: FetchErrorKind,
    /// HTTP status when a response arrived.
    pub status: Option<u16>,
    /// Diagnostic detail for logs; not meant for end users.
    pub detail: String,
}

impl FetchError {
    /// Build an error of an explicit kind.
    #[must_use]
    pub fn new(kind: FetchErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            detail: detail.into(),
        }
    }

    /// Transport-level failure with no response.
    #[must_use]
    pub fn network(detail: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Network, detail)
    }

    /// Unexpected response shape.
    #[must_use]
    pub fn parse(detail: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Parse, detail)
    }

    /// Error derived from a non-success status code.
    ///
    /// A 2xx status passed here is treated as a server fault, since the caller
    /// only reaches this path when the response could not be used.
    #[must_use]
    pub fn from_status(status: u16, detail: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::from_status(status).unwrap_or(FetchErrorKind::Server),
            status: Some(status),
            detail: detail.into(),
        }
    }

    /// Message suitable for an end user.
    #[must_use]
    pub const fn friendly_message(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Network => {
                "Could not connect to the server. Please check your internet connection."
            }
            FetchErrorKind::Auth => "Authentication error. Please check your API key.",
            FetchErrorKind::RateLimited => "Too many requests. Please try again later.",
            FetchErrorKind::NotFound => "The requested resource was not found.",
            FetchErrorKind::Server => "Server error. Please try again later.",
            FetchErrorKind::Client => "An error occurred while fetching data.",
            FetchErrorKind::Parse => "The server sent an unexpected response.",
        }
    }
}

/// Errors raised by wishlist storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// File system operation failed.
    #[error("storage operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path being accessed.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Backend refused writes.
    #[error("storage is read-only")]
    ReadOnly,
}

/// Errors raised by wishlist mutations. State is unchanged when one is returned.
#[derive(Debug, Error)]
pub enum WishlistError {
    /// Serialising the collection failed.
    #[error("failed to encode wishlist")]
    Encode {
        /// Source serde error.
        source: serde_json::Error,
    },
    /// Writing the collection failed.
    #[error("failed to persist wishlist")]
    Persist {
        /// Source storage error.
        source: StorageError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        let cases = [
            (200, None),
            (204, None),
            (401, Some(FetchErrorKind::Auth)),
            (403, Some(FetchErrorKind::Auth)),
            (404, Some(FetchErrorKind::NotFound)),
            (429, Some(FetchErrorKind::RateLimited)),
            (400, Some(FetchErrorKind::Client)),
            (418, Some(FetchErrorKind::Client)),
            (500, Some(FetchErrorKind::Server)),
            (503, Some(FetchErrorKind::Server)),
            (302, Some(FetchErrorKind::Server)),
        ];
        for (status, expected) in cases {
            assert_eq!(FetchErrorKind::from_status(status), expected, "status {status}");
        }
    }

    #[test]
    fn fetch_error_messages() {
        let err = FetchError::from_status(401, "bad key");
        assert_eq!(err.kind, FetchErrorKind::Auth);
        assert_eq!(err.status, Some(401));
        assert_eq!(err.to_string(), "catalog request failed (auth)");
        assert_eq!(
            err.friendly_message(),
            "Authentication error. Please check your API key."
        );
        assert_eq!(
            FetchError::network("timeout").friendly_message(),
            "Could not connect to the server. Please check your internet connection."
        );
        assert_eq!(FetchError::from_status(200, "empty").kind, FetchErrorKind::Server);
    }
}
