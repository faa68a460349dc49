//! Typed configuration sections.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use gamefinder_telemetry::LogFormat;
use url::Url;

/// Fully resolved configuration for one process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Remote catalog connection settings.
    pub catalog: CatalogConfig,
    /// Browse behaviour tuning.
    pub browse: BrowseConfig,
    /// Local persistence.
    pub storage: StorageConfig,
    /// Logging preferences.
    pub logging: LogSettings,
}

/// Connection settings for the remote catalog service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Base URL, always ending in `/` so relative joins keep the path prefix.
    pub api_base_url: Url,
    /// Credential appended as `key=` to every request.
    pub api_key: Option<ApiKey>,
    /// Records requested per page.
    pub page_size: u32,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl CatalogConfig {
    /// Borrow the API key or report it as missing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ConfigError::MissingField`] when no key is configured.
    pub fn require_api_key(&self) -> crate::ConfigResult<&ApiKey> {
        self.api_key
            .as_ref()
            .ok_or(crate::ConfigError::MissingField {
                field: "GAMEFINDER_API_KEY",
            })
    }
}

/// Tuning for browse sessions and input controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowseConfig {
    /// Quiescence window for free-text search.
    pub search_debounce: Duration,
    /// Quiescence window for sort and rating controls.
    pub control_debounce: Duration,
    /// Page size of the featured panel.
    pub featured_limit: u32,
}

/// Where local state lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory holding the wishlist file.
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Borrow the data directory.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Logging preferences resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Level directive used when `RUST_LOG` is absent.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

/// Catalog credential. `Debug` and `Display` never reveal the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key, rejecting blank input.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Secret value for request construction.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}
