//! Environment loading and command-line overrides.
//!
//! # Design
//! - Every variable is optional except where a command needs it; blank values count as unset.
//! - Lookups go through a closure so tests never touch the process environment.
//! - Overrides reuse the same validators as the environment path.

use std::path::PathBuf;
use std::time::Duration;

use gamefinder_telemetry::LogFormat;
use tracing::debug;

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::model::{ApiKey, AppConfig, BrowseConfig, CatalogConfig, LogSettings, StorageConfig};
use crate::validate::{check_bounds, parse_base_url, parse_bounded};

/// Prefix shared by every recognised environment variable.
pub const ENV_PREFIX: &str = "GAMEFINDER_";

const API_URL: &str = "GAMEFINDER_API_URL";
const API_KEY: &str = "GAMEFINDER_API_KEY";
const PAGE_SIZE: &str = "GAMEFINDER_PAGE_SIZE";
const HTTP_TIMEOUT: &str = "GAMEFINDER_HTTP_TIMEOUT_SECS";
const SEARCH_DEBOUNCE: &str = "GAMEFINDER_SEARCH_DEBOUNCE_MS";
const CONTROL_DEBOUNCE: &str = "GAMEFINDER_CONTROL_DEBOUNCE_MS";
const FEATURED_LIMIT: &str = "GAMEFINDER_FEATURED_LIMIT";
const DATA_DIR: &str = "GAMEFINDER_DATA_DIR";
const LOG_LEVEL: &str = "GAMEFINDER_LOG_LEVEL";
const LOG_FORMAT: &str = "GAMEFINDER_LOG_FORMAT";

/// Catalog settings supplied on the command line, applied after the environment.
#[derive(Debug, Clone, Default)]
pub struct CatalogOverrides {
    /// Replacement base URL.
    pub api_url: Option<String>,
    /// Replacement credential.
    pub api_key: Option<String>,
    /// Replacement page size.
    pub page_size: Option<u32>,
    /// Replacement request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Replacement data directory.
    pub data_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is present but invalid.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a value is present but invalid, or when no
    /// data directory can be determined.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_base_url = match get(API_URL) {
            Some(raw) => parse_base_url(API_URL, &raw)?,
            None => parse_base_url(API_URL, defaults::API_BASE_URL)?,
        };
        let page_size = get(PAGE_SIZE)
            .map(|raw| parse_bounded(PAGE_SIZE, &raw, &defaults::PAGE_SIZE_RANGE))
            .transpose()?
            .unwrap_or(defaults::PAGE_SIZE);
        let timeout_secs = get(HTTP_TIMEOUT)
            .map(|raw| parse_bounded(HTTP_TIMEOUT, &raw, &defaults::HTTP_TIMEOUT_RANGE))
            .transpose()?
            .unwrap_or(defaults::HTTP_TIMEOUT_SECS);
        let search_ms = get(SEARCH_DEBOUNCE)
            .map(|raw| parse_bounded(SEARCH_DEBOUNCE, &raw, &defaults::DEBOUNCE_RANGE))
            .transpose()?
            .unwrap_or(defaults::SEARCH_DEBOUNCE_MS);
        let control_ms = get(CONTROL_DEBOUNCE)
            .map(|raw| parse_bounded(CONTROL_DEBOUNCE, &raw, &defaults::DEBOUNCE_RANGE))
            .transpose()?
            .unwrap_or(defaults::CONTROL_DEBOUNCE_MS);
        let featured_limit = get(FEATURED_LIMIT)
            .map(|raw| parse_bounded(FEATURED_LIMIT, &raw, &defaults::FEATURED_LIMIT_RANGE))
            .transpose()?
            .unwrap_or(defaults::FEATURED_LIMIT);
        let data_dir = match get(DATA_DIR) {
            Some(raw) => PathBuf::from(raw.trim()),
            None => default_data_dir()?,
        };
        let format = get(LOG_FORMAT)
            .map(|raw| {
                raw.parse::<LogFormat>()
                    .map_err(|_| ConfigError::InvalidField {
                        field: LOG_FORMAT,
                        value: Some(raw.clone()),
                        reason: "must be json or pretty",
                    })
            })
            .transpose()?
            .unwrap_or_else(LogFormat::infer);

        let config = Self {
            catalog: CatalogConfig {
                api_base_url,
                api_key: get(API_KEY).and_then(ApiKey::new),
                page_size,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            browse: BrowseConfig {
                search_debounce: Duration::from_millis(search_ms),
                control_debounce: Duration::from_millis(control_ms),
                featured_limit,
            },
            storage: StorageConfig { data_dir },
            logging: LogSettings {
                level: get(LOG_LEVEL).unwrap_or_else(|| defaults::LOG_LEVEL.to_string()),
                format,
            },
        };
        debug!(
            api_base_url = %config.catalog.api_base_url,
            page_size = config.catalog.page_size,
            has_api_key = config.catalog.api_key.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when an override fails the same
    /// validation the environment values go through.
    pub fn apply_overrides(&mut self, overrides: &CatalogOverrides) -> ConfigResult<()> {
        if let Some(raw) = overrides.api_url.as_deref() {
            self.catalog.api_base_url = parse_base_url("--api-url", raw)?;
        }
        if let Some(raw) = overrides.api_key.as_deref() {
            self.catalog.api_key = Some(ApiKey::new(raw).ok_or(ConfigError::InvalidField {
                field: "--api-key",
                value: None,
                reason: "must not be blank",
            })?);
        }
        if let Some(size) = overrides.page_size {
            self.catalog.page_size = check_bounds("--page-size", size, &defaults::PAGE_SIZE_RANGE)?;
        }
        if let Some(secs) = overrides.timeout_secs {
            let secs = check_bounds("--timeout-secs", secs, &defaults::HTTP_TIMEOUT_RANGE)?;
            self.catalog.request_timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = overrides.data_dir.as_ref() {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidField {
                    field: "--data-dir",
                    value: None,
                    reason: "must not be empty",
                });
            }
            self.storage.data_dir.clone_from(dir);
        }
        Ok(())
    }
}

fn default_data_dir() -> ConfigResult<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join(defaults::DATA_DIR_NAME))
        .ok_or(ConfigError::DataDirUnavailable)
}
