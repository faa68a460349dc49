//! Shared context, error type and event logging for the CLI.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use gamefinder_browse::{FetchError, FileStorage, WishlistError, WishlistStore};
use gamefinder_client::{CatalogClient, ClientError};
use gamefinder_config::{AppConfig, CatalogOverrides, ConfigError};
use gamefinder_events::{EventBus, EventStream};
use tracing::{debug, info};

use crate::cli::{Cli, OutputFormat};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

impl From<FetchError> for CliError {
    fn from(err: FetchError) -> Self {
        debug!(kind = %err.kind, status = ?err.status, detail = %err.detail, "catalog request failed");
        let friendly = err.friendly_message();
        Self::Failure(anyhow::Error::new(err).context(friendly))
    }
}

impl From<WishlistError> for CliError {
    fn from(err: WishlistError) -> Self {
        Self::Failure(anyhow::Error::new(err).context("failed to update the wishlist"))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::InvalidField {
                field,
                value,
                reason,
            } => match value {
                Some(value) => Self::validation(format!("{field}: {reason} (got '{value}')")),
                None => Self::validation(format!("{field}: {reason}")),
            },
            ConfigError::MissingField { field } => {
                Self::validation(format!("{field} must be set"))
            }
            ConfigError::DataDirUnavailable => Self::validation(
                "no data directory available (pass --data-dir or set GAMEFINDER_DATA_DIR)",
            ),
        }
    }
}

/// Application context passed to command handlers.
pub(crate) struct AppContext {
    pub(crate) config: AppConfig,
    pub(crate) output: OutputFormat,
    pub(crate) events: EventBus,
}

impl AppContext {
    /// Load configuration from the environment and apply command-line overrides.
    pub(crate) fn from_env(cli: &Cli) -> CliResult<Self> {
        let config = AppConfig::from_env()?;
        Self::with_overrides(config, &cli.overrides(), cli.output)
    }

    pub(crate) fn with_overrides(
        mut config: AppConfig,
        overrides: &CatalogOverrides,
        output: OutputFormat,
    ) -> CliResult<Self> {
        config.apply_overrides(overrides)?;
        Ok(Self {
            config,
            output,
            events: EventBus::new(),
        })
    }

    /// Catalog client for the configured service.
    pub(crate) fn catalog(&self) -> CliResult<CatalogClient> {
        CatalogClient::new(&self.config.catalog).map_err(|err| match err {
            ClientError::Config { .. } => CliError::validation(
                "API key is required (pass --api-key or set GAMEFINDER_API_KEY)",
            ),
            ClientError::Build { source } => {
                CliError::failure(anyhow!("failed to build HTTP client: {source}"))
            }
        })
    }

    /// Wishlist stored under the configured data directory.
    pub(crate) fn wishlist(&self) -> WishlistStore<FileStorage> {
        WishlistStore::open_with_events(
            FileStorage::wishlist_in(self.config.storage.data_dir()),
            self.events.clone(),
        )
    }
}

/// Log everything published since `stream` was opened.
pub(crate) fn log_events(stream: &mut EventStream) {
    for envelope in stream.drain_ready() {
        info!(
            event_id = envelope.id,
            event = envelope.event.kind(),
            "catalog event"
        );
    }
}
