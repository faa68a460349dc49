#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Process configuration for the gamefinder tools.
//!
//! Layout: `model.rs` (typed config sections), `defaults.rs` (fallback values
//! and bounds), `validate.rs` (parsing helpers), `loader.rs` (environment
//! lookup and CLI overrides).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{CatalogOverrides, ENV_PREFIX};
pub use model::{ApiKey, AppConfig, BrowseConfig, CatalogConfig, LogSettings, StorageConfig};
