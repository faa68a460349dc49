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
//! Logging primitives shared across the gamefinder workspace.
//!
//! This crate centralises subscriber installation and the process-wide span so
//! the CLI and the browse core emit consistent structured logs.

pub mod context;
pub mod error;
pub mod init;

pub use context::{GlobalContextGuard, current_command, with_command_context};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
