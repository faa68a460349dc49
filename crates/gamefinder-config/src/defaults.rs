//! Default values and accepted ranges for configuration fields.
//!
//! # Design
//! - Keep every fallback in one place so the loader and the CLI help agree.
//! - Bounds are inclusive.

use std::ops::RangeInclusive;

/// Catalog endpoint used when `GAMEFINDER_API_URL` is unset.
pub const API_BASE_URL: &str = "https://api.rawg.io/api/";
/// Records requested per page.
pub const PAGE_SIZE: u32 = 20;
/// Accepted page sizes.
pub const PAGE_SIZE_RANGE: RangeInclusive<u32> = 1..=40;
/// Per-request timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Accepted request timeouts in seconds.
pub const HTTP_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=120;
/// Quiescence window for free-text search in milliseconds.
pub const SEARCH_DEBOUNCE_MS: u64 = 500;
/// Quiescence window for sort/rating controls in milliseconds.
pub const CONTROL_DEBOUNCE_MS: u64 = 300;
/// Accepted debounce windows in milliseconds.
pub const DEBOUNCE_RANGE: RangeInclusive<u64> = 0..=5_000;
/// Page size of the featured panel.
pub const FEATURED_LIMIT: u32 = 8;
/// Accepted featured panel sizes.
pub const FEATURED_LIMIT_RANGE: RangeInclusive<u32> = 1..=40;
/// Directory name appended to the OS data directory.
pub const DATA_DIR_NAME: &str = "gamefinder";
/// Log level when neither `RUST_LOG` nor `GAMEFINDER_LOG_LEVEL` is set.
pub const LOG_LEVEL: &str = "info";
