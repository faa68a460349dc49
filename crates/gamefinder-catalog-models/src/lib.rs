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
//! Wire DTOs for the remote game catalog service.
//!
//! These types describe exactly what the catalog returns over HTTP. The browse
//! core narrows them into its own view models immediately after a response is
//! decoded, so any field the service omits or nulls out is modelled here as
//! `Option` or a defaulted collection rather than trusted blindly.
use serde::{Deserialize, Serialize};

/// Paginated envelope returned by list endpoints (`/games`, `/genres`, `/platforms`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    #[serde(default)]
    /// Total number of records matching the query across all pages.
    pub count: u64,
    #[serde(default)]
    /// Absolute URL of the next page, absent on the last page.
    pub next: Option<String>,
    #[serde(default)]
    /// Absolute URL of the previous page, absent on the first page.
    pub previous: Option<String>,
    /// Records on this page in service order.
    pub results: Vec<T>,
}

/// Unpaginated result list (screenshots).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultList<T> {
    #[serde(default)]
    /// Number of records in the list when the service reports it.
    pub count: Option<u64>,
    /// Records in service order.
    pub results: Vec<T>,
}

/// Small `{id, name, slug}` reference used for genres, developers and publishers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NamedRef {
    /// Catalog identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// URL-safe slug.
    pub slug: Option<String>,
}

/// Platform wrapper as nested inside game records (`{"platform": {...}}`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlatformEntry {
    /// Referenced platform.
    pub platform: NamedRef,
}

/// Game record as listed by `/games`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameRecord {
    /// Stable catalog identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// URL-safe slug.
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Release date as `YYYY-MM-DD`.
    pub released: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Cover/background image URL.
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Average user rating on a 0–5 scale.
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Critic score on a 0–100 scale.
    pub metacritic: Option<u32>,
    #[serde(default)]
    /// Genres in service order; the catalog sends `null` for some records.
    pub genres: Option<Vec<NamedRef>>,
    #[serde(default)]
    /// Specific platforms the game ships on.
    pub platforms: Option<Vec<PlatformEntry>>,
    #[serde(default)]
    /// Platform families (PC, PlayStation, ...).
    pub parent_platforms: Option<Vec<PlatformEntry>>,
}

/// Full record returned by `/games/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameDetail {
    /// Stable catalog identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// URL-safe slug.
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// HTML description.
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Plain-text description.
    pub description_raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Release date as `YYYY-MM-DD`.
    pub released: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Official website; the catalog sends an empty string when unknown.
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Average user rating on a 0–5 scale.
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Number of user ratings behind `rating`.
    pub ratings_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Critic score on a 0–100 scale.
    pub metacritic: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Average playtime in hours.
    pub playtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Cover/background image URL.
    pub background_image: Option<String>,
    #[serde(default)]
    /// Developer studios.
    pub developers: Vec<NamedRef>,
    #[serde(default)]
    /// Publishers.
    pub publishers: Vec<NamedRef>,
    #[serde(default)]
    /// Genres in service order.
    pub genres: Vec<NamedRef>,
    #[serde(default)]
    /// Platforms the game ships on.
    pub platforms: Option<Vec<PlatformEntry>>,
}

impl GameDetail {
    /// Website URL when the catalog knows one.
    #[must_use]
    pub fn website_url(&self) -> Option<&str> {
        self.website.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Best available plain description.
    #[must_use]
    pub fn plain_description(&self) -> Option<&str> {
        let present = |text: &&str| !text.trim().is_empty();
        self.description_raw
            .as_deref()
            .filter(present)
            .or_else(|| self.description.as_deref().filter(present))
    }
}

/// Screenshot returned by `/games/{id}/screenshots`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Screenshot {
    /// Screenshot identifier.
    pub id: u64,
    /// Image URL.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Pixel width when reported.
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Pixel height when reported.
    pub height: Option<u32>,
}

/// Lookup entry returned by `/genres` and `/platforms`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogFacet {
    /// Identifier used in `genres=`/`platforms=` filters.
    pub id: u64,
    /// Display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// URL-safe slug.
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Number of games tagged with this facet.
    pub games_count: Option<u64>,
}
