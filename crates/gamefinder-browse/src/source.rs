//! Fetch contract between the browse core and a catalog backend.
//!
//! # Design
//! - Wire records are narrowed into [`GameSummary`] right at the boundary.
//! - `ResultPage::from_wire` derives paging facts from the envelope links.
//! - Backends implement [`CatalogSource`]; retries are the caller's concern.

use std::collections::BTreeSet;

use async_trait::async_trait;
use gamefinder_catalog_models::{GameRecord, Paginated};
use serde::Serialize;
use url::Url;

use crate::criteria::{FilterCriteria, RATING_CEILING, RATING_FLOOR};
use crate::error::FetchError;

/// Genre attached to a listed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenreTag {
    /// Genre id usable in the `genres` filter.
    pub id: u64,
    /// Display name.
    pub name: String,
}

/// Listing view of a game.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameSummary {
    /// Stable catalog identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Release date as reported by the catalog.
    pub release_date: Option<String>,
    /// Cover image URL.
    pub cover_image_url: Option<String>,
    /// Critic score (0-100).
    pub critic_score: Option<u32>,
    /// User rating (0-5).
    pub user_rating: Option<f64>,
    /// Genres in catalog order.
    pub genres: Vec<GenreTag>,
    /// Platform names.
    pub platforms: BTreeSet<String>,
}

impl From<GameRecord> for GameSummary {
    fn from(value: GameRecord) -> Self {
        Self {
            id: value.id,
            name: value.name,
            release_date: value.released.filter(|date| !date.is_empty()),
            cover_image_url: value.background_image.filter(|url| !url.is_empty()),
            critic_score: value.metacritic.filter(|score| *score <= 100),
            user_rating: value
                .rating
                .filter(|rating| (RATING_FLOOR..=RATING_CEILING).contains(rating)),
            genres: value
                .genres
                .unwrap_or_default()
                .into_iter()
                .map(|genre| GenreTag {
                    id: genre.id,
                    name: genre.name,
                })
                .collect(),
            platforms: value
                .platforms
                .unwrap_or_default()
                .into_iter()
                .map(|entry| entry.platform.name)
                .collect(),
        }
    }
}

/// One fetched batch of results.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultPage {
    /// Items in service order.
    pub items: Vec<GameSummary>,
    /// Whether another page exists.
    pub has_more: bool,
    /// Total matches across all pages.
    pub total_count: u64,
    /// 1-based index of this page.
    pub page_index: u32,
    /// Index of the following page when `has_more` is set.
    pub next_page: Option<u32>,
}

impl ResultPage {
    /// Narrow a wire envelope fetched for page `requested`.
    ///
    /// The page index is derived from the `previous` link (absent on page 1,
    /// page-less on page 2) and falls back to `requested` when that link is
    /// unusable. `next_page` comes from the `next` link, or `page_index + 1`
    /// when the link carries no page.
    #[must_use]
    pub fn from_wire(envelope: Paginated<GameRecord>, requested: u32) -> Self {
        let page_index = match envelope.previous.as_deref() {
            None => 1,
            Some(link) => match link_page(link) {
                LinkPage::Page(previous) => previous.saturating_add(1),
                LinkPage::Absent => 2,
                LinkPage::Unparseable => requested,
            },
        };
        let next_page = envelope.next.as_deref().map(|link| match link_page(link) {
            LinkPage::Page(page) => page,
            LinkPage::Absent | LinkPage::Unparseable => page_index.saturating_add(1),
        });
        Self {
            items: envelope.results.into_iter().map(GameSummary::from).collect(),
            has_more: next_page.is_some(),
            total_count: envelope.count,
            page_index,
            next_page,
        }
    }
}

enum LinkPage {
    Page(u32),
    Absent,
    Unparseable,
}

fn link_page(link: &str) -> LinkPage {
    let Ok(url) = Url::parse(link) else {
        return LinkPage::Unparseable;
    };
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .map_or(LinkPage::Absent, |(_, value)| {
            value
                .parse::<u32>()
                .ok()
                .filter(|page| *page > 0)
                .map_or(LinkPage::Unparseable, LinkPage::Page)
        })
}

/// Backend able to serve catalog pages.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch page `page` (1-based) for `criteria`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] classified by
    /// [`FetchErrorKind`](crate::FetchErrorKind) when the request fails or
    /// the response cannot be narrowed.
    async fn fetch_page(&self, criteria: &FilterCriteria, page: u32)
    -> Result<ResultPage, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamefinder_test_support::fixtures::{game_record, games_envelope};

    #[test]
    fn summary_narrows_wire_record() {
        let mut record = game_record(42, "Portal 2");
        record.metacritic = Some(250);
        record.rating = Some(4.6);
        record.released = Some(String::new());
        let summary = GameSummary::from(record);
        assert_eq!(summary.id, 42);
        assert_eq!(summary.critic_score, None);
        assert_eq!(summary.user_rating, Some(4.6));
        assert_eq!(summary.release_date, None);
        assert_eq!(summary.genres.first().map(|g| g.name.as_str()), Some("Action"));
        assert!(summary.platforms.contains("PC"));
    }

    #[test]
    fn page_index_comes_from_links() {
        let first = ResultPage::from_wire(games_envelope(1..=20, 1, true, 45), 1);
        assert_eq!(first.page_index, 1);
        assert_eq!(first.next_page, Some(2));
        assert!(first.has_more);
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.total_count, 45);

        let second = ResultPage::from_wire(games_envelope(21..=40, 2, true, 45), 2);
        assert_eq!(second.page_index, 2);
        assert_eq!(second.next_page, Some(3));

        let last = ResultPage::from_wire(games_envelope(41..=45, 3, false, 45), 3);
        assert_eq!(last.page_index, 3);
        assert!(!last.has_more);
        assert_eq!(last.next_page, None);
    }

    #[test]
    fn unusable_links_fall_back() {
        let mut envelope = games_envelope(1..=2, 1, false, 2);
        envelope.previous = Some("not a url".into());
        envelope.next = Some("https://catalog.test/games?page_size=20".into());
        let page = ResultPage::from_wire(envelope, 5);
        assert_eq!(page.page_index, 5);
        assert_eq!(page.next_page, Some(6));
    }
}
