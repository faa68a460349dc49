//! Typed catalog records for unit tests.

use std::ops::RangeInclusive;

use gamefinder_catalog_models::{
    CatalogFacet, GameDetail, GameRecord, NamedRef, Paginated, PlatformEntry, Screenshot,
};

/// Base used for the `next`/`previous` links of fixture envelopes.
pub const LINK_BASE: &str = "https://catalog.test/api/games";

/// Listing record with one genre (`Action`) and one platform (`PC`).
#[must_use]
pub fn game_record(id: u64, name: &str) -> GameRecord {
    GameRecord {
        id,
        name: name.to_string(),
        slug: Some(name.to_lowercase().replace(' ', "-")),
        released: Some("2011-04-18".to_string()),
        background_image: Some(format!("https://media.catalog.test/{id}.jpg")),
        rating: Some(4.0),
        metacritic: Some(90),
        genres: Some(vec![named(4, "Action")]),
        platforms: Some(vec![PlatformEntry {
            platform: named(4, "PC"),
        }]),
        parent_platforms: None,
    }
}

/// Envelope for page `page` holding records for `ids`.
///
/// Links follow the catalog's conventions: no `previous` on page 1, a
/// page-less `previous` on page 2, and `next` only when `has_next` is set.
#[must_use]
pub fn games_envelope(
    ids: RangeInclusive<u64>,
    page: u32,
    has_next: bool,
    count: u64,
) -> Paginated<GameRecord> {
    games_envelope_at(LINK_BASE, ids, page, has_next, count)
}

/// [`games_envelope`] with links rooted at `base`.
#[must_use]
pub fn games_envelope_at(
    base: &str,
    ids: RangeInclusive<u64>,
    page: u32,
    has_next: bool,
    count: u64,
) -> Paginated<GameRecord> {
    Paginated {
        count,
        next: has_next.then(|| page_link(base, Some(page.saturating_add(1)))),
        previous: match page {
            0 | 1 => None,
            2 => Some(page_link(base, None)),
            other => Some(page_link(base, Some(other - 1))),
        },
        results: ids.map(|id| game_record(id, &format!("Game {id}"))).collect(),
    }
}

/// Link to `base` with the usual query, optionally carrying `page`.
#[must_use]
pub fn page_link(base: &str, page: Option<u32>) -> String {
    match page {
        Some(page) => format!("{base}?key=test&page={page}&page_size=20"),
        None => format!("{base}?key=test&page_size=20"),
    }
}

/// Detail record with developers, publishers and a website.
#[must_use]
pub fn game_detail(id: u64, name: &str) -> GameDetail {
    GameDetail {
        id,
        name: name.to_string(),
        slug: Some(name.to_lowercase().replace(' ', "-")),
        description: Some(format!("<p>{name} description.</p>")),
        description_raw: Some(format!("{name} description.")),
        released: Some("2011-04-18".to_string()),
        website: Some("https://www.example.test".to_string()),
        rating: Some(4.6),
        ratings_count: Some(5_000),
        metacritic: Some(95),
        playtime: Some(11),
        background_image: Some(format!("https://media.catalog.test/{id}.jpg")),
        developers: vec![named(1, "Valve Software")],
        publishers: vec![named(2, "Electronic Arts")],
        genres: vec![named(4, "Action"), named(7, "Puzzle")],
        platforms: Some(vec![PlatformEntry {
            platform: named(4, "PC"),
        }]),
    }
}

/// `count` screenshots for game `id`.
#[must_use]
pub fn screenshots(id: u64, count: u64) -> Vec<Screenshot> {
    (1..=count)
        .map(|n| Screenshot {
            id: id * 100 + n,
            image: format!("https://media.catalog.test/{id}/shot-{n}.jpg"),
            width: Some(1920),
            height: Some(1080),
        })
        .collect()
}

/// Lookup entries built from `(id, name)` pairs.
#[must_use]
pub fn facets(pairs: &[(u64, &str)]) -> Vec<CatalogFacet> {
    pairs
        .iter()
        .map(|(id, name)| CatalogFacet {
            id: *id,
            name: (*name).to_string(),
            slug: Some(name.to_lowercase()),
            games_count: Some(1_000),
        })
        .collect()
}

fn named(id: u64, name: &str) -> NamedRef {
    NamedRef {
        id,
        name: name.to_string(),
        slug: Some(name.to_lowercase()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_links_follow_catalog_conventions() {
        let first = games_envelope(1..=20, 1, true, 40);
        assert!(first.previous.is_none());
        assert_eq!(first.next.as_deref(), Some(page_link(LINK_BASE, Some(2)).as_str()));
        assert_eq!(first.results.len(), 20);

        let second = games_envelope(21..=40, 2, false, 40);
        assert_eq!(second.previous, Some(page_link(LINK_BASE, None)));
        assert!(second.next.is_none());

        let third = games_envelope(41..=45, 3, false, 45);
        assert_eq!(third.previous, Some(page_link(LINK_BASE, Some(2))));
    }

    #[test]
    fn empty_range_yields_empty_page() {
        assert!(games_envelope(1..=0, 1, false, 0).results.is_empty());
    }
}
