//! Translation between [`FilterCriteria`] and flat string parameters.
//!
//! # Design
//! - Only non-default fields are emitted so shared URLs stay short.
//! - Decoding never fails: absent keys take defaults and unknown keys are ignored.
//! - This module is the only place that knows parameter names.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::criteria::{
    FilterCriteria, RATING_CEILING, RATING_FLOOR, RatingRange, SortOrder, join_id_list,
    parse_id_list,
};

/// Flat parameter map. Ordered so rendered query strings are stable.
pub type QueryParams = BTreeMap<String, String>;

/// Parameter names.
pub mod keys {
    /// Free-text search.
    pub const SEARCH: &str = "search";
    /// Sort key.
    pub const ORDERING: &str = "ordering";
    /// Comma-separated platform ids.
    pub const PLATFORMS: &str = "platforms";
    /// Comma-separated genre ids.
    pub const GENRES: &str = "genres";
    /// Lower rating bound.
    pub const RATING_MIN: &str = "rating_min";
    /// Upper rating bound.
    pub const RATING_MAX: &str = "rating_max";
    /// 1-based page index.
    pub const PAGE: &str = "page";
    /// Records per page.
    pub const PAGE_SIZE: &str = "page_size";
    /// Exact-match search toggle (API only).
    pub const SEARCH_PRECISE: &str = "search_precise";
}

/// Encode the non-default fields of `criteria`.
#[must_use]
pub fn encode(criteria: &FilterCriteria) -> QueryParams {
    let mut params = QueryParams::new();
    if !criteria.search.is_empty() {
        params.insert(keys::SEARCH.into(), criteria.search.clone());
    }
    if criteria.ordering != SortOrder::default() {
        params.insert(keys::ORDERING.into(), criteria.ordering.as_param().into());
    }
    if !criteria.platforms.is_empty() {
        params.insert(keys::PLATFORMS.into(), join_id_list(&criteria.platforms));
    }
    if !criteria.genres.is_empty() {
        params.insert(keys::GENRES.into(), join_id_list(&criteria.genres));
    }
    if criteria.rating.has_min() {
        params.insert(keys::RATING_MIN.into(), criteria.rating.min.to_string());
    }
    if criteria.rating.has_max() {
        params.insert(keys::RATING_MAX.into(), criteria.rating.max.to_string());
    }
    params
}

/// Decode criteria from `params`, normalising as [`crate::FilterModel`] does.
#[must_use]
pub fn decode(params: &QueryParams) -> FilterCriteria {
    let get = |key: &str| params.get(key).map(String::as_str);
    let rating_bound = |key: &str, fallback: f64| {
        get(key)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .unwrap_or(fallback)
    };

    FilterCriteria {
        search: get(keys::SEARCH).unwrap_or_default().to_string(),
        ordering: get(keys::ORDERING).map_or_else(SortOrder::default, SortOrder::parse_or_default),
        platforms: get(keys::PLATFORMS).map(parse_id_list).unwrap_or_default(),
        genres: get(keys::GENRES).map(parse_id_list).unwrap_or_default(),
        rating: RatingRange {
            min: rating_bound(keys::RATING_MIN, RATING_FLOOR),
            max: rating_bound(keys::RATING_MAX, RATING_CEILING),
        },
    }
    .normalized()
}

/// Page sizes offered to users.
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [10, 20, 30, 40];

/// Largest page size the catalog serves.
pub const MAX_PAGE_SIZE: u32 = 40;

/// Browse state carried in the address bar.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    /// Filter and sort state.
    pub criteria: FilterCriteria,
    /// 1-based page index.
    pub page: u32,
    /// Page size picked by the user; `None` keeps the configured size.
    pub page_size: Option<u32>,
}

impl Location {
    /// First page of `criteria` at the configured page size.
    #[must_use]
    pub const fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria,
            page: 1,
            page_size: None,
        }
    }
}

/// Encode criteria plus paging. Page 1 and an unset page size are implied.
#[must_use]
pub fn encode_location(location: &Location) -> QueryParams {
    let mut params = encode(&location.criteria);
    if location.page > 1 {
        params.insert(keys::PAGE.into(), location.page.to_string());
    }
    if let Some(size) = location.page_size {
        params.insert(keys::PAGE_SIZE.into(), size.to_string());
    }
    params
}

/// Decode criteria and paging from address-bar parameters.
///
/// A missing, malformed or zero page decodes to 1. A page size outside
/// `1..=MAX_PAGE_SIZE` is ignored.
#[must_use]
pub fn decode_location(params: &QueryParams) -> Location {
    let number = |key: &str| {
        params
            .get(key)
            .and_then(|raw| raw.trim().parse::<u32>().ok())
    };
    Location {
        criteria: decode(params),
        page: number(keys::PAGE).filter(|page| *page > 0).unwrap_or(1),
        page_size: number(keys::PAGE_SIZE).filter(|size| (1..=MAX_PAGE_SIZE).contains(size)),
    }
}

/// Parameters for a catalog page request.
///
/// Adds `page`, `page_size` and, when searching, `search_precise=true`.
#[must_use]
pub fn api_params(criteria: &FilterCriteria, page: u32, page_size: u32) -> QueryParams {
    let mut params = encode(criteria);
    params.insert(keys::PAGE.into(), page.max(1).to_string());
    params.insert(keys::PAGE_SIZE.into(), page_size.to_string());
    if params.contains_key(keys::SEARCH) {
        params.insert(keys::SEARCH_PRECISE.into(), "true".into());
    }
    params
}

/// Render parameters as a percent-encoded query string without the leading `?`.
#[must_use]
pub fn to_query_string(params: &QueryParams) -> String {
    let mut out = String::new();
    for (key, value) in params {
        if value.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('&');
        }
        let _ = write!(
            out,
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(value)
        );
    }
    out
}

/// Parse a query string (with or without the leading `?`).
///
/// Empty values are skipped, `+` decodes to a space, and later duplicates win.
#[must_use]
pub fn parse_query_string(raw: &str) -> QueryParams {
    let raw = raw.trim().trim_start_matches('?');
    let mut params = QueryParams::new();
    for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let (Some(key), Some(value)) = (decode_component(key), decode_component(value)) else {
            continue;
        };
        if key.is_empty() || value.is_empty() {
            continue;
        }
        params.insert(key, value);
    }
    params
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).ok().map(|cow| cow.into_owned())
}
