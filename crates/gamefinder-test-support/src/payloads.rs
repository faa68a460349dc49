//! JSON bodies for mock catalog servers.

use std::ops::RangeInclusive;

use serde_json::{Value, json};

use crate::fixtures;

/// `/games` body for page `page`, with links rooted at `base`.
#[must_use]
pub fn games_page(
    base: &str,
    ids: RangeInclusive<u64>,
    page: u32,
    has_next: bool,
    count: u64,
) -> Value {
    serde_json::to_value(fixtures::games_envelope_at(base, ids, page, has_next, count))
        .unwrap_or(Value::Null)
}

/// `/games/{id}` body.
#[must_use]
pub fn game_detail(id: u64, name: &str) -> Value {
    serde_json::to_value(fixtures::game_detail(id, name)).unwrap_or(Value::Null)
}

/// `/games/{id}/screenshots` body.
#[must_use]
pub fn screenshots(id: u64, count: u64) -> Value {
    json!({
        "count": count,
        "next": null,
        "previous": null,
        "results": fixtures::screenshots(id, count),
    })
}

/// `/genres` or `/platforms` body.
#[must_use]
pub fn facets(pairs: &[(u64, &str)]) -> Value {
    json!({
        "count": pairs.len(),
        "next": null,
        "previous": null,
        "results": fixtures::facets(pairs),
    })
}

/// Error body in the catalog's `{"error": ...}` shape.
#[must_use]
pub fn error_body(message: &str) -> Value {
    json!({ "error": message })
}
