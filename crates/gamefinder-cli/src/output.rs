//! Table and JSON renderers for CLI commands.
//!
//! Renderers return strings so handlers decide where the text goes.

use std::fmt::Write as _;

use anyhow::anyhow;
use gamefinder_browse::query::{encode_location, to_query_string};
use gamefinder_browse::{DisplayState, GameSummary, Location, PaginationEngine, WishlistEntry};
use gamefinder_catalog_models::{CatalogFacet, GameDetail, Screenshot};
use serde::Serialize;
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

/// Render a session; `page_size` is echoed in the query line when the user picked one.
pub(crate) fn render_session(
    engine: &PaginationEngine,
    page_size: Option<u32>,
    format: OutputFormat,
) -> CliResult<String> {
    let location = to_query_string(&encode_location(&Location {
        criteria: engine.criteria().clone(),
        page: engine.current_page(),
        page_size,
    }));
    if format == OutputFormat::Json {
        let error = engine.error().map(|err| {
            json!({ "kind": err.kind.as_str(), "message": err.friendly_message() })
        });
        return to_json(&json!({
            "query": location,
            "status": engine.status().as_str(),
            "page": engine.current_page(),
            "total": engine.total_count(),
            "has_more": engine.has_next_page(),
            "error": error,
            "items": engine.items(),
        }));
    }

    let mut out = String::new();
    match engine.display_state() {
        DisplayState::NotStarted => out.push_str("nothing requested yet"),
        DisplayState::InitialLoading => out.push_str("loading..."),
        DisplayState::NoMatches => out.push_str("no games match these filters"),
        DisplayState::LoadFailed(err) => {
            let _ = write!(out, "could not load games: {}", err.friendly_message());
        }
        DisplayState::Results {
            items,
            loading_more,
            exhausted,
            more_failed,
        } => {
            out.push_str(&format_game_table(items));
            let _ = write!(
                out,
                "\nshowing {} of {} (page {})",
                items.len(),
                engine.total_count(),
                engine.current_page()
            );
            if loading_more {
                out.push_str("\nloading more...");
            } else if let Some(err) = more_failed {
                let _ = write!(out, "\ncould not load more: {}", err.friendly_message());
            } else if exhausted {
                out.push_str("\nend of results");
            }
        }
    }
    if !location.is_empty() {
        let _ = write!(out, "\nquery: {location}");
    }
    Ok(out)
}

pub(crate) fn format_game_table(items: &[GameSummary]) -> String {
    let mut out = format!(
        "{:<8} {:>6} {:>5} {:<10} NAME",
        "ID", "RATING", "META", "RELEASED"
    );
    for game in items {
        let _ = write!(
            out,
            "\n{:<8} {:>6} {:>5} {:<10} {}",
            game.id,
            format_rating(game.user_rating),
            format_score(game.critic_score),
            game.release_date.as_deref().unwrap_or("-"),
            game.name
        );
    }
    out
}

pub(crate) fn render_game_detail(
    detail: &GameDetail,
    screenshots: &[Screenshot],
    saved: bool,
    format: OutputFormat,
) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(&json!({
            "game": detail,
            "screenshots": screenshots,
            "wishlisted": saved,
        }));
    }

    let names = |refs: &[gamefinder_catalog_models::NamedRef]| {
        refs.iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut out = format!("{} (id {})", detail.name, detail.id);
    let _ = write!(out, "\nreleased: {}", detail.released.as_deref().unwrap_or("-"));
    let _ = write!(
        out,
        "\nrating: {} ({} ratings)",
        format_rating(detail.rating),
        detail.ratings_count.unwrap_or(0)
    );
    let _ = write!(out, "\nmetacritic: {}", format_score(detail.metacritic));
    if !detail.genres.is_empty() {
        let _ = write!(out, "\ngenres: {}", names(&detail.genres));
    }
    if let Some(platforms) = detail.platforms.as_deref().filter(|p| !p.is_empty()) {
        let listed = platforms
            .iter()
            .map(|entry| entry.platform.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(out, "\nplatforms: {listed}");
    }
    if !detail.developers.is_empty() {
        let _ = write!(out, "\ndevelopers: {}", names(&detail.developers));
    }
    if !detail.publishers.is_empty() {
        let _ = write!(out, "\npublishers: {}", names(&detail.publishers));
    }
    if let Some(website) = detail.website_url() {
        let _ = write!(out, "\nwebsite: {website}");
    }
    let _ = write!(out, "\nwishlist: {}", if saved { "saved" } else { "not saved" });
    if let Some(description) = detail.plain_description() {
        let _ = write!(out, "\n\n{}", description.trim());
    }
    if !screenshots.is_empty() {
        out.push_str("\n\nscreenshots:");
        for shot in screenshots {
            let _ = write!(out, "\n  {}", shot.image);
        }
    }
    Ok(out)
}

pub(crate) fn render_facets(facets: &[CatalogFacet], format: OutputFormat) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(facets);
    }
    let mut out = format!("{:<8} {:>8} NAME", "ID", "GAMES");
    for facet in facets {
        let count = facet
            .games_count
            .map_or_else(|| "-".to_string(), |count| count.to_string());
        let _ = write!(out, "\n{:<8} {:>8} {}", facet.id, count, facet.name);
    }
    Ok(out)
}

pub(crate) fn render_wishlist(entries: &[WishlistEntry], format: OutputFormat) -> CliResult<String> {
    if format == OutputFormat::Json {
        return to_json(entries);
    }
    if entries.is_empty() {
        return Ok("wishlist is empty".to_string());
    }
    let mut out = format!(
        "{:<8} {:>6} {:>5} {:<10} NAME",
        "ID", "RATING", "META", "RELEASED"
    );
    for entry in entries {
        let _ = write!(
            out,
            "\n{:<8} {:>6} {:>5} {:<10} {}",
            entry.id,
            format_rating(entry.rating),
            format_score(entry.metacritic),
            entry.released.as_deref().unwrap_or("-"),
            entry.name
        );
    }
    let _ = write!(out, "\n{} saved", entries.len());
    Ok(out)
}

#[must_use]
pub(crate) fn format_rating(rating: Option<f64>) -> String {
    rating.map_or_else(|| "-".to_string(), |value| format!("{value:.2}"))
}

#[must_use]
pub(crate) fn format_score(score: Option<u32>) -> String {
    score.map_or_else(|| "-".to_string(), |value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamefinder_browse::{Completion, FilterCriteria, ResultPage};
    use gamefinder_test_support::fixtures;

    fn loaded_engine(has_next: bool) -> PaginationEngine {
        let mut engine = PaginationEngine::new(FilterCriteria::default());
        let request = engine.reload();
        let page = ResultPage::from_wire(fixtures::games_envelope(1..=3, 1, has_next, 3), 1);
        assert_eq!(engine.complete(request.ticket, Ok(page)), Completion::Applied);
        engine
    }

    #[test]
    fn formats_optional_numbers() {
        assert_eq!(format_rating(Some(4.456)), "4.46");
        assert_eq!(format_rating(None), "-");
        assert_eq!(format_score(Some(90)), "90");
        assert_eq!(format_score(None), "-");
    }

    #[test]
    fn table_lists_results_and_marks_the_end() {
        let text = render_session(&loaded_engine(false), None, OutputFormat::Table).expect("render");
        assert!(text.starts_with("ID"));
        assert!(text.contains("Game 2"));
        assert!(text.contains("showing 3 of 3 (page 1)"));
        assert!(text.contains("end of results"));
    }

    #[test]
    fn query_line_echoes_a_chosen_page_size() {
        let text = render_session(&loaded_engine(true), Some(30), OutputFormat::Table)
            .expect("render");
        assert!(text.ends_with("query: page_size=30"), "{text}");
        let json = render_session(&loaded_engine(true), Some(10), OutputFormat::Json)
            .expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["query"], "page_size=10");
    }

    #[test]
    fn empty_first_page_is_reported_as_no_matches() {
        let mut engine = PaginationEngine::new(FilterCriteria::default());
        let request = engine.reload();
        let page = ResultPage::from_wire(fixtures::games_envelope(1..=0, 1, false, 0), 1);
        engine.complete(request.ticket, Ok(page));
        let text = render_session(&engine, None, OutputFormat::Table).expect("render");
        assert!(text.starts_with("no games match these filters"));
    }

    #[test]
    fn json_session_carries_query_and_items() {
        let text = render_session(&loaded_engine(true), None, OutputFormat::Json).expect("render");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["status"], "idle");
        assert_eq!(value["has_more"], true);
        assert_eq!(value["items"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["error"], serde_json::Value::Null);
    }

    #[test]
    fn detail_lists_credits_and_screenshots() {
        let detail = fixtures::game_detail(4200, "Portal 2");
        let shots = fixtures::screenshots(4200, 2);
        let text = render_game_detail(&detail, &shots, true, OutputFormat::Table).expect("render");
        assert!(text.starts_with("Portal 2 (id 4200)"));
        assert!(text.contains("developers: Valve Software"));
        assert!(text.contains("genres: Action, Puzzle"));
        assert!(text.contains("wishlist: saved"));
        assert!(text.contains("shot-2.jpg"));
    }

    #[test]
    fn empty_wishlist_has_a_message() {
        assert_eq!(
            render_wishlist(&[], OutputFormat::Table).expect("render"),
            "wishlist is empty"
        );
    }
}
