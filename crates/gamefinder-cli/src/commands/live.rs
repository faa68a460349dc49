//! Interactive search: every input line is the current search text, committed
//! once typing pauses for the debounce window.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use gamefinder_browse::{
    BrowseSession, CatalogSource, Completion, CriteriaPatch, Debouncer, FilterCriteria,
    FilterModel, SortOrder,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::{LiveArgs, OutputFormat};
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_session;

const PROMPT: &str = "type to search; an empty line searches now; :clear empties the search; \
     :sort <key> and :rating <min> <max> adjust filters; :more; :retry; :q quits";

/// Quiescence windows for the two kinds of input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LiveWindows {
    pub(crate) search: Duration,
    pub(crate) control: Duration,
}

/// One line of live input.
#[derive(Debug, PartialEq)]
pub(crate) enum LiveInput {
    Quit,
    More,
    Retry,
    Commit,
    Clear,
    Sort(SortOrder),
    Rating(Option<f64>, Option<f64>),
    Text(String),
}

impl LiveInput {
    pub(crate) fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let mut words = trimmed.split_whitespace();
        match words.next().unwrap_or_default() {
            ":q" | ":quit" => Self::Quit,
            ":more" => Self::More,
            ":retry" => Self::Retry,
            ":clear" => Self::Clear,
            ":sort" => Self::Sort(SortOrder::parse_or_default(words.next().unwrap_or_default())),
            ":rating" => {
                let mut bound = || words.next().and_then(|raw| raw.parse::<f64>().ok());
                let min = bound();
                Self::Rating(min, bound())
            }
            "" => Self::Commit,
            _ => Self::Text(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

pub(crate) async fn handle_live(ctx: &AppContext, args: LiveArgs) -> CliResult<()> {
    let windows = LiveWindows {
        search: args
            .debounce_ms
            .map_or(ctx.config.browse.search_debounce, Duration::from_millis),
        control: ctx.config.browse.control_debounce,
    };
    let source = Arc::new(ctx.catalog()?);
    let session = BrowseSession::new("live", source, FilterCriteria::default())
        .with_events(ctx.events.clone());
    eprintln!("{PROMPT}");
    let mut stdout = io::stdout();
    run_live(
        BufReader::new(tokio::io::stdin()),
        &mut stdout,
        session,
        windows,
        ctx.output,
    )
    .await
}

/// Drive `session` from `input` until `:q` or end of input.
///
/// Search text and rating bounds are debounced separately. `:sort` and
/// `:clear` apply at once; a sort absorbs any rating change still pending. At end of input pending changes are committed and outstanding fetches
/// are awaited, so piped input still produces results.
pub(crate) async fn run_live<R, W, S>(
    input: R,
    out: &mut W,
    mut session: BrowseSession<S>,
    windows: LiveWindows,
    format: OutputFormat,
) -> CliResult<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: CatalogSource + ?Sized + 'static,
{
    let (mut search, mut searches) = Debouncer::new(windows.search);
    let (mut controls, mut control_patches) = Debouncer::new(windows.control);
    let mut model = FilterModel::new();
    let mut inflight = FuturesUnordered::new();
    let mut lines = input.lines();
    debug!(
        search_window = ?search.window(),
        control_window = ?controls.window(),
        "live search started"
    );

    loop {
        tokio::select! {
            biased;
            line = lines.next_line() => {
                let line = line
                    .map_err(|err| CliError::failure(anyhow!("failed to read input: {err}")))?;
                let Some(line) = line else { break };
                match LiveInput::parse(&line) {
                    LiveInput::Quit => {
                        search.cancel();
                        controls.cancel();
                        return Ok(());
                    }
                    LiveInput::More => inflight.extend(session.load_more().map(|p| p.run())),
                    LiveInput::Retry => inflight.extend(session.retry().map(|p| p.run())),
                    LiveInput::Commit => {
                        let flushed = controls.flush() | search.flush();
                        if !flushed && !session.engine().is_started() {
                            inflight.push(session.reload().run());
                        }
                    }
                    LiveInput::Clear => search.submit_now(String::new()),
                    LiveInput::Sort(order) => {
                        let mut patch: CriteriaPatch = controls.take_pending().unwrap_or_default();
                        patch.ordering = Some(order);
                        controls.submit_now(patch);
                    }
                    LiveInput::Rating(min, max) => controls.submit(CriteriaPatch {
                        rating_min: min,
                        rating_max: max,
                        ..CriteriaPatch::default()
                    }),
                    LiveInput::Text(text) => search.submit(text),
                }
            }
            Some(patch) = control_patches.recv() => {
                let criteria = model.update(patch);
                debug!(ordering = %criteria.ordering, "filters committed");
                inflight.extend(session.set_criteria(criteria).map(|p| p.run()));
            }
            Some(text) = searches.recv() => {
                let criteria = model.update(CriteriaPatch::search(text));
                debug!(search = %criteria.search, "search committed");
                inflight.extend(session.set_criteria(criteria).map(|p| p.run()));
            }
            Some(outcome) = inflight.next(), if !inflight.is_empty() => {
                if session.finish(outcome) != Completion::Stale {
                    emit(out, &render_session(session.engine(), None, format)?)?;
                }
            }
        }
    }

    controls.flush();
    search.flush();
    while let Ok(patch) = control_patches.try_recv() {
        model.update(patch);
    }
    while let Ok(text) = searches.try_recv() {
        model.update(CriteriaPatch::search(text));
    }
    inflight.extend(session.set_criteria(model.current().clone()).map(|p| p.run()));
    while let Some(outcome) = inflight.next().await {
        if session.finish(outcome) != Completion::Stale {
            emit(out, &render_session(session.engine(), None, format)?)?;
        }
    }
    Ok(())
}

fn emit<W: Write>(out: &mut W, text: &str) -> CliResult<()> {
    writeln!(out, "{text}")
        .and_then(|()| out.flush())
        .map_err(|err| CliError::failure(anyhow!("failed to write output: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamefinder_client::CatalogClient;
    use gamefinder_test_support::payloads;
    use httpmock::prelude::*;

    fn session_for(server: &MockServer) -> BrowseSession<CatalogClient> {
        let client = CatalogClient::with_http(
            reqwest_client(),
            format!("{}/api/", server.base_url())
                .parse()
                .expect("valid URL"),
            "test-key",
            20,
        );
        BrowseSession::new("live", Arc::new(client), FilterCriteria::default())
    }

    fn reqwest_client() -> gamefinder_client::HttpClient {
        gamefinder_client::HttpClient::new()
    }

    const fn windows(window: Duration) -> LiveWindows {
        LiveWindows {
            search: window,
            control: window,
        }
    }

    #[test]
    fn parses_commands_and_text() {
        assert_eq!(LiveInput::parse(":q"), LiveInput::Quit);
        assert_eq!(LiveInput::parse(" :more "), LiveInput::More);
        assert_eq!(LiveInput::parse(":retry"), LiveInput::Retry);
        assert_eq!(LiveInput::parse("   "), LiveInput::Commit);
        assert_eq!(LiveInput::parse("zelda"), LiveInput::Text("zelda".into()));
        assert_eq!(
            LiveInput::parse(":sort -metacritic"),
            LiveInput::Sort(SortOrder::MetacriticDesc)
        );
        assert_eq!(LiveInput::parse(":sort"), LiveInput::Sort(SortOrder::AddedDesc));
        assert_eq!(
            LiveInput::parse(":rating 3 4.5"),
            LiveInput::Rating(Some(3.0), Some(4.5))
        );
        assert_eq!(LiveInput::parse(":rating x"), LiveInput::Rating(None, None));
        assert_eq!(LiveInput::parse(" :clear"), LiveInput::Clear);
    }

    #[tokio::test]
    async fn sort_keeps_a_pending_rating_change() {
        let server = MockServer::start_async().await;
        let base = format!("{}/api/games", server.base_url());
        let combined = server.mock(|when, then| {
            when.method(GET)
                .path("/api/games")
                .query_param("ordering", "-rating")
                .query_param("rating_min", "4");
            then.status(200)
                .json_body(payloads::games_page(&base, 70..=72, 1, false, 3));
        });

        let mut out = Vec::new();
        run_live(
            &b":rating 4\n:sort -rating\n"[..],
            &mut out,
            session_for(&server),
            windows(Duration::from_secs(60)),
            OutputFormat::Table,
        )
        .await
        .expect("live run");

        combined.assert_calls(1);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("query: ordering=-rating&rating_min=4"), "{text}");
    }

    #[tokio::test]
    async fn clear_empties_the_search_immediately() {
        let server = MockServer::start_async().await;
        let base = format!("{}/api/games", server.base_url());
        let unfiltered = server.mock(|when, then| {
            when.method(GET).path("/api/games");
            then.status(200)
                .json_body(payloads::games_page(&base, 1..=2, 1, false, 2));
        });

        let mut out = Vec::new();
        run_live(
            &b"portal\n:clear\n"[..],
            &mut out,
            session_for(&server),
            windows(Duration::from_secs(60)),
            OutputFormat::Table,
        )
        .await
        .expect("live run");

        unfiltered.assert_calls(1);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Game 2"));
        assert!(!text.contains("search=portal"), "{text}");
    }

    #[tokio::test]
    async fn filter_commands_combine_with_search() {
        let server = MockServer::start_async().await;
        let base = format!("{}/api/games", server.base_url());
        let combined = server.mock(|when, then| {
            when.method(GET)
                .path("/api/games")
                .query_param("search", "portal")
                .query_param("ordering", "-rating")
                .query_param("rating_min", "4");
            then.status(200)
                .json_body(payloads::games_page(&base, 40..=41, 1, false, 2));
        });

        let mut out = Vec::new();
        run_live(
            &b":sort -rating\n:rating 4\nportal\n"[..],
            &mut out,
            session_for(&server),
            windows(Duration::from_secs(60)),
            OutputFormat::Table,
        )
        .await
        .expect("live run");

        combined.assert_calls(1);
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Game 41"));
    }

    #[tokio::test]
    async fn last_search_wins_and_stale_results_are_not_shown() {
        let server = MockServer::start_async().await;
        let base = format!("{}/api/games", server.base_url());
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/games")
                .query_param("search", "zel");
            then.status(200)
                .json_body(payloads::games_page(&base, 900..=901, 1, false, 2));
        });
        server.mock(|when, then| {
            when.method(GET)
                .path("/api/games")
                .query_param("search", "zelda");
            then.status(200)
                .json_body(payloads::games_page(&base, 1..=3, 1, false, 3));
        });

        let mut out = Vec::new();
        run_live(
            &b"zel\nzelda\n"[..],
            &mut out,
            session_for(&server),
            windows(Duration::ZERO),
            OutputFormat::Table,
        )
        .await
        .expect("live run");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Game 3"));
        assert!(text.contains("query: search=zelda"));
        assert!(!text.contains("Game 900"));
    }

    #[tokio::test]
    async fn quit_stops_without_fetching() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/games");
            then.status(200);
        });
        let mut out = Vec::new();
        run_live(
            &b"zelda\n:q\n"[..],
            &mut out,
            session_for(&server),
            windows(Duration::from_secs(60)),
            OutputFormat::Table,
        )
        .await
        .expect("live run");
        assert!(out.is_empty());
        mock.assert_calls(0);
    }
}
