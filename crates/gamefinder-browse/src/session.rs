//! Async driver pairing a [`PaginationEngine`] with a [`CatalogSource`].
//!
//! # Design
//! - Engine transitions return a [`PendingFetch`] that owns everything it needs,
//!   so callers may race several of them and feed results back in any order.
//! - Stale results are filtered by the engine; the session only reports them.
//! - Each session is independent; a featured panel and the main list never share state.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use gamefinder_events::{Event, EventBus};
use tracing::debug;

use crate::criteria::{FilterCriteria, SortOrder};
use crate::engine::{Completion, FetchRequest, PaginationEngine, RequestTicket};
use crate::error::FetchError;
use crate::query::{encode, to_query_string};
use crate::source::{CatalogSource, ResultPage};

/// Ordering used by the featured panel.
pub const FEATURED_ORDERING: SortOrder = SortOrder::RatingDesc;

/// A fetch issued by a session but not yet awaited.
pub struct PendingFetch {
    ticket: RequestTicket,
    future: BoxFuture<'static, Result<ResultPage, FetchError>>,
}

impl PendingFetch {
    /// Ticket identifying the request.
    #[must_use]
    pub const fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    /// Perform the fetch.
    pub async fn run(self) -> FetchOutcome {
        FetchOutcome {
            ticket: self.ticket,
            result: self.future.await,
        }
    }
}

impl std::fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingFetch")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// Result of a [`PendingFetch`], ready for [`BrowseSession::finish`].
#[derive(Debug)]
pub struct FetchOutcome {
    /// Ticket the fetch was issued with.
    pub ticket: RequestTicket,
    /// What the source returned.
    pub result: Result<ResultPage, FetchError>,
}

/// One browse list bound to a catalog source.
pub struct BrowseSession<S: ?Sized> {
    label: String,
    source: Arc<S>,
    engine: PaginationEngine,
    events: Option<EventBus>,
}

impl<S> BrowseSession<S>
where
    S: CatalogSource + ?Sized + 'static,
{
    /// Session named `label` starting from `criteria`.
    #[must_use]
    pub fn new(label: impl Into<String>, source: Arc<S>, criteria: FilterCriteria) -> Self {
        Self {
            label: label.into(),
            source,
            engine: PaginationEngine::new(criteria),
            events: None,
        }
    }

    /// Featured panel: top-rated games, independent of any other session.
    ///
    /// The panel size is the page size of `source`.
    #[must_use]
    pub fn featured(source: Arc<S>) -> Self {
        Self::new(
            "featured",
            source,
            FilterCriteria::ordered_by(FEATURED_ORDERING),
        )
    }

    /// Publish resets, page loads and failures on `bus`.
    #[must_use]
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Session label used in events and logs.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Read-only view of the state machine.
    #[must_use]
    pub const fn engine(&self) -> &PaginationEngine {
        &self.engine
    }

    /// Switch criteria; returns the page-1 fetch when they changed.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> Option<PendingFetch> {
        let request = self.engine.set_criteria(criteria)?;
        self.publish_reset();
        Some(self.dispatch(request))
    }

    /// Restart from page 1 with the current criteria.
    pub fn reload(&mut self) -> PendingFetch {
        let request = self.engine.reload();
        self.publish_reset();
        self.dispatch(request)
    }

    /// Request the next page when allowed.
    pub fn load_more(&mut self) -> Option<PendingFetch> {
        let request = self.engine.load_more()?;
        Some(self.dispatch(request))
    }

    /// Re-issue the failed request when in the error state.
    pub fn retry(&mut self) -> Option<PendingFetch> {
        let request = self.engine.retry()?;
        Some(self.dispatch(request))
    }

    /// Apply a completed fetch.
    pub fn finish(&mut self, outcome: FetchOutcome) -> Completion {
        let page = outcome.ticket.page();
        let completion = self.engine.complete(outcome.ticket, outcome.result);
        match completion {
            Completion::Applied => {
                let exhausted = !self.engine.has_next_page();
                debug!(
                    session = %self.label,
                    page,
                    items = self.engine.items().len(),
                    exhausted,
                    "page loaded"
                );
                self.publish(Event::PageLoaded {
                    session: self.label.clone(),
                    page,
                    items: self.engine.items().len(),
                    exhausted,
                });
            }
            Completion::Failed | Completion::Rejected => {
                let kind = self
                    .engine
                    .error()
                    .map_or("unknown", |err| err.kind.as_str());
                self.publish(Event::FetchFailed {
                    session: self.label.clone(),
                    page,
                    kind: kind.to_string(),
                });
            }
            Completion::Stale => {
                debug!(session = %self.label, page, "stale result dropped");
            }
        }
        completion
    }

    /// Start (or restart) the session and wait for page 1.
    pub async fn start(&mut self) -> Completion {
        let pending = self.reload();
        let outcome = pending.run().await;
        self.finish(outcome)
    }

    /// Switch criteria and wait for page 1. `None` when nothing changed.
    pub async fn apply_criteria(&mut self, criteria: FilterCriteria) -> Option<Completion> {
        let pending = self.set_criteria(criteria)?;
        let outcome = pending.run().await;
        Some(self.finish(outcome))
    }

    /// Load the next page and wait for it. `None` when not allowed.
    pub async fn next_page(&mut self) -> Option<Completion> {
        let pending = self.load_more()?;
        let outcome = pending.run().await;
        Some(self.finish(outcome))
    }

    /// Retry the failed request and wait for it. `None` when not in error.
    pub async fn retry_now(&mut self) -> Option<Completion> {
        let pending = self.retry()?;
        let outcome = pending.run().await;
        Some(self.finish(outcome))
    }

    fn dispatch(&self, request: FetchRequest) -> PendingFetch {
        let FetchRequest {
            ticket,
            criteria,
            page,
        } = request;
        let source = Arc::clone(&self.source);
        debug!(session = %self.label, page, "fetch issued");
        PendingFetch {
            ticket,
            future: Box::pin(async move { source.fetch_page(&criteria, page).await }),
        }
    }

    fn publish_reset(&self) {
        let query = to_query_string(&encode(self.engine.criteria()));
        self.publish(Event::BrowseReset {
            session: self.label.clone(),
            query,
        });
    }

    fn publish(&self, event: Event) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }
}
