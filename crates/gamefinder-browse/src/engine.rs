//! Pagination and accumulation state machine.
//!
//! # Design
//! - Sans-IO: operations return a [`FetchRequest`] describing what to fetch and
//!   results are fed back through [`PaginationEngine::complete`].
//! - Every request carries a [`RequestTicket`]; only the ticket currently in
//!   flight may mutate state, so the last criteria win over the last response.
//! - A criteria change replaces the session wholesale: items, cursor and error
//!   are discarded and a new generation begins.
//! - A failed "load more" keeps every item already accumulated.

use std::collections::HashSet;

use tracing::debug;

use crate::criteria::FilterCriteria;
use crate::error::FetchError;
use crate::source::{GameSummary, ResultPage};

/// Session status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrowseStatus {
    /// No fetch outstanding and more pages may exist (or nothing started yet).
    #[default]
    Idle,
    /// A fetch is outstanding.
    Loading,
    /// The last fetch failed; [`PaginationEngine::retry`] re-issues it.
    Error,
    /// Every page for the current criteria has been loaded.
    Exhausted,
}

impl BrowseStatus {
    /// Lowercase name for logs and rendering.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Error => "error",
            Self::Exhausted => "exhausted",
        }
    }
}

/// Identity of one issued request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    generation: u64,
    sequence: u64,
    page: u32,
}

impl RequestTicket {
    /// Criteria generation the request belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Page the request asks for.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }
}

/// Work item produced by the engine for the IO layer.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    /// Ticket to hand back with the result.
    pub ticket: RequestTicket,
    /// Criteria to fetch for.
    pub criteria: FilterCriteria,
    /// 1-based page index.
    pub page: u32,
}

/// What [`PaginationEngine::complete`] did with a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Completion {
    /// The page was appended.
    Applied,
    /// The fetch failed and the session moved to `Error`.
    Failed,
    /// The page index did not match the request; nothing was appended and the
    /// session moved to `Error`.
    Rejected,
    /// The ticket is no longer current; state is untouched.
    Stale,
}

/// What a presentation layer should show for a session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisplayState<'a> {
    /// Nothing requested yet.
    NotStarted,
    /// First page is loading.
    InitialLoading,
    /// The first page loaded successfully and was empty.
    NoMatches,
    /// The first page failed.
    LoadFailed(&'a FetchError),
    /// At least one item is available.
    Results {
        /// Accumulated items.
        items: &'a [GameSummary],
        /// A further page is loading.
        loading_more: bool,
        /// No further pages exist.
        exhausted: bool,
        /// Failure of the latest "load more", if any.
        more_failed: Option<&'a FetchError>,
    },
}

/// State owned by one browse session.
#[derive(Debug, Default)]
pub struct PaginationEngine {
    criteria: FilterCriteria,
    items: Vec<GameSummary>,
    seen: HashSet<u64>,
    current_page: u32,
    target_page: u32,
    has_next_page: bool,
    total_count: u64,
    status: BrowseStatus,
    error: Option<FetchError>,
    generation: u64,
    sequence: u64,
    in_flight: Option<RequestTicket>,
    started: bool,
}

impl PaginationEngine {
    /// Engine for `criteria` that has not fetched anything yet.
    #[must_use]
    pub fn new(criteria: FilterCriteria) -> Self {
        Self {
            criteria: criteria.normalized(),
            ..Self::default()
        }
    }

    /// Criteria the current items belong to.
    #[must_use]
    pub const fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Accumulated items in page-then-intra-page order.
    #[must_use]
    pub fn items(&self) -> &[GameSummary] {
        &self.items
    }

    /// Last page successfully appended (0 before the first success).
    #[must_use]
    pub const fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Whether the catalog reported a further page.
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Total matches reported by the catalog.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> BrowseStatus {
        self.status
    }

    /// Error from the last failed fetch.
    #[must_use]
    pub const fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Ticket of the outstanding request.
    #[must_use]
    pub const fn in_flight(&self) -> Option<RequestTicket> {
        self.in_flight
    }

    /// Whether any fetch has been issued.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Switch to `criteria`.
    ///
    /// Criteria equal to the stored ones are ignored once the session has
    /// started; anything else resets the session and requests page 1.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> Option<FetchRequest> {
        let criteria = criteria.normalized();
        if self.started && criteria == self.criteria {
            debug!("criteria unchanged; keeping accumulated results");
            return None;
        }
        self.criteria = criteria;
        Some(self.reset())
    }

    /// Discard everything and request page 1 for the stored criteria.
    pub fn reload(&mut self) -> FetchRequest {
        self.reset()
    }

    /// Request the next page when the session is idle with more pages available.
    pub fn load_more(&mut self) -> Option<FetchRequest> {
        if self.status != BrowseStatus::Idle || !self.has_next_page || self.in_flight.is_some() {
            debug!(status = self.status.as_str(), "load more ignored");
            return None;
        }
        let page = self.current_page.saturating_add(1);
        Some(self.issue(page))
    }

    /// Re-issue the failed request (same criteria, same page).
    pub fn retry(&mut self) -> Option<FetchRequest> {
        if self.status != BrowseStatus::Error || self.in_flight.is_some() {
            return None;
        }
        Some(self.issue(self.target_page))
    }

    /// Feed back the result for `ticket`.
    pub fn complete(
        &mut self,
        ticket: RequestTicket,
        result: Result<ResultPage, FetchError>,
    ) -> Completion {
        if self.in_flight != Some(ticket) {
            debug!(
                generation = ticket.generation,
                page = ticket.page,
                current_generation = self.generation,
                "discarding stale response"
            );
            return Completion::Stale;
        }
        self.in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                debug!(page = ticket.page, kind = err.kind.as_str(), "fetch failed");
                self.status = BrowseStatus::Error;
                self.error = Some(err);
                return Completion::Failed;
            }
        };

        if page.page_index != ticket.page {
            debug!(
                requested = ticket.page,
                received = page.page_index,
                "rejecting out-of-order page"
            );
            self.status = BrowseStatus::Error;
            self.error = Some(FetchError::parse(format!(
                "requested page {} but received page {}",
                ticket.page, page.page_index
            )));
            return Completion::Rejected;
        }

        let received = page.items.len();
        for item in page.items {
            if self.seen.insert(item.id) {
                self.items.push(item);
            }
        }
        debug!(page = ticket.page, received, total = self.items.len(), "page applied");
        self.current_page = ticket.page;
        self.has_next_page = page.has_more;
        self.total_count = page.total_count;
        self.error = None;
        self.status = if page.has_more {
            BrowseStatus::Idle
        } else {
            BrowseStatus::Exhausted
        };
        Completion::Applied
    }

    /// Summarise the session for rendering.
    #[must_use]
    pub fn display_state(&self) -> DisplayState<'_> {
        if self.items.is_empty() {
            return match self.status {
                BrowseStatus::Loading => DisplayState::InitialLoading,
                BrowseStatus::Error => self
                    .error
                    .as_ref()
                    .map_or(DisplayState::InitialLoading, DisplayState::LoadFailed),
                BrowseStatus::Idle | BrowseStatus::Exhausted if self.started => {
                    DisplayState::NoMatches
                }
                BrowseStatus::Idle | BrowseStatus::Exhausted => DisplayState::NotStarted,
            };
        }
        DisplayState::Results {
            items: &self.items,
            loading_more: self.status == BrowseStatus::Loading,
            exhausted: self.status == BrowseStatus::Exhausted,
            more_failed: self.error.as_ref(),
        }
    }

    fn reset(&mut self) -> FetchRequest {
        self.generation = self.generation.wrapping_add(1);
        self.items.clear();
        self.seen.clear();
        self.current_page = 1;
        self.has_next_page = false;
        self.total_count = 0;
        self.error = None;
        self.in_flight = None;
        self.started = true;
        debug!(generation = self.generation, "browse session reset");
        self.issue(1)
    }

    fn issue(&mut self, page: u32) -> FetchRequest {
        self.sequence = self.sequence.wrapping_add(1);
        let ticket = RequestTicket {
            generation: self.generation,
            sequence: self.sequence,
            page,
        };
        self.target_page = page;
        self.in_flight = Some(ticket);
        self.status = BrowseStatus::Loading;
        FetchRequest {
            ticket,
            criteria: self.criteria.clone(),
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{CriteriaPatch, FilterModel, SortOrder};
    use crate::error::FetchErrorKind;
    use gamefinder_test_support::fixtures::games_envelope;

    fn page(ids: std::ops::RangeInclusive<u64>, index: u32, more: bool) -> ResultPage {
        ResultPage::from_wire(games_envelope(ids, index, more, 100), index)
    }

    fn ids(engine: &PaginationEngine) -> Vec<u64> {
        engine.items().iter().map(|item| item.id).collect()
    }

    fn started(criteria: FilterCriteria) -> (PaginationEngine, FetchRequest) {
        let mut engine = PaginationEngine::new(criteria);
        let request = engine.reload();
        (engine, request)
    }

    #[test]
    fn initial_state_is_idle_and_empty() {
        let engine = PaginationEngine::new(FilterCriteria::default());
        assert_eq!(engine.status(), BrowseStatus::Idle);
        assert!(engine.items().is_empty());
        assert!(!engine.is_started());
        assert_eq!(engine.display_state(), DisplayState::NotStarted);
    }

    #[test]
    fn two_page_scenario_reaches_exhausted() {
        let (mut engine, first) = started(FilterCriteria::default());
        assert_eq!(first.page, 1);
        assert_eq!(first.criteria.ordering, SortOrder::AddedDesc);
        assert_eq!(engine.status(), BrowseStatus::Loading);
        assert_eq!(engine.display_state(), DisplayState::InitialLoading);

        assert_eq!(
            engine.complete(first.ticket, Ok(page(1..=20, 1, true))),
            Completion::Applied
        );
        assert_eq!(engine.status(), BrowseStatus::Idle);
        assert_eq!(engine.items().len(), 20);
        assert!(engine.has_next_page());
        assert_eq!(engine.current_page(), 1);

        let second = engine.load_more().expect("load more allowed");
        assert_eq!(second.page, 2);
        assert!(engine.load_more().is_none(), "no overlapping load more");
        assert_eq!(
            engine.complete(second.ticket, Ok(page(21..=40, 2, false))),
            Completion::Applied
        );
        assert_eq!(engine.status(), BrowseStatus::Exhausted);
        assert_eq!(engine.items().len(), 40);
        assert_eq!(ids(&engine), (1..=40).collect::<Vec<_>>());
        assert!(engine.load_more().is_none());
    }

    #[test]
    fn accumulation_sums_page_sizes_in_order() {
        let (mut engine, first) = started(FilterCriteria::default());
        engine.complete(first.ticket, Ok(page(1..=3, 1, true)));
        let sizes = [(4..=10, 2), (11..=11, 3), (12..=30, 4)];
        for (range, index) in sizes {
            let request = engine.load_more().expect("idle with more pages");
            assert_eq!(request.page, index);
            engine.complete(request.ticket, Ok(page(range, index, true)));
        }
        assert_eq!(engine.items().len(), 3 + 7 + 1 + 19);
        assert_eq!(ids(&engine), (1..=30).collect::<Vec<_>>());
        assert_eq!(engine.current_page(), 4);
    }

    #[test]
    fn criteria_change_resets_accumulation() {
        let mut model = FilterModel::new();
        let (mut engine, first) = started(model.current().clone());
        engine.complete(first.ticket, Ok(page(1..=20, 1, true)));
        let second = engine.load_more().expect("more");
        engine.complete(second.ticket, Ok(page(21..=40, 2, true)));
        assert_eq!(engine.items().len(), 40);

        let narrowed = model.update(CriteriaPatch {
            rating_min: Some(3.0),
            ..CriteriaPatch::default()
        });
        let request = engine.set_criteria(narrowed).expect("criteria changed");
        assert_eq!(request.page, 1);
        assert!(engine.items().is_empty());
        assert_eq!(engine.current_page(), 1);

        engine.complete(request.ticket, Ok(page(500..=509, 1, true)));
        assert_eq!(ids(&engine), (500..=509).collect::<Vec<_>>());
        assert_eq!(engine.current_page(), 1);
    }

    #[test]
    fn equal_criteria_do_not_reset() {
        let criteria = FilterCriteria::ordered_by(SortOrder::NameAsc);
        let (mut engine, first) = started(criteria.clone());
        engine.complete(first.ticket, Ok(page(1..=5, 1, true)));
        assert!(engine.set_criteria(criteria).is_none());
        assert_eq!(engine.items().len(), 5);
    }

    #[test]
    fn exhausted_session_still_resets_on_new_criteria() {
        let (mut engine, first) = started(FilterCriteria::default());
        engine.complete(first.ticket, Ok(page(1..=2, 1, false)));
        assert_eq!(engine.status(), BrowseStatus::Exhausted);
        let request = engine
            .set_criteria(FilterCriteria::ordered_by(SortOrder::RatingDesc))
            .expect("reset from exhausted");
        assert_eq!(engine.status(), BrowseStatus::Loading);
        assert_eq!(request.criteria.ordering, SortOrder::RatingDesc);
    }

    #[test]
    fn stale_response_is_discarded() {
        let (mut engine, for_a) = started(FilterCriteria::default());
        let for_b = engine
            .set_criteria(FilterCriteria::ordered_by(SortOrder::NameDesc))
            .expect("criteria B");

        assert_eq!(
            engine.complete(for_b.ticket, Ok(page(100..=104, 1, false))),
            Completion::Applied
        );
        assert_eq!(
            engine.complete(for_a.ticket, Ok(page(1..=20, 1, true))),
            Completion::Stale
        );
        assert_eq!(ids(&engine), (100..=104).collect::<Vec<_>>());
        assert_eq!(engine.status(), BrowseStatus::Exhausted);
        assert_eq!(engine.criteria().ordering, SortOrder::NameDesc);
    }

    #[test]
    fn stale_failure_does_not_touch_newer_session() {
        let (mut engine, for_a) = started(FilterCriteria::default());
        let _for_b = engine
            .set_criteria(FilterCriteria::ordered_by(SortOrder::NameDesc))
            .expect("criteria B");
        let outcome = engine.complete(for_a.ticket, Err(FetchError::network("reset")));
        assert_eq!(outcome, Completion::Stale);
        assert_eq!(engine.status(), BrowseStatus::Loading);
        assert!(engine.error().is_none());
    }

    #[test]
    fn load_more_failure_keeps_items_and_retry_reissues_same_page() {
        let (mut engine, first) = started(FilterCriteria::default());
        engine.complete(first.ticket, Ok(page(1..=20, 1, true)));
        let second = engine.load_more().expect("more");
        assert_eq!(
            engine.complete(second.ticket, Err(FetchError::from_status(503, "down"))),
            Completion::Failed
        );
        assert_eq!(engine.status(), BrowseStatus::Error);
        assert_eq!(engine.items().len(), 20);
        assert!(engine.load_more().is_none());
        match engine.display_state() {
            DisplayState::Results { more_failed, .. } => {
                assert_eq!(more_failed.map(|err| err.kind), Some(FetchErrorKind::Server));
            }
            other => panic!("unexpected display state {other:?}"),
        }

        let retry = engine.retry().expect("retry from error");
        assert_eq!(retry.page, 2);
        assert_eq!(retry.criteria, *engine.criteria());
        assert!(engine.retry().is_none(), "retry while loading is ignored");
        engine.complete(retry.ticket, Ok(page(21..=40, 2, true)));
        assert_eq!(engine.items().len(), 40);
        assert_eq!(engine.status(), BrowseStatus::Idle);
        assert!(engine.error().is_none());
    }

    #[test]
    fn initial_failure_is_distinct_from_no_matches() {
        let (mut engine, first) = started(FilterCriteria::default());
        engine.complete(first.ticket, Err(FetchError::network("timeout")));
        assert!(matches!(engine.display_state(), DisplayState::LoadFailed(_)));

        let retry = engine.retry().expect("retry");
        assert_eq!(retry.page, 1);
        engine.complete(retry.ticket, Ok(page(1..=0, 1, false)));
        assert_eq!(engine.display_state(), DisplayState::NoMatches);
        assert_eq!(engine.status(), BrowseStatus::Exhausted);
    }

    #[test]
    fn out_of_order_page_is_rejected() {
        let (mut engine, first) = started(FilterCriteria::default());
        engine.complete(first.ticket, Ok(page(1..=20, 1, true)));
        let second = engine.load_more().expect("more");
        let outcome = engine.complete(second.ticket, Ok(page(41..=60, 3, true)));
        assert_eq!(outcome, Completion::Rejected);
        assert_eq!(engine.items().len(), 20);
        assert_eq!(engine.current_page(), 1);
        assert_eq!(engine.error().map(|err| err.kind), Some(FetchErrorKind::Parse));
        assert_eq!(engine.retry().map(|request| request.page), Some(2));
    }

    #[test]
    fn repeated_ids_across_pages_are_skipped() {
        let (mut engine, first) = started(FilterCriteria::default());
        engine.complete(first.ticket, Ok(page(1..=20, 1, true)));
        let second = engine.load_more().expect("more");
        engine.complete(second.ticket, Ok(page(20..=39, 2, false)));
        assert_eq!(engine.items().len(), 39);
        assert_eq!(ids(&engine), (1..=39).collect::<Vec<_>>());
    }

    #[test]
    fn duplicate_completion_is_stale() {
        let (mut engine, first) = started(FilterCriteria::default());
        engine.complete(first.ticket, Ok(page(1..=5, 1, true)));
        assert_eq!(
            engine.complete(first.ticket, Ok(page(1..=5, 1, true))),
            Completion::Stale
        );
        assert_eq!(engine.items().len(), 5);
    }
}
