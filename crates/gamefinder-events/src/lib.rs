//! Notification bus for the gamefinder workspace.
//!
//! Wishlist mutations and browse-session transitions are published here so
//! dependent views can re-render without polling the stores that own the
//! state. Delivery goes through `tokio::broadcast`; a bounded replay ring lets a
//! subscriber that remembers the last id it saw pick up where it left off.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Identifier assigned to each published event, starting at 1.
pub type EventId = u64;

const DEFAULT_REPLAY_CAPACITY: usize = 256;

/// Notifications raised by the wishlist store and browse sessions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A game was saved.
    WishlistAdded {
        /// Catalog id of the saved game.
        game_id: u64,
        /// Display name at the time it was saved.
        name: String,
        /// Wishlist size after the change.
        size: usize,
    },
    /// A game was removed from the wishlist.
    WishlistRemoved {
        /// Catalog id of the removed game.
        game_id: u64,
        /// Wishlist size after the change.
        size: usize,
    },
    /// A session discarded its results for new criteria.
    BrowseReset {
        /// Session label.
        session: String,
        /// Encoded criteria now in effect.
        query: String,
    },
    /// A page was appended to a session.
    PageLoaded {
        /// Session label.
        session: String,
        /// Page that was applied.
        page: u32,
        /// Items accumulated so far.
        items: usize,
        /// Whether the last page has been reached.
        exhausted: bool,
    },
    /// A page request failed and awaits a retry.
    FetchFailed {
        /// Session label.
        session: String,
        /// Page that failed.
        page: u32,
        /// Failure class (`network`, `auth`, ...).
        kind: String,
    },
}

impl Event {
    /// Snake-case discriminator, identical to the serialised `type` tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::WishlistAdded { .. } => "wishlist_added",
            Self::WishlistRemoved { .. } => "wishlist_removed",
            Self::BrowseReset { .. } => "browse_reset",
            Self::PageLoaded { .. } => "page_loaded",
            Self::FetchFailed { .. } => "fetch_failed",
        }
    }

    /// Whether the event changes wishlist membership.
    #[must_use]
    pub const fn is_wishlist(&self) -> bool {
        matches!(
            self,
            Self::WishlistAdded { .. } | Self::WishlistRemoved { .. }
        )
    }
}

/// Published event with its id and emission time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventEnvelope {
    /// Sequential identifier.
    pub id: EventId,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
    /// The notification itself.
    pub event: Event,
}

#[derive(Debug)]
struct ReplayRing {
    entries: VecDeque<EventEnvelope>,
    capacity: usize,
}

impl ReplayRing {
    fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, envelope: EventEnvelope) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(envelope);
    }

    fn newer_than(&self, since: EventId) -> VecDeque<EventEnvelope> {
        self.entries
            .iter()
            .filter(|envelope| envelope.id > since)
            .cloned()
            .collect()
    }

    fn last_id(&self) -> Option<EventId> {
        self.entries.back().map(|envelope| envelope.id)
    }
}

/// Cloneable handle to one bus; clones publish to the same subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
    ring: Arc<Mutex<ReplayRing>>,
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    /// Bus whose channel and replay ring both hold `capacity` events (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            ring: Arc::new(Mutex::new(ReplayRing::new(capacity))),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Bus with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_REPLAY_CAPACITY)
    }

    /// Publish `event` and return its id. Publishing with no subscriber is fine.
    pub fn publish(&self, event: Event) -> EventId {
        let envelope = EventEnvelope {
            id: self.sequence.fetch_add(1, Ordering::Relaxed) + 1,
            timestamp: Utc::now(),
            event,
        };
        let id = envelope.id;
        self.ring().push(envelope.clone());
        let _ = self.sender.send(envelope);
        id
    }

    /// Subscribe to future events, first replaying retained events newer than `since`.
    #[must_use]
    pub fn subscribe(&self, since: Option<EventId>) -> EventStream {
        let backlog = since.map_or_else(VecDeque::new, |since| self.ring().newer_than(since));
        EventStream {
            backlog,
            receiver: self.sender.subscribe(),
        }
    }

    /// Id of the most recent retained event.
    #[must_use]
    pub fn last_event_id(&self) -> Option<EventId> {
        self.ring().last_id()
    }

    fn ring(&self) -> MutexGuard<'_, ReplayRing> {
        self.ring.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of an [`EventBus`] subscription.
///
/// A subscriber that falls behind the channel capacity skips what it missed.
pub struct EventStream {
    backlog: VecDeque<EventEnvelope>,
    receiver: broadcast::Receiver<EventEnvelope>,
}

impl EventStream {
    /// Wait for the next event; `None` once every bus handle is dropped.
    pub async fn next(&mut self) -> Option<EventEnvelope> {
        if let Some(envelope) = self.backlog.pop_front() {
            return Some(envelope);
        }
        loop {
            match self.receiver.recv().await {
                Ok(envelope) => return Some(envelope),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Everything available right now, without waiting.
    pub fn drain_ready(&mut self) -> Vec<EventEnvelope> {
        let mut ready: Vec<EventEnvelope> = self.backlog.drain(..).collect();
        loop {
            match self.receiver.try_recv() {
                Ok(envelope) => ready.push(envelope),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return ready,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn added(id: u64) -> Event {
        Event::WishlistAdded {
            game_id: id,
            name: format!("Game {id}"),
            size: 1,
        }
    }

    #[tokio::test]
    async fn late_subscriber_replays_from_last_seen_id() {
        let bus = EventBus::with_capacity(16);
        let ids: Vec<EventId> = (10..15).map(|game| bus.publish(added(game))).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let mut stream = bus.subscribe(Some(2));
        let mut replayed = Vec::new();
        for _ in 0..3 {
            replayed.push(stream.next().await.expect("replayed event").id);
        }
        assert_eq!(replayed, vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn live_subscribers_see_new_events() {
        let bus = EventBus::new();
        let mut stream = bus.subscribe(None);
        bus.publish(Event::WishlistRemoved {
            game_id: 7,
            size: 0,
        });

        let envelope = timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("event delivered")
            .expect("stream open");
        assert_eq!(envelope.event.kind(), "wishlist_removed");
        assert!(envelope.event.is_wishlist());
    }

    #[test]
    fn replay_ring_keeps_only_the_newest() {
        let bus = EventBus::with_capacity(2);
        for game in 0..4 {
            bus.publish(added(game));
        }
        let mut stream = bus.subscribe(Some(0));
        let ids: Vec<EventId> = stream.drain_ready().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 4]);
        assert_eq!(bus.last_event_id(), Some(4));
    }

    #[test]
    fn tag_matches_kind() {
        let event = Event::PageLoaded {
            session: "browse".into(),
            page: 2,
            items: 40,
            exhausted: false,
        };
        let json = serde_json::to_value(&event).expect("serialise");
        assert_eq!(json["type"], event.kind());
        assert_eq!(json["page"], 2);
        assert!(!event.is_wishlist());
    }
}
