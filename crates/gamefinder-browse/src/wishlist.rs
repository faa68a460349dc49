//! Locally persisted wishlist with set semantics keyed by game id.
//!
//! # Design
//! - Constructed once and injected where needed; no ambient global.
//! - Every mutation writes the whole collection before it is committed in memory,
//!   so memory and storage never disagree after a failed write.
//! - A corrupted payload is discarded on open and overwritten by the next mutation.
//! - Subscribers are notified through the event bus.

use std::collections::HashSet;

use gamefinder_catalog_models::GameDetail;
use gamefinder_events::{Event, EventBus, EventStream};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::WishlistError;
use crate::source::GameSummary;
use crate::storage::WishlistStorage;

/// Saved game with the fields needed to render it offline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    /// Catalog identifier.
    pub id: u64,
    /// Display name.
    pub name: String,
    /// Cover image URL.
    #[serde(default, alias = "background_image", skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// Release date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<String>,
    /// User rating (0-5).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    /// Critic score (0-100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metacritic: Option<u32>,
}

impl From<&GameSummary> for WishlistEntry {
    fn from(value: &GameSummary) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            cover_image_url: value.cover_image_url.clone(),
            released: value.release_date.clone(),
            rating: value.user_rating,
            metacritic: value.critic_score,
        }
    }
}

impl From<&GameDetail> for WishlistEntry {
    fn from(value: &GameDetail) -> Self {
        Self {
            id: value.id,
            name: value.name.clone(),
            cover_image_url: value.background_image.clone(),
            released: value.released.clone(),
            rating: value.rating,
            metacritic: value.metacritic,
        }
    }
}

/// Which effect a toggle had.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The entry was added.
    Added,
    /// The entry was removed.
    Removed,
}

/// Wishlist backed by a [`WishlistStorage`].
pub struct WishlistStore<S> {
    storage: S,
    entries: Vec<WishlistEntry>,
    events: EventBus,
}

impl<S: WishlistStorage> WishlistStore<S> {
    /// Load the wishlist from `storage`. Never fails: unreadable or corrupted
    /// payloads yield an empty wishlist.
    #[must_use]
    pub fn open(storage: S) -> Self {
        Self::open_with_events(storage, EventBus::new())
    }

    /// Like [`WishlistStore::open`], publishing changes on a shared bus.
    #[must_use]
    pub fn open_with_events(storage: S, events: EventBus) -> Self {
        let entries = match storage.load() {
            Ok(Some(payload)) => decode_payload(&payload),
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "wishlist storage unreadable; starting empty");
                Vec::new()
            }
        };
        debug!(entries = entries.len(), "wishlist loaded");
        Self {
            storage,
            entries,
            events,
        }
    }

    /// Whether `id` is saved.
    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Saved entry for `id`.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&WishlistEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Entries in the order they were added.
    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    /// Number of saved entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is saved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stream of wishlist notifications.
    #[must_use]
    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe(None)
    }

    /// Save `entry`. Returns `false` without writing when the id is already present.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError`] when the collection cannot be persisted; the
    /// wishlist is unchanged in that case.
    pub fn add(&mut self, entry: WishlistEntry) -> Result<bool, WishlistError> {
        if self.contains(entry.id) {
            return Ok(false);
        }
        let mut candidate = self.entries.clone();
        candidate.push(entry.clone());
        self.commit(candidate)?;
        self.events.publish(Event::WishlistAdded {
            game_id: entry.id,
            name: entry.name,
            size: self.entries.len(),
        });
        Ok(true)
    }

    /// Remove `id`. Returns `false` without writing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError`] when the collection cannot be persisted; the
    /// wishlist is unchanged in that case.
    pub fn remove(&mut self, id: u64) -> Result<bool, WishlistError> {
        if !self.contains(id) {
            return Ok(false);
        }
        let candidate = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.commit(candidate)?;
        self.events.publish(Event::WishlistRemoved {
            game_id: id,
            size: self.entries.len(),
        });
        Ok(true)
    }

    /// Remove `entry` when saved, add it otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`WishlistError`] when the collection cannot be persisted.
    pub fn toggle(&mut self, entry: WishlistEntry) -> Result<ToggleOutcome, WishlistError> {
        if self.contains(entry.id) {
            self.remove(entry.id)?;
            Ok(ToggleOutcome::Removed)
        } else {
            self.add(entry)?;
            Ok(ToggleOutcome::Added)
        }
    }

    fn commit(&mut self, candidate: Vec<WishlistEntry>) -> Result<(), WishlistError> {
        let payload =
            serde_json::to_string(&candidate).map_err(|source| WishlistError::Encode { source })?;
        if let Err(source) = self.storage.save(&payload) {
            warn!(error = %source, "wishlist write failed");
            return Err(WishlistError::Persist { source });
        }
        self.entries = candidate;
        Ok(())
    }
}

fn decode_payload(payload: &str) -> Vec<WishlistEntry> {
    match serde_json::from_str::<Vec<WishlistEntry>>(payload) {
        Ok(entries) => {
            let mut seen = HashSet::new();
            entries
                .into_iter()
                .filter(|entry| seen.insert(entry.id))
                .collect()
        }
        Err(err) => {
            warn!(error = %err, "discarding corrupted wishlist payload");
            Vec::new()
        }
    }
}
