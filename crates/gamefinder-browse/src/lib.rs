#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Browse core for the game catalog: filter state, URL codec, debounced
//! input, paginated accumulation and the wishlist.
//!
//! Layout: `criteria.rs` (filter/sort state model), `query.rs` (parameter
//! codec), `debounce.rs` (trailing-edge input controller), `source.rs` (fetch
//! contract and view models), `engine.rs` (pagination state machine),
//! `session.rs` (async driver), `storage.rs` + `wishlist.rs` (saved games).

pub mod criteria;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod query;
pub mod session;
pub mod source;
pub mod storage;
pub mod wishlist;

pub use criteria::{CriteriaPatch, FilterCriteria, FilterModel, RatingRange, SortOrder};
pub use debounce::Debouncer;
pub use engine::{
    BrowseStatus, Completion, DisplayState, FetchRequest, PaginationEngine, RequestTicket,
};
pub use error::{FetchError, FetchErrorKind, StorageError, WishlistError};
pub use query::{Location, QueryParams};
pub use session::{BrowseSession, FetchOutcome, PendingFetch};
pub use source::{CatalogSource, GameSummary, GenreTag, ResultPage};
pub use storage::{FileStorage, MemoryStorage, WISHLIST_STORAGE_KEY, WishlistStorage};
pub use wishlist::{ToggleOutcome, WishlistEntry, WishlistStore};
