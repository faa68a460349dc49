//! Canonical filter/sort state for a browse session.
//!
//! # Design
//! - `FilterCriteria` is a plain value; equality decides whether results reset.
//! - Malformed input is corrected on the way in and never reported as an error.
//! - `FilterModel` owns the current value and applies partial updates.

use std::collections::BTreeSet;
use std::fmt;

/// Lowest accepted rating.
pub const RATING_FLOOR: f64 = 0.0;
/// Highest accepted rating.
pub const RATING_CEILING: f64 = 5.0;

/// Result ordering understood by the catalog service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SortOrder {
    /// Most recently added first.
    #[default]
    AddedDesc,
    /// Name A-Z.
    NameAsc,
    /// Name Z-A.
    NameDesc,
    /// Newest release first.
    ReleasedDesc,
    /// Oldest release first.
    ReleasedAsc,
    /// Highest user rating first.
    RatingDesc,
    /// Lowest user rating first.
    RatingAsc,
    /// Highest critic score first.
    MetacriticDesc,
    /// Lowest critic score first.
    MetacriticAsc,
}

impl SortOrder {
    /// Every ordering in menu order.
    pub const ALL: [Self; 9] = [
        Self::AddedDesc,
        Self::NameAsc,
        Self::NameDesc,
        Self::ReleasedDesc,
        Self::ReleasedAsc,
        Self::RatingDesc,
        Self::RatingAsc,
        Self::MetacriticDesc,
        Self::MetacriticAsc,
    ];

    /// Value of the `ordering` parameter.
    #[must_use]
    pub const fn as_param(self) -> &'static str {
        match self {
            Self::AddedDesc => "-added",
            Self::NameAsc => "name",
            Self::NameDesc => "-name",
            Self::ReleasedDesc => "-released",
            Self::ReleasedAsc => "released",
            Self::RatingDesc => "-rating",
            Self::RatingAsc => "rating",
            Self::MetacriticDesc => "-metacritic",
            Self::MetacriticAsc => "metacritic",
        }
    }

    /// Human-readable label for menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AddedDesc => "Newest",
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::ReleasedDesc => "Release Date (Newest)",
            Self::ReleasedAsc => "Release Date (Oldest)",
            Self::RatingDesc => "Rating (High to Low)",
            Self::RatingAsc => "Rating (Low to High)",
            Self::MetacriticDesc => "Metacritic (High to Low)",
            Self::MetacriticAsc => "Metacritic (Low to High)",
        }
    }

    /// Parse an `ordering` parameter value.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|order| order.as_param() == raw)
    }

    /// Parse an `ordering` value, falling back to the default for unknown input.
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_default()
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// Inclusive user-rating window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RatingRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl Default for RatingRange {
    fn default() -> Self {
        Self {
            min: RATING_FLOOR,
            max: RATING_CEILING,
        }
    }
}

impl RatingRange {
    /// Build a normalised range from raw bounds.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }.normalized()
    }

    /// Clamp both bounds to the accepted scale and order them.
    ///
    /// NaN bounds fall back to the default for that side.
    #[must_use]
    pub fn normalized(self) -> Self {
        let min = clamp_rating(self.min, RATING_FLOOR);
        let max = clamp_rating(self.max, RATING_CEILING);
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Whether the lower bound differs from the default.
    #[must_use]
    pub fn has_min(&self) -> bool {
        self.min > RATING_FLOOR
    }

    /// Whether the upper bound differs from the default.
    #[must_use]
    pub fn has_max(&self) -> bool {
        self.max < RATING_CEILING
    }

    /// Whether the range filters anything.
    #[must_use]
    pub fn is_default(&self) -> bool {
        !self.has_min() && !self.has_max()
    }
}

fn clamp_rating(value: f64, fallback: f64) -> f64 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(RATING_FLOOR, RATING_CEILING)
    }
}

/// Combined search/sort/filter specification for one browse session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterCriteria {
    /// Free-text query; empty means no text filter.
    pub search: String,
    /// Active ordering.
    pub ordering: SortOrder,
    /// Selected platform ids; empty means every platform.
    pub platforms: BTreeSet<u64>,
    /// Selected genre ids; empty means every genre.
    pub genres: BTreeSet<u64>,
    /// User-rating window.
    pub rating: RatingRange,
}

impl FilterCriteria {
    /// Apply the same normalisation `FilterModel` applies.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let trimmed = self.search.trim();
        if trimmed.len() != self.search.len() {
            self.search = trimmed.to_string();
        }
        self.rating = self.rating.normalized();
        self
    }

    /// Criteria with a given ordering and everything else default.
    #[must_use]
    pub fn ordered_by(ordering: SortOrder) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    /// Number of filter groups narrowing the results.
    ///
    /// Search, platforms, genres and a non-default rating range each count once.
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        [
            !self.search.is_empty(),
            !self.platforms.is_empty(),
            !self.genres.is_empty(),
            !self.rating.is_default(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

/// Partial update for [`FilterModel::update`]. `None` keeps the prior value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CriteriaPatch {
    /// Replacement search text.
    pub search: Option<String>,
    /// Replacement ordering.
    pub ordering: Option<SortOrder>,
    /// Replacement platform selection.
    pub platforms: Option<BTreeSet<u64>>,
    /// Replacement genre selection.
    pub genres: Option<BTreeSet<u64>>,
    /// Replacement lower rating bound.
    pub rating_min: Option<f64>,
    /// Replacement upper rating bound.
    pub rating_max: Option<f64>,
}

impl CriteriaPatch {
    /// Patch that only changes the search text.
    #[must_use]
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch that only changes the ordering.
    #[must_use]
    pub fn ordering(order: SortOrder) -> Self {
        Self {
            ordering: Some(order),
            ..Self::default()
        }
    }

    /// Patch that changes the ordering from a raw parameter value.
    #[must_use]
    pub fn ordering_param(raw: &str) -> Self {
        Self::ordering(SortOrder::parse_or_default(raw))
    }

    /// Patch that changes the rating window.
    #[must_use]
    pub fn rating(min: f64, max: f64) -> Self {
        Self {
            rating_min: Some(min),
            rating_max: Some(max),
            ..Self::default()
        }
    }

    /// Patch that replaces the platform selection from a comma-separated list.
    #[must_use]
    pub fn platform_list(raw: &str) -> Self {
        Self {
            platforms: Some(parse_id_list(raw)),
            ..Self::default()
        }
    }

    /// Patch that replaces the genre selection from a comma-separated list.
    #[must_use]
    pub fn genre_list(raw: &str) -> Self {
        Self {
            genres: Some(parse_id_list(raw)),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Owner of the current criteria.
#[derive(Clone, Debug, Default)]
pub struct FilterModel {
    current: FilterCriteria,
}

impl FilterModel {
    /// Model starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Model starting from `criteria` after normalisation.
    #[must_use]
    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            current: criteria.normalized(),
        }
    }

    /// Current criteria.
    #[must_use]
    pub const fn current(&self) -> &FilterCriteria {
        &self.current
    }

    /// Merge `patch` into the current criteria and return the result.
    pub fn update(&mut self, patch: CriteriaPatch) -> FilterCriteria {
        let mut next = self.current.clone();
        if let Some(search) = patch.search {
            next.search = search;
        }
        if let Some(ordering) = patch.ordering {
            next.ordering = ordering;
        }
        if let Some(platforms) = patch.platforms {
            next.platforms = platforms;
        }
        if let Some(genres) = patch.genres {
            next.genres = genres;
        }
        if let Some(min) = patch.rating_min {
            next.rating.min = min;
        }
        if let Some(max) = patch.rating_max {
            next.rating.max = max;
        }
        self.current = next.normalized();
        self.current.clone()
    }

    /// Add or remove a genre from the selection.
    pub fn toggle_genre(&mut self, id: u64) -> FilterCriteria {
        if !self.current.genres.remove(&id) {
            self.current.genres.insert(id);
        }
        self.current.clone()
    }

    /// Add or remove a platform from the selection.
    pub fn toggle_platform(&mut self, id: u64) -> FilterCriteria {
        if !self.current.platforms.remove(&id) {
            self.current.platforms.insert(id);
        }
        self.current.clone()
    }

    /// Restore every field to its default.
    pub fn reset(&mut self) -> FilterCriteria {
        self.current = FilterCriteria::default();
        self.current.clone()
    }

    /// See [`FilterCriteria::active_filter_count`].
    #[must_use]
    pub fn active_filter_count(&self) -> usize {
        self.current.active_filter_count()
    }
}

/// Parse a comma-separated id list, dropping anything that is not an id.
#[must_use]
pub fn parse_id_list(raw: &str) -> BTreeSet<u64> {
    raw.split(',')
        .map(str::trim)
        .filter_map(|part| part.parse::<u64>().ok())
        .collect()
}

/// Render ids as a comma-separated list in ascending order.
#[must_use]
pub fn join_id_list(ids: &BTreeSet<u64>) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
