//! Command handlers grouped by concern.

pub(crate) mod browse;
pub(crate) mod game;
pub(crate) mod live;
pub(crate) mod wishlist;
