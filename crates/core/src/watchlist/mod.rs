//! Watchlist module - followed properties and the membership toggle.

mod watchlist_model;
mod watchlist_service;
mod watchlist_traits;

#[cfg(test)]
mod watchlist_service_tests;

pub use watchlist_model::WatchlistItem;
pub use watchlist_service::{WatchlistService, WatchlistServiceTrait};
pub use watchlist_traits::WatchlistGateway;
