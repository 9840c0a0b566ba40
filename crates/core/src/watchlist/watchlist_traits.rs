use async_trait::async_trait;

use super::watchlist_model::WatchlistItem;
use crate::errors::GatewayResult;

/// Watchlist storage on the remote backend.
#[async_trait]
pub trait WatchlistGateway: Send + Sync {
    async fn get_watchlist(&self) -> GatewayResult<Vec<WatchlistItem>>;

    async fn add_to_watchlist(&self, property_id: &str) -> GatewayResult<()>;

    async fn remove_from_watchlist(&self, property_id: &str) -> GatewayResult<()>;

    /// False when signed out.
    async fn is_in_watchlist(&self, property_id: &str) -> GatewayResult<bool>;
}
