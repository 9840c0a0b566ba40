use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use super::watchlist_model::WatchlistItem;
use super::watchlist_traits::WatchlistGateway;
use crate::cache::{unexpected_value, QueryKey, QueryValue, ReadModelCache};
use crate::errors::Result;
use crate::utils::InFlightSet;

#[async_trait]
pub trait WatchlistServiceTrait: Send + Sync {
    /// Whether the property is on the user's watchlist.
    async fn is_watched(&self, property_id: &str) -> Result<bool>;

    async fn watchlist(&self) -> Result<Vec<WatchlistItem>>;

    /// Flips membership and returns the new state.
    ///
    /// A second toggle for the same property while one is outstanding fails
    /// with `Error::MutationInFlight`.
    async fn toggle(&self, property_id: &str) -> Result<bool>;

    fn is_toggling(&self, property_id: &str) -> bool;
}

pub struct WatchlistService {
    gateway: Arc<dyn WatchlistGateway>,
    cache: Arc<ReadModelCache>,
    in_flight: InFlightSet,
}

impl WatchlistService {
    pub fn new(gateway: Arc<dyn WatchlistGateway>, cache: Arc<ReadModelCache>) -> Self {
        Self {
            gateway,
            cache,
            in_flight: InFlightSet::new(),
        }
    }

    fn mutation_key(property_id: &str) -> String {
        format!("watchlist:{}", property_id)
    }
}

#[async_trait]
impl WatchlistServiceTrait for WatchlistService {
    async fn is_watched(&self, property_id: &str) -> Result<bool> {
        let key = QueryKey::WatchlistMembership(property_id.to_string());
        let gateway = self.gateway.clone();
        let property_id = property_id.to_string();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                let property_id = property_id.clone();
                async move {
                    gateway
                        .is_in_watchlist(&property_id)
                        .await
                        .map(QueryValue::WatchlistMembership)
                }
            })
            .await?;
        match value {
            QueryValue::WatchlistMembership(watched) => Ok(watched),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn watchlist(&self) -> Result<Vec<WatchlistItem>> {
        let key = QueryKey::Watchlist;
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move { gateway.get_watchlist().await.map(QueryValue::Watchlist) }
            })
            .await?;
        match value {
            QueryValue::Watchlist(items) => Ok(items),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn toggle(&self, property_id: &str) -> Result<bool> {
        let _guard = self.in_flight.try_acquire(Self::mutation_key(property_id))?;

        let watched = self.is_watched(property_id).await?;
        if watched {
            self.gateway.remove_from_watchlist(property_id).await?;
        } else {
            self.gateway.add_to_watchlist(property_id).await?;
        }

        self.cache
            .invalidate_many(&QueryKey::affected_by_watchlist(property_id));
        info!(
            "[Watchlist] {} {}",
            if watched { "Removed" } else { "Added" },
            property_id
        );
        Ok(!watched)
    }

    fn is_toggling(&self, property_id: &str) -> bool {
        self.in_flight.contains(&Self::mutation_key(property_id))
    }
}
