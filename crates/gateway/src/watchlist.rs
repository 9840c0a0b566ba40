use async_trait::async_trait;
use propshare_core::errors::GatewayResult;
use propshare_core::watchlist::{WatchlistGateway, WatchlistItem};
use serde::{Deserialize, Serialize};

use crate::gateway::SupabaseGateway;
use crate::query::Query;

const WATCHLIST: &str = "watchlist";

#[derive(Debug, Serialize)]
struct NewWatchlistItem<'a> {
    user_id: &'a str,
    property_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    #[allow(dead_code)]
    id: String,
}

#[async_trait]
impl WatchlistGateway for SupabaseGateway {
    async fn get_watchlist(&self) -> GatewayResult<Vec<WatchlistItem>> {
        let user_id = self.require_user_id()?;
        let query = Query::new()
            .select("*,property:properties(*)")
            .eq("user_id", &user_id)
            .order("created_at", false);
        self.client.select(WATCHLIST, &query).await
    }

    async fn add_to_watchlist(&self, property_id: &str) -> GatewayResult<()> {
        let user_id = self.require_user_id()?;
        self.client
            .insert(
                WATCHLIST,
                &NewWatchlistItem {
                    user_id: &user_id,
                    property_id,
                },
            )
            .await
    }

    async fn remove_from_watchlist(&self, property_id: &str) -> GatewayResult<()> {
        let user_id = self.require_user_id()?;
        let query = Query::new()
            .eq("user_id", &user_id)
            .eq("property_id", property_id);
        self.client.delete(WATCHLIST, &query).await
    }

    async fn is_in_watchlist(&self, property_id: &str) -> GatewayResult<bool> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(false);
        };
        let query = Query::new()
            .select("id")
            .eq("user_id", &user_id)
            .eq("property_id", property_id);
        let row: Option<IdRow> = self.client.select_single(WATCHLIST, &query).await?;
        Ok(row.is_some())
    }
}
