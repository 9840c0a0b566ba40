use async_trait::async_trait;
use propshare_core::errors::GatewayResult;
use propshare_core::notifications::{Notification, NotificationGateway};
use serde_json::json;

use crate::gateway::SupabaseGateway;
use crate::query::Query;

const NOTIFICATIONS: &str = "notifications";

#[async_trait]
impl NotificationGateway for SupabaseGateway {
    async fn get_notifications(&self) -> GatewayResult<Vec<Notification>> {
        let user_id = self.require_user_id()?;
        let query = Query::new()
            .select("*")
            .eq("user_id", &user_id)
            .order("created_at", false);
        self.client.select(NOTIFICATIONS, &query).await
    }

    async fn mark_notification_read(&self, notification_id: &str) -> GatewayResult<()> {
        let query = Query::new().eq("id", notification_id);
        self.client
            .update(NOTIFICATIONS, &query, &json!({ "is_read": true }))
            .await
    }

    async fn mark_all_notifications_read(&self) -> GatewayResult<()> {
        let user_id = self.require_user_id()?;
        let query = Query::new()
            .eq("user_id", &user_id)
            .eq("is_read", false);
        self.client
            .update(NOTIFICATIONS, &query, &json!({ "is_read": true }))
            .await
    }

    async fn unread_count(&self) -> GatewayResult<u64> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(0);
        };
        let query = Query::new()
            .select("*")
            .eq("user_id", &user_id)
            .eq("is_read", false);
        self.client.count(NOTIFICATIONS, &query).await
    }

    async fn delete_notification(&self, notification_id: &str) -> GatewayResult<()> {
        let query = Query::new().eq("id", notification_id);
        self.client.delete(NOTIFICATIONS, &query).await
    }
}
