use async_trait::async_trait;

use super::notifications_model::Notification;
use crate::errors::GatewayResult;

/// Notification inbox on the remote backend.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// Notifications for the signed-in user, newest first.
    async fn get_notifications(&self) -> GatewayResult<Vec<Notification>>;

    async fn mark_notification_read(&self, notification_id: &str) -> GatewayResult<()>;

    async fn mark_all_notifications_read(&self) -> GatewayResult<()>;

    /// Number of unread notifications; 0 when signed out.
    async fn unread_count(&self) -> GatewayResult<u64>;

    async fn delete_notification(&self, notification_id: &str) -> GatewayResult<()>;
}
