use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::notifications_model::Notification;
use super::notifications_traits::NotificationGateway;
use crate::cache::{unexpected_value, QueryKey, QueryValue, ReadModelCache};
use crate::errors::{Error, GatewayError, Result};
use crate::session::SessionContext;

#[async_trait]
pub trait NotificationServiceTrait: Send + Sync {
    async fn notifications(&self) -> Result<Vec<Notification>>;

    /// Unread badge count. Signed-out users always see 0.
    async fn unread_count(&self) -> Result<u64>;

    async fn mark_read(&self, notification_id: &str) -> Result<()>;

    async fn mark_all_read(&self) -> Result<()>;

    async fn delete(&self, notification_id: &str) -> Result<()>;
}

pub struct NotificationService {
    gateway: Arc<dyn NotificationGateway>,
    cache: Arc<ReadModelCache>,
    session: Arc<SessionContext>,
}

impl NotificationService {
    pub fn new(
        gateway: Arc<dyn NotificationGateway>,
        cache: Arc<ReadModelCache>,
        session: Arc<SessionContext>,
    ) -> Self {
        Self {
            gateway,
            cache,
            session,
        }
    }

    fn invalidate(&self) {
        self.cache
            .invalidate_many(&QueryKey::affected_by_notifications());
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn notifications(&self) -> Result<Vec<Notification>> {
        let key = QueryKey::Notifications;
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move {
                    gateway
                        .get_notifications()
                        .await
                        .map(QueryValue::Notifications)
                }
            })
            .await?;
        match value {
            QueryValue::Notifications(notifications) => Ok(notifications),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn unread_count(&self) -> Result<u64> {
        if !self.session.is_authenticated() {
            return Ok(0);
        }
        let key = QueryKey::UnreadNotifications;
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move { gateway.unread_count().await.map(QueryValue::Count) }
            })
            .await;
        match value {
            Ok(QueryValue::Count(count)) => Ok(count),
            Ok(_) => Err(unexpected_value(&key)),
            Err(GatewayError::NotAuthenticated) => Ok(0),
            Err(err) => Err(Error::from(err)),
        }
    }

    async fn mark_read(&self, notification_id: &str) -> Result<()> {
        self.gateway.mark_notification_read(notification_id).await?;
        self.invalidate();
        debug!("[Notifications] Marked {} as read", notification_id);
        Ok(())
    }

    async fn mark_all_read(&self) -> Result<()> {
        self.gateway.mark_all_notifications_read().await?;
        self.invalidate();
        debug!("[Notifications] Marked all as read");
        Ok(())
    }

    async fn delete(&self, notification_id: &str) -> Result<()> {
        self.gateway.delete_notification(notification_id).await?;
        self.invalidate();
        debug!("[Notifications] Deleted {}", notification_id);
        Ok(())
    }
}
