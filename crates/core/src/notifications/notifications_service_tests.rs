//! Tests for the notification inbox service.

#[cfg(test)]
mod tests {
    use crate::backend::InMemoryBackend;
    use crate::cache::{EntryState, QueryKey, ReadModelCache};
    use crate::errors::GatewayError;
    use crate::notifications::{NotificationService, NotificationServiceTrait};
    use crate::session::SessionContext;
    use std::sync::Arc;

    struct Inbox {
        backend: Arc<InMemoryBackend>,
        cache: Arc<ReadModelCache>,
        service: NotificationService,
        user_id: String,
    }

    async fn inbox(signed_in: bool) -> Inbox {
        let session = Arc::new(SessionContext::new());
        let backend = Arc::new(InMemoryBackend::new(session.clone()));
        let user_id = backend.add_account("ana@example.com", "secret-pw", "Ana Investor");
        if signed_in {
            session
                .sign_in(backend.as_ref(), "ana@example.com", "secret-pw")
                .await
                .unwrap();
        }
        let cache = Arc::new(ReadModelCache::default());
        let service = NotificationService::new(backend.clone(), cache.clone(), session);
        Inbox {
            backend,
            cache,
            service,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_unread_count_is_zero_when_signed_out() {
        let inbox = inbox(false).await;
        inbox
            .backend
            .push_notification(&inbox.user_id, "Welcome", "Hello there");

        assert_eq!(inbox.service.unread_count().await.unwrap(), 0);
        assert_eq!(inbox.backend.calls("unread_count"), 0);
    }

    #[tokio::test]
    async fn test_unread_count_treats_expired_auth_as_zero() {
        let inbox = inbox(true).await;
        inbox
            .backend
            .fail_next("unread_count", GatewayError::NotAuthenticated);

        assert_eq!(inbox.service.unread_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mark_read_updates_count_after_invalidation() {
        let inbox = inbox(true).await;
        let first = inbox
            .backend
            .push_notification(&inbox.user_id, "Dividend paid", "$12.40 credited");
        inbox
            .backend
            .push_notification(&inbox.user_id, "New listing", "King Street Plaza");

        assert_eq!(inbox.service.unread_count().await.unwrap(), 2);
        assert_eq!(inbox.service.notifications().await.unwrap().len(), 2);

        inbox.service.mark_read(&first).await.unwrap();

        assert_eq!(inbox.cache.state(&QueryKey::Notifications), EntryState::Stale);
        assert_eq!(
            inbox.cache.state(&QueryKey::UnreadNotifications),
            EntryState::Stale
        );
        assert_eq!(inbox.service.unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mark_all_read_and_delete() {
        let inbox = inbox(true).await;
        let id = inbox
            .backend
            .push_notification(&inbox.user_id, "Welcome", "Hello there");
        inbox
            .backend
            .push_notification(&inbox.user_id, "Reminder", "Complete your profile");

        inbox.service.mark_all_read().await.unwrap();
        assert_eq!(inbox.service.unread_count().await.unwrap(), 0);

        inbox.service.delete(&id).await.unwrap();
        let remaining = inbox.service.notifications().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining.iter().all(|n| n.is_read));
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let inbox = inbox(true).await;
        inbox
            .backend
            .push_notification(&inbox.user_id, "Welcome", "Hello there");
        inbox.service.notifications().await.unwrap();
        inbox.backend.fail_next(
            "mark_all_notifications_read",
            GatewayError::Transport("timeout".to_string()),
        );

        assert!(inbox.service.mark_all_read().await.is_err());
        assert_eq!(inbox.cache.state(&QueryKey::Notifications), EntryState::Fresh);
    }
}
