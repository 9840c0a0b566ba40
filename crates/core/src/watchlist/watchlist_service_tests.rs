//! Tests for the watchlist membership toggle.

#[cfg(test)]
mod tests {
    use crate::backend::{fixtures, InMemoryBackend};
    use crate::cache::{EntryState, QueryKey, ReadModelCache};
    use crate::errors::{Error, GatewayError};
    use crate::session::SessionContext;
    use crate::watchlist::{WatchlistService, WatchlistServiceTrait};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::time::Duration;

    async fn service() -> (Arc<InMemoryBackend>, Arc<ReadModelCache>, WatchlistService) {
        let session = Arc::new(SessionContext::new());
        let backend = Arc::new(InMemoryBackend::new(session.clone()));
        backend.insert_property(fixtures::property("prop-1", "Harbour Lofts", dec!(100), 1000, 10));
        backend.add_account("ana@example.com", "secret-pw", "Ana Investor");
        session
            .sign_in(backend.as_ref(), "ana@example.com", "secret-pw")
            .await
            .unwrap();
        let cache = Arc::new(ReadModelCache::default());
        let service = WatchlistService::new(backend.clone(), cache.clone());
        (backend, cache, service)
    }

    #[tokio::test]
    async fn test_toggle_adds_then_removes() {
        let (backend, _cache, service) = service().await;

        assert!(!service.is_watched("prop-1").await.unwrap());
        assert!(service.toggle("prop-1").await.unwrap());
        assert!(service.is_watched("prop-1").await.unwrap());

        let items = service.watchlist().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(
            items[0].property.as_ref().map(|p| p.name.as_str()),
            Some("Harbour Lofts")
        );

        assert!(!service.toggle("prop-1").await.unwrap());
        assert!(!service.is_watched("prop-1").await.unwrap());
        assert_eq!(backend.calls("add_to_watchlist"), 1);
        assert_eq!(backend.calls("remove_from_watchlist"), 1);
    }

    #[tokio::test]
    async fn test_toggle_invalidates_membership_and_list() {
        let (_backend, cache, service) = service().await;
        service.is_watched("prop-1").await.unwrap();
        service.watchlist().await.unwrap();

        service.toggle("prop-1").await.unwrap();

        assert_eq!(
            cache.state(&QueryKey::WatchlistMembership("prop-1".to_string())),
            EntryState::Stale
        );
        assert_eq!(cache.state(&QueryKey::Watchlist), EntryState::Stale);
    }

    #[tokio::test]
    async fn test_failed_toggle_keeps_cache() {
        let (backend, cache, service) = service().await;
        service.is_watched("prop-1").await.unwrap();
        backend.fail_next(
            "add_to_watchlist",
            GatewayError::Transport("connection reset".to_string()),
        );

        assert!(service.toggle("prop-1").await.is_err());

        assert_eq!(
            cache.state(&QueryKey::WatchlistMembership("prop-1".to_string())),
            EntryState::Fresh
        );
        assert!(!service.is_toggling("prop-1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_toggle_is_rejected() {
        let (backend, _cache, service) = service().await;
        backend.set_delay("add_to_watchlist", Some(Duration::from_secs(1)));

        let (first, second, toggling) = tokio::join!(
            service.toggle("prop-1"),
            service.toggle("prop-1"),
            async {
                tokio::task::yield_now().await;
                service.is_toggling("prop-1")
            }
        );

        assert!(first.unwrap());
        match second {
            Err(Error::MutationInFlight(key)) => assert_eq!(key, "watchlist:prop-1"),
            other => panic!("expected MutationInFlight, got {:?}", other),
        }
        assert!(toggling);
        assert!(!service.is_toggling("prop-1"));
        assert_eq!(backend.calls("add_to_watchlist"), 1);
    }

    #[tokio::test]
    async fn test_signed_out_membership_is_false() {
        let session = Arc::new(SessionContext::new());
        let backend = Arc::new(InMemoryBackend::new(session));
        let service = WatchlistService::new(backend, Arc::new(ReadModelCache::default()));

        assert!(!service.is_watched("prop-1").await.unwrap());
    }
}
