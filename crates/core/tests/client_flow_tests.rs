//! End-to-end flows through `ClientContext` over the in-memory backend.

use propshare_core::backend::{InMemoryBackend, DEMO_EMAIL, DEMO_PASSWORD};
use propshare_core::cache::{EntryState, QueryConfig, QueryKey};
use propshare_core::errors::{Error, ErrorKind};
use propshare_core::properties::PropertyFilter;
use propshare_core::{ClientContext, Gateways};
use rust_decimal_macros::dec;
use std::sync::Arc;

const LOFTS: &str = "prop-harbour-lofts";

async fn demo_client() -> (Arc<InMemoryBackend>, ClientContext) {
    let session = Arc::new(propshare_core::session::SessionContext::new());
    let backend = Arc::new(InMemoryBackend::seeded(session.clone()));
    let client = ClientContext::new(
        session,
        Gateways::from_backend(backend.clone()),
        QueryConfig::default(),
    );
    client.initialize(None).await.unwrap();
    (backend, client)
}

#[tokio::test]
async fn test_browse_signed_out() {
    let (_backend, client) = demo_client().await;

    let listed = client
        .property_service
        .list_properties(&PropertyFilter::default())
        .await
        .unwrap();
    assert_eq!(listed.len(), 3);

    let investment = client
        .portfolio_service
        .investment_for_property(LOFTS)
        .await
        .unwrap();
    assert!(investment.is_none());
    assert_eq!(client.notification_service.unread_count().await.unwrap(), 0);
    assert!(!client.watchlist_service.is_watched(LOFTS).await.unwrap());
}

#[tokio::test]
async fn test_trading_requires_sign_in() {
    let (backend, client) = demo_client().await;

    let err = client.trades.initiate_buy(LOFTS, 1).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(backend.calls("buy"), 1);
}

#[tokio::test]
async fn test_buy_then_portfolio_reflects_it() {
    let (_backend, client) = demo_client().await;
    client.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

    let before = client.portfolio_service.summary().await.unwrap();
    assert_eq!(before.total_properties, 0);

    let confirmation = client.trades.initiate_buy(LOFTS, 3).await.unwrap();
    assert_eq!(confirmation.message(), "You bought 3 shares for $300.00");

    let summary = client.portfolio_service.summary().await.unwrap();
    assert_eq!(summary.total_invested, dec!(300));
    assert_eq!(summary.total_properties, 1);

    let transactions = client.portfolio_service.transactions(20).await.unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].total_amount, dec!(300));

    let property = client.property_service.get_property(LOFTS).await.unwrap();
    assert_eq!(property.available_shares, 6_247);

    assert_eq!(client.notification_service.unread_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_sign_out_clears_user_data() {
    let (_backend, client) = demo_client().await;
    client.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    client.trades.initiate_buy(LOFTS, 2).await.unwrap();
    client.portfolio_service.investments().await.unwrap();

    client.sign_out().await.unwrap();

    assert_eq!(client.cache.state(&QueryKey::Investments), EntryState::Missing);
    assert!(matches!(
        client.portfolio_service.investments().await,
        Err(Error::Gateway(_))
    ));
    let investment = client
        .portfolio_service
        .investment_for_property(LOFTS)
        .await
        .unwrap();
    assert!(investment.is_none());
}

#[tokio::test]
async fn test_watch_and_list() {
    let (_backend, client) = demo_client().await;
    client.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();

    assert!(client.watchlist_service.toggle(LOFTS).await.unwrap());
    let items = client.watchlist_service.watchlist().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].property_id, LOFTS);
}

#[tokio::test]
async fn test_teardown_resets_session_and_cache() {
    let (_backend, client) = demo_client().await;
    client.sign_in(DEMO_EMAIL, DEMO_PASSWORD).await.unwrap();
    client.portfolio_service.summary().await.unwrap();

    client.teardown();

    assert!(!client.session.is_initialized());
    assert!(client.cache.is_empty());
}
