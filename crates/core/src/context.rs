//! Service graph for one client session.

use log::info;
use std::sync::Arc;

use crate::cache::{QueryConfig, ReadModelCache};
use crate::errors::Result;
use crate::notifications::{NotificationGateway, NotificationService, NotificationServiceTrait};
use crate::portfolio::{PortfolioGateway, PortfolioService, PortfolioServiceTrait};
use crate::properties::{PropertyGateway, PropertyService, PropertyServiceTrait};
use crate::session::{AuthGateway, Session, SessionContext, SignUp, User};
use crate::trading::TradeViewModel;
use crate::watchlist::{WatchlistGateway, WatchlistService, WatchlistServiceTrait};

/// The remote data gateway, one handle per concern.
#[derive(Clone)]
pub struct Gateways {
    pub properties: Arc<dyn PropertyGateway>,
    pub portfolio: Arc<dyn PortfolioGateway>,
    pub watchlist: Arc<dyn WatchlistGateway>,
    pub notifications: Arc<dyn NotificationGateway>,
    pub auth: Arc<dyn AuthGateway>,
}

impl Gateways {
    /// Uses one backend object for every concern.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: PropertyGateway
            + PortfolioGateway
            + WatchlistGateway
            + NotificationGateway
            + AuthGateway
            + 'static,
    {
        Self {
            properties: backend.clone(),
            portfolio: backend.clone(),
            watchlist: backend.clone(),
            notifications: backend.clone(),
            auth: backend,
        }
    }
}

/// Session, read model cache and services wired together.
///
/// The cache holds per-user data, so it is cleared whenever the signed-in
/// user changes.
pub struct ClientContext {
    pub session: Arc<SessionContext>,
    pub cache: Arc<ReadModelCache>,
    pub property_service: Arc<dyn PropertyServiceTrait>,
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub watchlist_service: Arc<dyn WatchlistServiceTrait>,
    pub notification_service: Arc<dyn NotificationServiceTrait>,
    pub trades: TradeViewModel,
    auth: Arc<dyn AuthGateway>,
}

impl ClientContext {
    pub fn new(session: Arc<SessionContext>, gateways: Gateways, config: QueryConfig) -> Self {
        let cache = Arc::new(ReadModelCache::new(config));

        let property_service: Arc<dyn PropertyServiceTrait> = Arc::new(PropertyService::new(
            gateways.properties.clone(),
            cache.clone(),
        ));
        let portfolio_service: Arc<dyn PortfolioServiceTrait> = Arc::new(
            PortfolioService::new(gateways.portfolio.clone(), cache.clone()),
        );
        let watchlist_service: Arc<dyn WatchlistServiceTrait> = Arc::new(
            WatchlistService::new(gateways.watchlist.clone(), cache.clone()),
        );
        let notification_service: Arc<dyn NotificationServiceTrait> =
            Arc::new(NotificationService::new(
                gateways.notifications.clone(),
                cache.clone(),
                session.clone(),
            ));
        let trades = TradeViewModel::new(
            gateways.portfolio.clone(),
            property_service.clone(),
            portfolio_service.clone(),
            cache.clone(),
        );

        Self {
            session,
            cache,
            property_service,
            portfolio_service,
            watchlist_service,
            notification_service,
            trades,
            auth: gateways.auth,
        }
    }

    pub fn auth(&self) -> &dyn AuthGateway {
        self.auth.as_ref()
    }

    /// Restores a persisted session and starts from an empty cache.
    pub async fn initialize(&self, restored: Option<Session>) -> Result<()> {
        self.cache.clear();
        self.session.initialize(self.auth(), restored).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let user = self.session.sign_in(self.auth(), email, password).await?;
        self.cache.clear();
        Ok(user)
    }

    pub async fn sign_up(&self, sign_up: &SignUp) -> Result<Option<User>> {
        let user = self.session.sign_up(self.auth(), sign_up).await?;
        if user.is_some() {
            self.cache.clear();
        }
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.cache.clear();
        self.session.sign_out(self.auth()).await
    }

    pub fn teardown(&self) {
        self.cache.clear();
        self.session.teardown();
        info!("[ClientContext] Torn down");
    }
}
