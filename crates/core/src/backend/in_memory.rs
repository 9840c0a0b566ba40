//! In-process implementation of every gateway trait.
//!
//! Reproduces the backend's procedures (atomic buy/sell, position upkeep,
//! transaction and notification records) over plain collections. Used for
//! demo mode and as the test double for services and view-models. Per-call
//! counters and failure injection let tests assert which requests were made.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use log::debug;
use rust_decimal::Decimal;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use uuid::Uuid;

use super::fixtures;
use crate::errors::{GatewayError, GatewayResult};
use crate::notifications::{Notification, NotificationGateway, NotificationType};
use crate::portfolio::{
    Investment, PortfolioGateway, PortfolioSummary, TradeReceipt, Transaction,
    TransactionProperty, TransactionStatus, TransactionType,
};
use crate::properties::{
    Property, PropertyFilter, PropertyGateway, PropertyStatus, PropertyType,
    DEFAULT_LISTED_STATUSES,
};
use crate::session::{
    AuthGateway, Profile, ProfileUpdate, Session, SessionContext, SignUp, User,
};
use crate::watchlist::{WatchlistGateway, WatchlistItem};

/// Demo account available in a seeded backend.
pub const DEMO_EMAIL: &str = "demo@propshare.app";
pub const DEMO_PASSWORD: &str = "demo-password";

const SESSION_TTL_HOURS: i64 = 1;

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password: String,
    profile: Profile,
    /// `None` means unlimited funds.
    cash_balance: Option<Decimal>,
}

#[derive(Debug, Default)]
struct BackendState {
    properties: Vec<Property>,
    investments: Vec<Investment>,
    transactions: Vec<Transaction>,
    watchlist: Vec<WatchlistItem>,
    notifications: Vec<Notification>,
    accounts: Vec<Account>,
    /// access token -> user id
    tokens: HashMap<String, String>,
}

pub struct InMemoryBackend {
    session: Arc<SessionContext>,
    state: Mutex<BackendState>,
    calls: DashMap<&'static str, u64>,
    failures: Mutex<HashMap<&'static str, VecDeque<GatewayError>>>,
    delays: Mutex<HashMap<&'static str, Duration>>,
}

impl InMemoryBackend {
    /// An empty backend. Data calls resolve the current user through
    /// `session`.
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self {
            session,
            state: Mutex::new(BackendState::default()),
            calls: DashMap::new(),
            failures: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
        }
    }

    /// A backend holding the demo catalogue and the demo account.
    pub fn seeded(session: Arc<SessionContext>) -> Self {
        let backend = Self::new(session);
        for property in fixtures::demo_catalogue() {
            backend.insert_property(property);
        }
        backend.add_account(DEMO_EMAIL, DEMO_PASSWORD, "Demo Investor");
        backend
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Seeding
    // ─────────────────────────────────────────────────────────────────────────

    pub fn insert_property(&self, property: Property) {
        let mut state = self.lock();
        state.properties.retain(|p| p.id != property.id);
        state.properties.push(property);
    }

    /// Registers an account and returns its user id.
    pub fn add_account(&self, email: &str, password: &str, full_name: &str) -> String {
        let mut state = self.lock();
        Self::create_account(&mut state, email, password, full_name).user.id
    }

    /// Caps the funds available to the account for buying.
    pub fn set_cash_balance(&self, user_id: &str, balance: Decimal) {
        if let Some(account) = self.lock().accounts.iter_mut().find(|a| a.user.id == user_id) {
            account.cash_balance = Some(balance);
        }
    }

    pub fn cash_balance(&self, user_id: &str) -> Option<Decimal> {
        self.lock()
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .and_then(|a| a.cash_balance)
    }

    pub fn insert_investment(&self, investment: Investment) {
        let mut state = self.lock();
        state
            .investments
            .retain(|i| !(i.user_id == investment.user_id && i.property_id == investment.property_id));
        state.investments.push(investment);
    }

    pub fn push_notification(&self, user_id: &str, title: &str, message: &str) -> String {
        let mut state = self.lock();
        Self::notify(
            &mut state,
            user_id,
            title,
            message,
            NotificationType::Info,
            serde_json::Value::Null,
        )
    }

    /// Issues a session for an existing account without going through the
    /// password check.
    pub fn issue_session(&self, user_id: &str) -> GatewayResult<Session> {
        let mut state = self.lock();
        let user = state
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("user {}", user_id)))?;
        Ok(Self::start_session(&mut state, user))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection and fault injection
    // ─────────────────────────────────────────────────────────────────────────

    /// Number of times the named gateway operation was called.
    pub fn calls(&self, operation: &str) -> u64 {
        self.calls.get(operation).map(|count| *count).unwrap_or(0)
    }

    pub fn trade_calls(&self) -> u64 {
        self.calls("buy") + self.calls("sell")
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: GatewayError) {
        self.lock_failures()
            .entry(operation)
            .or_default()
            .push_back(error);
    }

    /// Delays responses of a mutating operation, to hold it in flight.
    pub fn set_delay(&self, operation: &'static str, delay: Option<Duration>) {
        let mut delays = self.delays.lock().unwrap_or_else(|e| e.into_inner());
        match delay {
            Some(delay) => delays.insert(operation, delay),
            None => delays.remove(operation),
        };
    }

    pub fn property_snapshot(&self, property_id: &str) -> Option<Property> {
        self.lock()
            .properties
            .iter()
            .find(|p| p.id == property_id)
            .cloned()
    }

    pub fn investment_snapshot(&self, user_id: &str, property_id: &str) -> Option<Investment> {
        self.lock()
            .investments
            .iter()
            .find(|i| i.user_id == user_id && i.property_id == property_id)
            .cloned()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_failures(&self) -> MutexGuard<'_, HashMap<&'static str, VecDeque<GatewayError>>> {
        self.failures.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Counts the call and returns any injected failure.
    fn enter(&self, operation: &'static str) -> GatewayResult<()> {
        *self.calls.entry(operation).or_insert(0) += 1;
        match self
            .lock_failures()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
        {
            Some(error) => {
                debug!("[InMemoryBackend] injected failure for {}: {}", operation, error);
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn current_user(&self) -> GatewayResult<String> {
        self.session.user_id().ok_or(GatewayError::NotAuthenticated)
    }

    async fn pause(&self, operation: &'static str) {
        let delay = self
            .delays
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(operation)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn create_account(
        state: &mut BackendState,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Account {
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();
        let account = Account {
            user: User {
                id: id.clone(),
                email: Some(email.to_string()),
                full_name: Some(full_name.to_string()),
            },
            password: password.to_string(),
            profile: Profile {
                id,
                email: email.to_string(),
                full_name: Some(full_name.to_string()),
                avatar_url: None,
                phone: None,
                created_at: now,
                updated_at: now,
            },
            cash_balance: None,
        };
        state.accounts.push(account.clone());
        account
    }

    fn start_session(state: &mut BackendState, user: User) -> Session {
        let token = Uuid::new_v4().to_string();
        state.tokens.insert(token.clone(), user.id.clone());
        Session {
            access_token: token,
            refresh_token: Uuid::new_v4().to_string(),
            expires_at: Some(Utc::now() + ChronoDuration::hours(SESSION_TTL_HOURS)),
            user,
        }
    }

    fn user_for_token(state: &BackendState, token: &str) -> GatewayResult<String> {
        state
            .tokens
            .get(token)
            .cloned()
            .ok_or(GatewayError::NotAuthenticated)
    }

    fn notify(
        state: &mut BackendState,
        user_id: &str,
        title: &str,
        message: &str,
        notification_type: NotificationType,
        metadata: serde_json::Value,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        state.notifications.push(Notification {
            id: id.clone(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            notification_type,
            is_read: false,
            metadata,
            created_at: Utc::now(),
        });
        id
    }

    fn record_transaction(
        state: &mut BackendState,
        user_id: &str,
        property: &Property,
        transaction_type: TransactionType,
        shares: i64,
        total_amount: Decimal,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        state.transactions.push(Transaction {
            id: id.clone(),
            user_id: user_id.to_string(),
            property_id: property.id.clone(),
            transaction_type,
            shares,
            price_per_share: property.share_price,
            total_amount,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
            property: Some(TransactionProperty {
                name: property.name.clone(),
                thumbnail_url: property.thumbnail_url.clone(),
                city: property.city.clone(),
            }),
        });
        id
    }

    fn process_buy(
        state: &mut BackendState,
        user_id: &str,
        property_id: &str,
        shares: i64,
    ) -> GatewayResult<TradeReceipt> {
        if shares <= 0 {
            return Err(GatewayError::Rejected("Invalid share amount".to_string()));
        }
        let property = state
            .properties
            .iter()
            .find(|p| p.id == property_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected("Property not found".to_string()))?;
        if property.status != PropertyStatus::Active {
            return Err(GatewayError::Rejected(
                "Property is not available for investment".to_string(),
            ));
        }
        if shares > property.available_shares {
            return Err(GatewayError::Rejected(
                "Not enough shares available".to_string(),
            ));
        }

        let total = property.share_price * Decimal::from(shares);
        if let Some(account) = state.accounts.iter_mut().find(|a| a.user.id == user_id) {
            if let Some(balance) = account.cash_balance {
                if total > balance {
                    return Err(GatewayError::Rejected("Insufficient funds".to_string()));
                }
                account.cash_balance = Some(balance - total);
            }
        }

        let now = Utc::now();
        if let Some(stored) = state.properties.iter_mut().find(|p| p.id == property_id) {
            stored.available_shares -= shares;
            if stored.available_shares == 0 {
                stored.status = PropertyStatus::SoldOut;
            }
            stored.updated_at = now;
        }

        match state
            .investments
            .iter_mut()
            .find(|i| i.user_id == user_id && i.property_id == property_id)
        {
            Some(investment) => {
                investment.shares_owned += shares;
                investment.total_invested += total;
                investment.average_purchase_price =
                    investment.total_invested / Decimal::from(investment.shares_owned);
                investment.updated_at = now;
            }
            None => state.investments.push(Investment {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                property_id: property_id.to_string(),
                shares_owned: shares,
                average_purchase_price: property.share_price,
                total_invested: total,
                created_at: now,
                updated_at: now,
                property: None,
            }),
        }

        let transaction_id =
            Self::record_transaction(state, user_id, &property, TransactionType::Buy, shares, total);
        Self::notify(
            state,
            user_id,
            "Purchase confirmed",
            &format!("You bought {} shares of {}", shares, property.name),
            NotificationType::Transaction,
            json!({ "transaction_id": transaction_id, "property_id": property_id }),
        );

        Ok(TradeReceipt {
            success: true,
            transaction_id,
            total_amount: total,
        })
    }

    fn process_sell(
        state: &mut BackendState,
        user_id: &str,
        property_id: &str,
        shares: i64,
    ) -> GatewayResult<TradeReceipt> {
        if shares <= 0 {
            return Err(GatewayError::Rejected("Invalid share amount".to_string()));
        }
        let property = state
            .properties
            .iter()
            .find(|p| p.id == property_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected("Property not found".to_string()))?;

        let now = Utc::now();
        let investment = state
            .investments
            .iter_mut()
            .find(|i| i.user_id == user_id && i.property_id == property_id)
            .filter(|i| i.shares_owned >= shares)
            .ok_or_else(|| GatewayError::Rejected("Insufficient shares to sell".to_string()))?;
        let cost_basis = investment.average_purchase_price * Decimal::from(shares);
        investment.shares_owned -= shares;
        investment.total_invested = (investment.total_invested - cost_basis).max(Decimal::ZERO);
        investment.updated_at = now;

        let total = property.share_price * Decimal::from(shares);
        if let Some(stored) = state.properties.iter_mut().find(|p| p.id == property_id) {
            stored.available_shares += shares;
            if stored.status == PropertyStatus::SoldOut {
                stored.status = PropertyStatus::Active;
            }
            stored.updated_at = now;
        }
        if let Some(account) = state.accounts.iter_mut().find(|a| a.user.id == user_id) {
            account.cash_balance = account.cash_balance.map(|balance| balance + total);
        }

        let transaction_id =
            Self::record_transaction(state, user_id, &property, TransactionType::Sell, shares, total);
        Self::notify(
            state,
            user_id,
            "Sale confirmed",
            &format!("You sold {} shares of {}", shares, property.name),
            NotificationType::Transaction,
            json!({ "transaction_id": transaction_id, "property_id": property_id }),
        );

        Ok(TradeReceipt {
            success: true,
            transaction_id,
            total_amount: total,
        })
    }
}

#[async_trait]
impl PropertyGateway for InMemoryBackend {
    async fn get_property(&self, property_id: &str) -> GatewayResult<Property> {
        self.enter("get_property")?;
        self.property_snapshot(property_id)
            .ok_or_else(|| GatewayError::NotFound(format!("property {}", property_id)))
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> GatewayResult<Vec<Property>> {
        self.enter("list_properties")?;
        let mut matching: Vec<Property> = self
            .lock()
            .properties
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let matching = match filter.range() {
            Some((from, to)) => matching
                .into_iter()
                .skip(from)
                .take(to - from + 1)
                .collect(),
            None => match filter.limit {
                Some(limit) => matching.into_iter().take(limit).collect(),
                None => matching,
            },
        };
        Ok(matching)
    }

    async fn featured_properties(&self, limit: usize) -> GatewayResult<Vec<Property>> {
        self.enter("featured_properties")?;
        let mut active: Vec<Property> = self
            .lock()
            .properties
            .iter()
            .filter(|p| p.is_active())
            .cloned()
            .collect();
        active.sort_by(|a, b| b.annual_return_rate.cmp(&a.annual_return_rate));
        active.truncate(limit);
        Ok(active)
    }

    async fn property_types(&self) -> GatewayResult<Vec<PropertyType>> {
        self.enter("property_types")?;
        let mut types: Vec<PropertyType> = self
            .lock()
            .properties
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.property_type)
            .collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    async fn cities(&self) -> GatewayResult<Vec<String>> {
        self.enter("cities")?;
        let mut cities: Vec<String> = self
            .lock()
            .properties
            .iter()
            .filter(|p| DEFAULT_LISTED_STATUSES.contains(&p.status))
            .map(|p| p.city.clone())
            .collect();
        cities.sort();
        cities.dedup();
        Ok(cities)
    }
}

#[async_trait]
impl PortfolioGateway for InMemoryBackend {
    async fn get_investment_for_property(
        &self,
        property_id: &str,
    ) -> GatewayResult<Option<Investment>> {
        self.enter("get_investment_for_property")?;
        let Some(user_id) = self.session.user_id() else {
            return Ok(None);
        };
        Ok(self.investment_snapshot(&user_id, property_id))
    }

    async fn get_investments(&self) -> GatewayResult<Vec<Investment>> {
        self.enter("get_investments")?;
        let user_id = self.current_user()?;
        let state = self.lock();
        let mut investments: Vec<Investment> = state
            .investments
            .iter()
            .filter(|i| i.user_id == user_id && i.shares_owned > 0)
            .cloned()
            .map(|mut investment| {
                investment.property = state
                    .properties
                    .iter()
                    .find(|p| p.id == investment.property_id)
                    .cloned();
                investment
            })
            .collect();
        investments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(investments)
    }

    async fn get_transactions(&self, limit: usize) -> GatewayResult<Vec<Transaction>> {
        self.enter("get_transactions")?;
        let user_id = self.current_user()?;
        let mut transactions: Vec<Transaction> = self
            .lock()
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal timestamps; reverse it first.
        transactions.reverse();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        transactions.truncate(limit);
        Ok(transactions)
    }

    async fn get_portfolio_summary(&self) -> GatewayResult<PortfolioSummary> {
        self.enter("get_portfolio_summary")?;
        let user_id = self.current_user()?;
        let state = self.lock();
        let mut summary = PortfolioSummary::default();
        for investment in state
            .investments
            .iter()
            .filter(|i| i.user_id == user_id && i.shares_owned > 0)
        {
            let price = state
                .properties
                .iter()
                .find(|p| p.id == investment.property_id)
                .map(|p| p.share_price)
                .unwrap_or(investment.average_purchase_price);
            summary.total_invested += investment.total_invested;
            summary.current_value += investment.current_value(price);
            summary.total_properties += 1;
        }
        summary.total_return = summary.current_value - summary.total_invested;
        if !summary.total_invested.is_zero() {
            summary.return_percentage =
                (summary.total_return / summary.total_invested * Decimal::ONE_HUNDRED).round_dp(2);
        }
        Ok(summary)
    }

    async fn buy(&self, property_id: &str, shares: i64) -> GatewayResult<TradeReceipt> {
        self.enter("buy")?;
        let user_id = self.current_user()?;
        self.pause("buy").await;
        let mut state = self.lock();
        Self::process_buy(&mut state, &user_id, property_id, shares)
    }

    async fn sell(&self, property_id: &str, shares: i64) -> GatewayResult<TradeReceipt> {
        self.enter("sell")?;
        let user_id = self.current_user()?;
        self.pause("sell").await;
        let mut state = self.lock();
        Self::process_sell(&mut state, &user_id, property_id, shares)
    }
}

#[async_trait]
impl WatchlistGateway for InMemoryBackend {
    async fn get_watchlist(&self) -> GatewayResult<Vec<WatchlistItem>> {
        self.enter("get_watchlist")?;
        let user_id = self.current_user()?;
        let state = self.lock();
        let mut items: Vec<WatchlistItem> = state
            .watchlist
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .map(|mut item| {
                item.property = state
                    .properties
                    .iter()
                    .find(|p| p.id == item.property_id)
                    .cloned();
                item
            })
            .collect();
        items.reverse();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn add_to_watchlist(&self, property_id: &str) -> GatewayResult<()> {
        self.enter("add_to_watchlist")?;
        let user_id = self.current_user()?;
        self.pause("add_to_watchlist").await;
        let mut state = self.lock();
        if state
            .watchlist
            .iter()
            .any(|w| w.user_id == user_id && w.property_id == property_id)
        {
            return Err(GatewayError::Rejected(
                "Property is already in your watchlist".to_string(),
            ));
        }
        state.watchlist.push(WatchlistItem {
            id: Uuid::new_v4().to_string(),
            user_id,
            property_id: property_id.to_string(),
            created_at: Utc::now(),
            property: None,
        });
        Ok(())
    }

    async fn remove_from_watchlist(&self, property_id: &str) -> GatewayResult<()> {
        self.enter("remove_from_watchlist")?;
        let user_id = self.current_user()?;
        self.pause("remove_from_watchlist").await;
        self.lock()
            .watchlist
            .retain(|w| !(w.user_id == user_id && w.property_id == property_id));
        Ok(())
    }

    async fn is_in_watchlist(&self, property_id: &str) -> GatewayResult<bool> {
        self.enter("is_in_watchlist")?;
        let Some(user_id) = self.session.user_id() else {
            return Ok(false);
        };
        Ok(self
            .lock()
            .watchlist
            .iter()
            .any(|w| w.user_id == user_id && w.property_id == property_id))
    }
}

#[async_trait]
impl NotificationGateway for InMemoryBackend {
    async fn get_notifications(&self) -> GatewayResult<Vec<Notification>> {
        self.enter("get_notifications")?;
        let user_id = self.current_user()?;
        let mut notifications: Vec<Notification> = self
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.reverse();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn mark_notification_read(&self, notification_id: &str) -> GatewayResult<()> {
        self.enter("mark_notification_read")?;
        let user_id = self.current_user()?;
        let mut state = self.lock();
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id && n.user_id == user_id)
            .ok_or_else(|| GatewayError::NotFound(format!("notification {}", notification_id)))?;
        notification.is_read = true;
        Ok(())
    }

    async fn mark_all_notifications_read(&self) -> GatewayResult<()> {
        self.enter("mark_all_notifications_read")?;
        let user_id = self.current_user()?;
        for notification in self
            .lock()
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id)
        {
            notification.is_read = true;
        }
        Ok(())
    }

    async fn unread_count(&self) -> GatewayResult<u64> {
        self.enter("unread_count")?;
        let Some(user_id) = self.session.user_id() else {
            return Ok(0);
        };
        let count = self
            .lock()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count();
        Ok(count as u64)
    }

    async fn delete_notification(&self, notification_id: &str) -> GatewayResult<()> {
        self.enter("delete_notification")?;
        let user_id = self.current_user()?;
        self.lock()
            .notifications
            .retain(|n| !(n.id == notification_id && n.user_id == user_id));
        Ok(())
    }
}

#[async_trait]
impl AuthGateway for InMemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> GatewayResult<Session> {
        self.enter("sign_in_with_password")?;
        let mut state = self.lock();
        let user = state
            .accounts
            .iter()
            .find(|a| {
                a.user.email.as_deref().map(str::to_lowercase) == Some(email.to_lowercase())
                    && a.password == password
            })
            .map(|a| a.user.clone())
            .ok_or_else(|| GatewayError::Rejected("Invalid login credentials".to_string()))?;
        Ok(Self::start_session(&mut state, user))
    }

    async fn sign_up(&self, sign_up: &SignUp) -> GatewayResult<Option<Session>> {
        self.enter("sign_up")?;
        let mut state = self.lock();
        let taken = state.accounts.iter().any(|a| {
            a.user.email.as_deref().map(str::to_lowercase) == Some(sign_up.email.to_lowercase())
        });
        if taken {
            return Err(GatewayError::Rejected(
                "User already registered".to_string(),
            ));
        }
        let account = Self::create_account(
            &mut state,
            &sign_up.email,
            &sign_up.password,
            &sign_up.full_name,
        );
        Ok(Some(Self::start_session(&mut state, account.user)))
    }

    async fn sign_out(&self, access_token: &str) -> GatewayResult<()> {
        self.enter("sign_out")?;
        self.lock().tokens.remove(access_token);
        Ok(())
    }

    async fn reset_password(&self, _email: &str) -> GatewayResult<()> {
        // Unknown addresses succeed too so account existence is not revealed.
        self.enter("reset_password")
    }

    async fn get_user(&self, access_token: &str) -> GatewayResult<User> {
        self.enter("get_user")?;
        let state = self.lock();
        let user_id = Self::user_for_token(&state, access_token)?;
        state
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or(GatewayError::NotAuthenticated)
    }

    async fn get_profile(&self, access_token: &str, user_id: &str) -> GatewayResult<Profile> {
        self.enter("get_profile")?;
        let state = self.lock();
        if Self::user_for_token(&state, access_token)? != user_id {
            return Err(GatewayError::NotAuthenticated);
        }
        state
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.profile.clone())
            .ok_or_else(|| GatewayError::NotFound(format!("profile {}", user_id)))
    }

    async fn update_profile(
        &self,
        access_token: &str,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> GatewayResult<()> {
        self.enter("update_profile")?;
        let mut state = self.lock();
        if Self::user_for_token(&state, access_token)? != user_id {
            return Err(GatewayError::NotAuthenticated);
        }
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.user.id == user_id)
            .ok_or_else(|| GatewayError::NotFound(format!("profile {}", user_id)))?;
        if let Some(full_name) = &update.full_name {
            account.profile.full_name = Some(full_name.clone());
            account.user.full_name = Some(full_name.clone());
        }
        if let Some(avatar_url) = &update.avatar_url {
            account.profile.avatar_url = Some(avatar_url.clone());
        }
        if let Some(phone) = &update.phone {
            account.profile.phone = Some(phone.clone());
        }
        account.profile.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    async fn signed_in_backend() -> (Arc<SessionContext>, InMemoryBackend, String) {
        let session = Arc::new(SessionContext::new());
        let backend = InMemoryBackend::new(session.clone());
        backend.insert_property(fixtures::property("prop-1", "Harbour Lofts", dec!(100), 1000, 10));
        let user_id = backend.add_account("ana@example.com", "secret-pw", "Ana Investor");
        session
            .sign_in(&backend, "ana@example.com", "secret-pw")
            .await
            .unwrap();
        (session, backend, user_id)
    }

    #[tokio::test]
    async fn test_buy_updates_position_and_availability() {
        let (_session, backend, user_id) = signed_in_backend().await;

        let receipt = backend.buy("prop-1", 3).await.unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.total_amount, dec!(300));

        assert_eq!(backend.property_snapshot("prop-1").unwrap().available_shares, 7);
        let investment = backend.investment_snapshot(&user_id, "prop-1").unwrap();
        assert_eq!(investment.shares_owned, 3);
        assert_eq!(investment.average_purchase_price, dec!(100));

        let transactions = backend.get_transactions(20).await.unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].transaction_type, TransactionType::Buy);
        assert_eq!(backend.unread_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_buy_rejections() {
        let (_session, backend, user_id) = signed_in_backend().await;

        let err = backend.buy("prop-1", 11).await.unwrap_err();
        assert_eq!(err, GatewayError::Rejected("Not enough shares available".to_string()));

        backend.set_cash_balance(&user_id, dec!(150));
        let err = backend.buy("prop-1", 2).await.unwrap_err();
        assert_eq!(err, GatewayError::Rejected("Insufficient funds".to_string()));
        assert_eq!(backend.property_snapshot("prop-1").unwrap().available_shares, 10);
    }

    #[tokio::test]
    async fn test_sell_everything_keeps_empty_position() {
        let (_session, backend, user_id) = signed_in_backend().await;
        backend.buy("prop-1", 5).await.unwrap();

        let receipt = backend.sell("prop-1", 5).await.unwrap();
        assert_eq!(receipt.total_amount, dec!(500));

        let investment = backend.investment_snapshot(&user_id, "prop-1").unwrap();
        assert_eq!(investment.shares_owned, 0);
        assert_eq!(investment.total_invested, Decimal::ZERO);
        assert!(backend.get_investments().await.unwrap().is_empty());
        assert_eq!(backend.property_snapshot("prop-1").unwrap().available_shares, 10);
    }

    #[tokio::test]
    async fn test_signed_out_reads_degrade() {
        let session = Arc::new(SessionContext::new());
        let backend = InMemoryBackend::seeded(session);

        assert_eq!(
            backend.get_investment_for_property("prop-harbour-lofts").await,
            Ok(None)
        );
        assert_eq!(backend.is_in_watchlist("prop-harbour-lofts").await, Ok(false));
        assert_eq!(backend.unread_count().await, Ok(0));
        assert_eq!(
            backend.get_investments().await,
            Err(GatewayError::NotAuthenticated)
        );
    }

    #[tokio::test]
    async fn test_failure_injection_is_one_shot() {
        let (_session, backend, _user_id) = signed_in_backend().await;
        backend.fail_next("buy", GatewayError::Transport("connection reset".to_string()));

        assert!(matches!(
            backend.buy("prop-1", 1).await,
            Err(GatewayError::Transport(_))
        ));
        assert!(backend.buy("prop-1", 1).await.is_ok());
        assert_eq!(backend.calls("buy"), 2);
    }

    #[tokio::test]
    async fn test_listing_filters_and_paginates() {
        let session = Arc::new(SessionContext::new());
        let backend = InMemoryBackend::seeded(session);

        let all = backend.list_properties(&PropertyFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3, "sold-out properties are not listed by default");

        let halifax = backend
            .list_properties(&PropertyFilter::default().with_city("hali"))
            .await
            .unwrap();
        assert_eq!(halifax.len(), 1);
        assert_eq!(halifax[0].id, "prop-harbour-lofts");

        let featured = backend.featured_properties(5).await.unwrap();
        assert_eq!(featured[0].id, "prop-king-plaza");
        assert!(featured.iter().all(|p| p.is_active()));

        let cities = backend.cities().await.unwrap();
        assert_eq!(cities, vec!["Calgary", "Halifax", "Toronto"]);

        let types = backend.property_types().await.unwrap();
        assert_eq!(types, vec![PropertyType::Residential, PropertyType::Commercial]);
    }
}
