//! Typed cache keys and values.

use crate::notifications::Notification;
use crate::portfolio::{Investment, PortfolioSummary, Transaction};
use crate::properties::{Property, PropertyFilter, PropertyType};
use crate::session::Profile;
use crate::watchlist::WatchlistItem;

/// Logical identity of a cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Property(String),
    Properties(PropertyFilter),
    FeaturedProperties(usize),
    PropertyTypes,
    Cities,
    InvestmentForProperty(String),
    Investments,
    PortfolioSummary,
    Transactions(usize),
    WatchlistMembership(String),
    Watchlist,
    Notifications,
    UnreadNotifications,
    Profile,
}

impl QueryKey {
    /// Keys whose data a confirmed buy or sell of `property_id` can change.
    pub fn affected_by_trade(property_id: &str) -> Vec<QueryKey> {
        vec![
            QueryKey::Property(property_id.to_string()),
            QueryKey::InvestmentForProperty(property_id.to_string()),
            QueryKey::Investments,
            QueryKey::PortfolioSummary,
        ]
    }

    /// Keys whose data a watchlist add/remove for `property_id` can change.
    pub fn affected_by_watchlist(property_id: &str) -> Vec<QueryKey> {
        vec![
            QueryKey::WatchlistMembership(property_id.to_string()),
            QueryKey::Watchlist,
        ]
    }

    /// Keys whose data any notification mutation can change.
    pub fn affected_by_notifications() -> Vec<QueryKey> {
        vec![QueryKey::Notifications, QueryKey::UnreadNotifications]
    }

    pub fn is_transactions(&self) -> bool {
        matches!(self, QueryKey::Transactions(_))
    }

    /// Short label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            QueryKey::Property(_) => "property",
            QueryKey::Properties(_) => "properties",
            QueryKey::FeaturedProperties(_) => "featuredProperties",
            QueryKey::PropertyTypes => "propertyTypes",
            QueryKey::Cities => "cities",
            QueryKey::InvestmentForProperty(_) => "investment",
            QueryKey::Investments => "investments",
            QueryKey::PortfolioSummary => "portfolioSummary",
            QueryKey::Transactions(_) => "transactions",
            QueryKey::WatchlistMembership(_) => "watchlistMembership",
            QueryKey::Watchlist => "watchlist",
            QueryKey::Notifications => "notifications",
            QueryKey::UnreadNotifications => "unreadNotifications",
            QueryKey::Profile => "profile",
        }
    }
}

/// Payload stored under a [`QueryKey`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Property(Property),
    Properties(Vec<Property>),
    PropertyTypes(Vec<PropertyType>),
    Cities(Vec<String>),
    Investment(Option<Investment>),
    Investments(Vec<Investment>),
    PortfolioSummary(PortfolioSummary),
    Transactions(Vec<Transaction>),
    WatchlistMembership(bool),
    Watchlist(Vec<WatchlistItem>),
    Notifications(Vec<Notification>),
    Count(u64),
    Profile(Profile),
}
