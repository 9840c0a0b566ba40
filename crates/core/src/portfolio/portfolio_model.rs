//! Investment, transaction and portfolio summary models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::properties::Property;

/// A user's aggregate position in one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub shares_owned: i64,
    pub average_purchase_price: Decimal,
    pub total_invested: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<Property>,
}

impl Investment {
    /// Market value of the position at the given share price.
    pub fn current_value(&self, share_price: Decimal) -> Decimal {
        Decimal::from(self.shares_owned) * share_price
    }

    /// Unrealised gain against the cost basis at the given share price.
    pub fn unrealized_return(&self, share_price: Decimal) -> Decimal {
        self.current_value(share_price) - self.total_invested
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
    Failed,
}

/// Property columns embedded in transaction listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionProperty {
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub city: String,
}

/// Immutable record of a buy or sell, written only by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub transaction_type: TransactionType,
    pub shares: i64,
    pub price_per_share: Decimal,
    pub total_amount: Decimal,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<TransactionProperty>,
}

/// Aggregate computed by the backend on demand. Never mutated locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub total_invested: Decimal,
    pub current_value: Decimal,
    pub total_return: Decimal,
    pub return_percentage: Decimal,
    pub total_properties: i64,
}

/// Result of a buy or sell procedure.
///
/// `total_amount` is the authoritative amount charged or credited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeReceipt {
    pub success: bool,
    pub transaction_id: String,
    pub total_amount: Decimal,
}

/// Default number of transactions to list.
pub const DEFAULT_TRANSACTION_LIMIT: usize = 20;
