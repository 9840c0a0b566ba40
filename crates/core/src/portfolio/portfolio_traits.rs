//! Portfolio gateway trait.
//!
//! The buy and sell procedures run atomically on the backend. The client never
//! computes amounts or adjusts share counts itself.

use async_trait::async_trait;

use super::portfolio_model::{Investment, PortfolioSummary, TradeReceipt, Transaction};
use crate::errors::GatewayResult;

#[async_trait]
pub trait PortfolioGateway: Send + Sync {
    /// The signed-in user's position in a property, if any.
    async fn get_investment_for_property(
        &self,
        property_id: &str,
    ) -> GatewayResult<Option<Investment>>;

    /// All positions of the signed-in user, newest first.
    async fn get_investments(&self) -> GatewayResult<Vec<Investment>>;

    /// Most recent transactions of the signed-in user.
    async fn get_transactions(&self, limit: usize) -> GatewayResult<Vec<Transaction>>;

    async fn get_portfolio_summary(&self) -> GatewayResult<PortfolioSummary>;

    /// Buys `shares` at the price in effect when the procedure runs.
    ///
    /// A business-rule failure is `GatewayError::Rejected` with the
    /// backend's message; implementations never return `success: false`.
    async fn buy(&self, property_id: &str, shares: i64) -> GatewayResult<TradeReceipt>;

    /// Sells `shares` of an existing position.
    async fn sell(&self, property_id: &str, shares: i64) -> GatewayResult<TradeReceipt>;
}
