use async_trait::async_trait;
use log::warn;
use propshare_core::errors::{GatewayError, GatewayResult};
use propshare_core::portfolio::{
    Investment, PortfolioGateway, PortfolioSummary, TradeReceipt, Transaction,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::gateway::SupabaseGateway;
use crate::query::Query;

const INVESTMENTS: &str = "investments";
const TRANSACTIONS: &str = "transactions";

const SUMMARY_PROCEDURE: &str = "get_portfolio_summary";
const BUY_PROCEDURE: &str = "process_buy_transaction";
const SELL_PROCEDURE: &str = "process_sell_transaction";

#[derive(Debug, Serialize)]
struct UserArgs<'a> {
    p_user_id: &'a str,
}

#[derive(Debug, Serialize)]
struct TradeArgs<'a> {
    p_user_id: &'a str,
    p_property_id: &'a str,
    p_shares: i64,
}

/// Summary as returned by the procedure; sums are null for an empty
/// portfolio.
#[derive(Debug, Deserialize)]
struct ApiPortfolioSummary {
    #[serde(default)]
    total_invested: Option<Decimal>,
    #[serde(default)]
    current_value: Option<Decimal>,
    #[serde(default)]
    total_return: Option<Decimal>,
    #[serde(default)]
    return_percentage: Option<Decimal>,
    #[serde(default)]
    total_properties: Option<i64>,
}

impl From<ApiPortfolioSummary> for PortfolioSummary {
    fn from(api: ApiPortfolioSummary) -> Self {
        Self {
            total_invested: api.total_invested.unwrap_or_default(),
            current_value: api.current_value.unwrap_or_default(),
            total_return: api.total_return.unwrap_or_default(),
            return_percentage: api.return_percentage.unwrap_or_default(),
            total_properties: api.total_properties.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiTradeResult {
    success: bool,
    #[serde(default)]
    transaction_id: Option<String>,
    #[serde(default)]
    total_amount: Option<Decimal>,
    #[serde(default)]
    error: Option<String>,
}

/// Turns a procedure result into a receipt. `success: false` is a domain
/// rejection carrying the backend's message.
pub(crate) fn into_receipt(result: ApiTradeResult) -> GatewayResult<TradeReceipt> {
    if !result.success {
        let message = result
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| "Transaction failed".to_string());
        return Err(GatewayError::Rejected(message));
    }
    match (result.transaction_id, result.total_amount) {
        (Some(transaction_id), Some(total_amount)) => Ok(TradeReceipt {
            success: true,
            transaction_id,
            total_amount,
        }),
        _ => Err(GatewayError::Decode(
            "successful trade without transaction id or total".to_string(),
        )),
    }
}

impl SupabaseGateway {
    async fn trade(&self, procedure: &str, property_id: &str, shares: i64) -> GatewayResult<TradeReceipt> {
        let user_id = self.require_user_id()?;
        let args = TradeArgs {
            p_user_id: &user_id,
            p_property_id: property_id,
            p_shares: shares,
        };
        let result: ApiTradeResult = self.client.rpc(procedure, &args).await?;
        into_receipt(result).inspect_err(|err| {
            warn!("[SupabaseGateway] {} for {} failed: {}", procedure, property_id, err);
        })
    }
}

#[async_trait]
impl PortfolioGateway for SupabaseGateway {
    async fn get_investment_for_property(
        &self,
        property_id: &str,
    ) -> GatewayResult<Option<Investment>> {
        let Some(user_id) = self.session.user_id() else {
            return Ok(None);
        };
        let query = Query::new()
            .select("*")
            .eq("user_id", &user_id)
            .eq("property_id", property_id);
        self.client.select_single(INVESTMENTS, &query).await
    }

    async fn get_investments(&self) -> GatewayResult<Vec<Investment>> {
        let user_id = self.require_user_id()?;
        let query = Query::new()
            .select("*,property:properties(*)")
            .eq("user_id", &user_id)
            .gt("shares_owned", 0)
            .order("created_at", false);
        self.client.select(INVESTMENTS, &query).await
    }

    async fn get_transactions(&self, limit: usize) -> GatewayResult<Vec<Transaction>> {
        let user_id = self.require_user_id()?;
        let query = Query::new()
            .select("*,property:properties(name,thumbnail_url,city)")
            .eq("user_id", &user_id)
            .order("created_at", false)
            .limit(limit);
        self.client.select(TRANSACTIONS, &query).await
    }

    async fn get_portfolio_summary(&self) -> GatewayResult<PortfolioSummary> {
        let user_id = self.require_user_id()?;
        let summary: ApiPortfolioSummary = self
            .client
            .rpc(SUMMARY_PROCEDURE, &UserArgs { p_user_id: &user_id })
            .await?;
        Ok(summary.into())
    }

    async fn buy(&self, property_id: &str, shares: i64) -> GatewayResult<TradeReceipt> {
        self.trade(BUY_PROCEDURE, property_id, shares).await
    }

    async fn sell(&self, property_id: &str, shares: i64) -> GatewayResult<TradeReceipt> {
        self.trade(SELL_PROCEDURE, property_id, shares).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_successful_trade_result() {
        let result: ApiTradeResult = serde_json::from_str(
            r#"{"success": true, "transaction_id": "tx-1", "total_amount": 300.0}"#,
        )
        .unwrap();
        let receipt = into_receipt(result).unwrap();
        assert_eq!(receipt.transaction_id, "tx-1");
        assert_eq!(receipt.total_amount, dec!(300));
    }

    #[test]
    fn test_unsuccessful_trade_result_is_rejection() {
        let result: ApiTradeResult =
            serde_json::from_str(r#"{"success": false, "error": "Not enough shares available"}"#)
                .unwrap();
        assert_eq!(
            into_receipt(result),
            Err(GatewayError::Rejected("Not enough shares available".to_string()))
        );

        let result: ApiTradeResult = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert_eq!(
            into_receipt(result),
            Err(GatewayError::Rejected("Transaction failed".to_string()))
        );
    }

    #[test]
    fn test_empty_summary_defaults_to_zero() {
        let api: ApiPortfolioSummary = serde_json::from_str(
            r#"{"total_invested": null, "current_value": null, "total_return": null,
                "return_percentage": null, "total_properties": 0}"#,
        )
        .unwrap();
        let summary = PortfolioSummary::from(api);
        assert_eq!(summary, PortfolioSummary::default());
    }
}
