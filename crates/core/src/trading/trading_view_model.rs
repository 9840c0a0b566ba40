use log::{debug, info, warn};
use std::sync::Arc;

use super::trading_model::{TradeConfirmation, TradeSide, TradeTicket};
use super::trading_validation::{validate_buy, validate_sell, validate_shares};
use crate::cache::{QueryKey, ReadModelCache};
use crate::errors::{Error, GatewayError, Result};
use crate::portfolio::{PortfolioGateway, PortfolioServiceTrait, TradeReceipt};
use crate::properties::PropertyServiceTrait;
use crate::utils::InFlightSet;

/// Orchestrates buying and selling shares.
///
/// A trade is validated locally against the latest cached read model, sent to
/// the backend's atomic procedure, and on success every read affected by the
/// trade is invalidated. Failures leave the cache untouched. At most one trade
/// per property is outstanding at a time.
pub struct TradeViewModel {
    gateway: Arc<dyn PortfolioGateway>,
    properties: Arc<dyn PropertyServiceTrait>,
    portfolio: Arc<dyn PortfolioServiceTrait>,
    cache: Arc<ReadModelCache>,
    in_flight: InFlightSet,
}

impl TradeViewModel {
    pub fn new(
        gateway: Arc<dyn PortfolioGateway>,
        properties: Arc<dyn PropertyServiceTrait>,
        portfolio: Arc<dyn PortfolioServiceTrait>,
        cache: Arc<ReadModelCache>,
    ) -> Self {
        Self {
            gateway,
            properties,
            portfolio,
            cache,
            in_flight: InFlightSet::new(),
        }
    }

    fn mutation_key(property_id: &str) -> String {
        format!("trade:{}", property_id)
    }

    /// Loads the property and the user's position into a fresh ticket.
    pub async fn open_ticket(&self, side: TradeSide, property_id: &str) -> Result<TradeTicket> {
        let property = self.properties.get_property(property_id).await?;
        let investment = self.portfolio.investment_for_property(property_id).await?;
        Ok(TradeTicket::new(side, property, investment))
    }

    /// Re-reads the ticket's property and position, e.g. after the cache was
    /// invalidated by another trade.
    pub async fn refresh_ticket(&self, ticket: &mut TradeTicket) -> Result<()> {
        let property_id = ticket.property_id().to_string();
        let property = self.properties.get_property(&property_id).await?;
        let investment = self.portfolio.investment_for_property(&property_id).await?;
        ticket.refresh(property, investment);
        Ok(())
    }

    pub async fn initiate_buy(&self, property_id: &str, shares: i64) -> Result<TradeConfirmation> {
        self.execute(TradeSide::Buy, property_id, shares).await
    }

    pub async fn initiate_sell(&self, property_id: &str, shares: i64) -> Result<TradeConfirmation> {
        self.execute(TradeSide::Sell, property_id, shares).await
    }

    pub async fn submit(&self, ticket: &TradeTicket) -> Result<TradeConfirmation> {
        self.execute(ticket.side, ticket.property_id(), ticket.shares())
            .await
    }

    /// Whether a trade for the property is awaiting the backend.
    pub fn is_pending(&self, property_id: &str) -> bool {
        self.in_flight.contains(&Self::mutation_key(property_id))
    }

    async fn execute(
        &self,
        side: TradeSide,
        property_id: &str,
        shares: i64,
    ) -> Result<TradeConfirmation> {
        validate_shares(shares)?;
        let _guard = self.in_flight.try_acquire(Self::mutation_key(property_id))?;

        match side {
            TradeSide::Buy => {
                let property = self.properties.get_property(property_id).await?;
                validate_buy(&property, shares)?;
            }
            TradeSide::Sell => {
                let investment = self.portfolio.investment_for_property(property_id).await?;
                validate_sell(investment.as_ref(), shares)?;
            }
        }

        debug!("[Trade] Submitting {} of {} x{}", side, property_id, shares);
        let result = match side {
            TradeSide::Buy => self.gateway.buy(property_id, shares).await,
            TradeSide::Sell => self.gateway.sell(property_id, shares).await,
        };

        let receipt = match result {
            Ok(TradeReceipt { success: false, .. }) => {
                warn!("[Trade] {} of {} reported unsuccessful", side, property_id);
                return Err(Error::Gateway(GatewayError::Rejected(
                    "Transaction failed".to_string(),
                )));
            }
            Ok(receipt) => receipt,
            Err(err) => {
                warn!("[Trade] {} of {} failed: {}", side, property_id, err);
                return Err(err.into());
            }
        };

        self.cache
            .invalidate_many(&QueryKey::affected_by_trade(property_id));
        self.cache.invalidate_where(QueryKey::is_transactions);

        info!(
            "[Trade] {} {} share(s) of {} for {} (transaction {})",
            side, shares, property_id, receipt.total_amount, receipt.transaction_id
        );

        Ok(TradeConfirmation {
            side,
            property_id: property_id.to_string(),
            shares,
            transaction_id: receipt.transaction_id,
            total_amount: receipt.total_amount,
        })
    }
}
