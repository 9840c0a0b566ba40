use async_trait::async_trait;
use std::sync::Arc;

use super::portfolio_model::{Investment, PortfolioSummary, Transaction};
use super::portfolio_traits::PortfolioGateway;
use crate::cache::{unexpected_value, QueryKey, QueryValue, ReadModelCache};
use crate::errors::Result;

/// Cached reads of the signed-in user's portfolio.
#[async_trait]
pub trait PortfolioServiceTrait: Send + Sync {
    async fn investment_for_property(&self, property_id: &str) -> Result<Option<Investment>>;

    async fn investments(&self) -> Result<Vec<Investment>>;

    async fn transactions(&self, limit: usize) -> Result<Vec<Transaction>>;

    async fn summary(&self) -> Result<PortfolioSummary>;
}

pub struct PortfolioService {
    gateway: Arc<dyn PortfolioGateway>,
    cache: Arc<ReadModelCache>,
}

impl PortfolioService {
    pub fn new(gateway: Arc<dyn PortfolioGateway>, cache: Arc<ReadModelCache>) -> Self {
        Self { gateway, cache }
    }
}

#[async_trait]
impl PortfolioServiceTrait for PortfolioService {
    async fn investment_for_property(&self, property_id: &str) -> Result<Option<Investment>> {
        let key = QueryKey::InvestmentForProperty(property_id.to_string());
        let gateway = self.gateway.clone();
        let property_id = property_id.to_string();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                let property_id = property_id.clone();
                async move {
                    gateway
                        .get_investment_for_property(&property_id)
                        .await
                        .map(QueryValue::Investment)
                }
            })
            .await?;
        match value {
            QueryValue::Investment(investment) => Ok(investment),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn investments(&self) -> Result<Vec<Investment>> {
        let key = QueryKey::Investments;
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move { gateway.get_investments().await.map(QueryValue::Investments) }
            })
            .await?;
        match value {
            QueryValue::Investments(investments) => Ok(investments),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn transactions(&self, limit: usize) -> Result<Vec<Transaction>> {
        let key = QueryKey::Transactions(limit);
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move {
                    gateway
                        .get_transactions(limit)
                        .await
                        .map(QueryValue::Transactions)
                }
            })
            .await?;
        match value {
            QueryValue::Transactions(transactions) => Ok(transactions),
            _ => Err(unexpected_value(&key)),
        }
    }

    async fn summary(&self) -> Result<PortfolioSummary> {
        let key = QueryKey::PortfolioSummary;
        let gateway = self.gateway.clone();
        let value = self
            .cache
            .fetch(key.clone(), move || {
                let gateway = gateway.clone();
                async move {
                    gateway
                        .get_portfolio_summary()
                        .await
                        .map(QueryValue::PortfolioSummary)
                }
            })
            .await?;
        match value {
            QueryValue::PortfolioSummary(summary) => Ok(summary),
            _ => Err(unexpected_value(&key)),
        }
    }
}
