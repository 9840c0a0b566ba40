//! Portfolio module - investments, transactions, summary, and the trade procedures.

mod portfolio_model;
mod portfolio_service;
mod portfolio_traits;

pub use portfolio_model::{
    Investment, PortfolioSummary, TradeReceipt, Transaction, TransactionProperty,
    TransactionStatus, TransactionType, DEFAULT_TRANSACTION_LIMIT,
};
pub use portfolio_service::{PortfolioService, PortfolioServiceTrait};
pub use portfolio_traits::PortfolioGateway;
