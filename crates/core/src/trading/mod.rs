//! Trading module - trade tickets, local validation, and the trade workflow.

pub mod quantity;
mod trading_model;
mod trading_validation;
mod trading_view_model;


pub use quantity::{parse_quantity, QuantityStepper};
pub use trading_model::{TradeConfirmation, TradeSide, TradeTicket};
pub use trading_validation::{validate_buy, validate_sell, validate_shares};
pub use trading_view_model::TradeViewModel;
