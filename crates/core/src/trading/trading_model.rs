//! Trade ticket and confirmation models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::quantity::QuantityStepper;
use super::trading_validation::{validate_buy, validate_sell};
use crate::errors::ValidationError;
use crate::portfolio::Investment;
use crate::properties::Property;
use crate::utils::format::{format_currency, format_shares};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }

    fn past_tense(&self) -> &'static str {
        match self {
            TradeSide::Buy => "bought",
            TradeSide::Sell => "sold",
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn share_noun(shares: i64) -> &'static str {
    if shares == 1 {
        "share"
    } else {
        "shares"
    }
}

/// Editable state of a buy or sell form for one property.
///
/// The ticket owns a snapshot of the property and the user's position taken
/// when it was opened. The quantity is bounded by what can be traded
/// according to that snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeTicket {
    pub side: TradeSide,
    pub property: Property,
    pub investment: Option<Investment>,
    quantity: QuantityStepper,
}

impl TradeTicket {
    pub fn new(side: TradeSide, property: Property, investment: Option<Investment>) -> Self {
        let max = Self::max_for(side, &property, investment.as_ref());
        Self {
            side,
            property,
            investment,
            quantity: QuantityStepper::new(max),
        }
    }

    fn max_for(side: TradeSide, property: &Property, investment: Option<&Investment>) -> i64 {
        match side {
            TradeSide::Buy => property.available_shares,
            TradeSide::Sell => investment.map(|i| i.shares_owned).unwrap_or(0),
        }
    }

    pub fn property_id(&self) -> &str {
        &self.property.id
    }

    pub fn shares(&self) -> i64 {
        self.quantity.value()
    }

    pub fn max_shares(&self) -> i64 {
        self.quantity.max()
    }

    pub fn increment(&mut self) -> i64 {
        self.quantity.increment()
    }

    pub fn decrement(&mut self) -> i64 {
        self.quantity.decrement()
    }

    pub fn set_shares(&mut self, shares: i64) -> i64 {
        self.quantity.set(shares)
    }

    pub fn set_input(&mut self, input: &str) -> i64 {
        self.quantity.set_from_input(input)
    }

    /// Replaces the snapshot with freshly fetched data and re-clamps the
    /// quantity against it.
    pub fn refresh(&mut self, property: Property, investment: Option<Investment>) {
        let max = Self::max_for(self.side, &property, investment.as_ref());
        self.property = property;
        self.investment = investment;
        self.quantity.set_max(max);
    }

    /// Display estimate only. The amount actually charged or credited comes
    /// back from the backend.
    pub fn estimated_total(&self) -> Decimal {
        Decimal::from(self.shares()) * self.property.share_price
    }

    pub fn validation(&self) -> Result<(), ValidationError> {
        match self.side {
            TradeSide::Buy => validate_buy(&self.property, self.shares()),
            TradeSide::Sell => validate_sell(self.investment.as_ref(), self.shares()),
        }
    }

    pub fn can_submit(&self) -> bool {
        self.validation().is_ok()
    }

    /// Label for the submit control, e.g. "Buy 3 Shares".
    pub fn submit_label(&self) -> String {
        let verb = match self.side {
            TradeSide::Buy => "Buy",
            TradeSide::Sell => "Sell",
        };
        let noun = if self.shares() == 1 { "Share" } else { "Shares" };
        format!("{} {} {}", verb, format_shares(self.shares()), noun)
    }
}

/// Outcome of a completed trade, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeConfirmation {
    pub side: TradeSide,
    pub property_id: String,
    pub shares: i64,
    pub transaction_id: String,
    pub total_amount: Decimal,
}

impl TradeConfirmation {
    pub fn title(&self) -> &'static str {
        match self.side {
            TradeSide::Buy => "Purchase Successful!",
            TradeSide::Sell => "Sale Successful!",
        }
    }

    /// e.g. "You bought 3 shares for $300.00"
    pub fn message(&self) -> String {
        format!(
            "You {} {} {} for {}",
            self.side.past_tense(),
            format_shares(self.shares),
            share_noun(self.shares),
            format_currency(self.total_amount)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fixtures;
    use rust_decimal_macros::dec;

    #[test]
    fn test_buy_ticket_bounds_and_estimate() {
        let property = fixtures::property("prop-1", "Harbour Lofts", dec!(100), 1000, 10);
        let mut ticket = TradeTicket::new(TradeSide::Buy, property, None);
        assert_eq!(ticket.shares(), 1);
        assert_eq!(ticket.max_shares(), 10);

        ticket.set_input("15");
        assert_eq!(ticket.shares(), 10);
        ticket.set_input("3");
        assert_eq!(ticket.estimated_total(), dec!(300));
        assert!(ticket.can_submit());
        assert_eq!(ticket.submit_label(), "Buy 3 Shares");
    }

    #[test]
    fn test_zero_quantity_cannot_submit() {
        let property = fixtures::property("prop-1", "Harbour Lofts", dec!(100), 1000, 10);
        let mut ticket = TradeTicket::new(TradeSide::Buy, property, None);
        ticket.decrement();
        assert_eq!(ticket.shares(), 0);
        assert!(!ticket.can_submit());
        assert_eq!(
            ticket.validation(),
            Err(ValidationError::NonPositiveShares)
        );
    }

    #[test]
    fn test_sell_ticket_without_position() {
        let property = fixtures::property("prop-1", "Harbour Lofts", dec!(100), 1000, 10);
        let ticket = TradeTicket::new(TradeSide::Sell, property, None);
        assert_eq!(ticket.max_shares(), 0);
        assert_eq!(ticket.shares(), 0);
        assert!(!ticket.can_submit());
    }

    #[test]
    fn test_refresh_reclamps_to_new_availability() {
        let property = fixtures::property("prop-1", "Harbour Lofts", dec!(100), 1000, 10);
        let mut ticket = TradeTicket::new(TradeSide::Buy, property.clone(), None);
        ticket.set_shares(8);

        let mut updated = property;
        updated.available_shares = 4;
        ticket.refresh(updated, None);
        assert_eq!(ticket.shares(), 4);
        assert_eq!(ticket.max_shares(), 4);
    }

    #[test]
    fn test_confirmation_message() {
        let confirmation = TradeConfirmation {
            side: TradeSide::Buy,
            property_id: "prop-1".to_string(),
            shares: 3,
            transaction_id: "tx-1".to_string(),
            total_amount: dec!(300),
        };
        assert_eq!(confirmation.title(), "Purchase Successful!");
        assert_eq!(confirmation.message(), "You bought 3 shares for $300.00");

        let single = TradeConfirmation {
            side: TradeSide::Sell,
            shares: 1,
            total_amount: dec!(1250.5),
            ..confirmation
        };
        assert_eq!(single.message(), "You sold 1 share for $1,250.50");
    }
}
