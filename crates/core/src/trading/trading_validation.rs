//! Local pre-submission checks for trades.
//!
//! These mirror the backend's checks so that obviously invalid requests are
//! never sent. Passing them does not guarantee the backend accepts the trade.

use crate::errors::ValidationError;
use crate::portfolio::Investment;
use crate::properties::Property;

pub fn validate_shares(shares: i64) -> Result<(), ValidationError> {
    if shares <= 0 {
        return Err(ValidationError::NonPositiveShares);
    }
    Ok(())
}

/// Buy requires `1 <= shares <= available_shares` on an active property.
pub fn validate_buy(property: &Property, shares: i64) -> Result<(), ValidationError> {
    validate_shares(shares)?;
    if !property.is_active() {
        return Err(ValidationError::PropertyNotActive(
            property.status.to_string(),
        ));
    }
    if shares > property.available_shares {
        return Err(ValidationError::ExceedsAvailable {
            requested: shares,
            available: property.available_shares,
        });
    }
    Ok(())
}

/// Sell requires an existing position with `1 <= shares <= shares_owned`.
pub fn validate_sell(investment: Option<&Investment>, shares: i64) -> Result<(), ValidationError> {
    validate_shares(shares)?;
    let investment = investment
        .filter(|i| i.shares_owned > 0)
        .ok_or(ValidationError::NoInvestment)?;
    if shares > investment.shares_owned {
        return Err(ValidationError::ExceedsOwned {
            requested: shares,
            owned: investment.shares_owned,
        });
    }
    Ok(())
}
