pub mod format;
pub mod in_flight;

pub use format::{format_currency, format_percent, format_shares, format_signed_currency};
pub use in_flight::{InFlightGuard, InFlightSet};
