//! Property-based tests for trade quantity input and local trade validation.
//!
//! These tests verify that the bounds on share quantities hold across all
//! inputs, using the `proptest` crate for random test case generation.

use proptest::prelude::*;
use propshare_core::backend::fixtures;
use propshare_core::errors::ValidationError;
use propshare_core::trading::{
    parse_quantity, validate_buy, validate_sell, QuantityStepper, TradeSide, TradeTicket,
};
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

#[derive(Debug, Clone)]
enum StepOp {
    Increment,
    Decrement,
    Input(String),
    SetMax(i64),
}

fn arb_step_op() -> impl Strategy<Value = StepOp> {
    prop_oneof![
        Just(StepOp::Increment),
        Just(StepOp::Decrement),
        "[-+]?[0-9a-z ]{0,12}".prop_map(StepOp::Input),
        (-5i64..500).prop_map(StepOp::SetMax),
    ]
}

fn arb_price() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// No sequence of steps, inputs or bound changes leaves `[0, max]`.
    #[test]
    fn prop_stepper_stays_within_bounds(
        initial_max in -5i64..500,
        ops in proptest::collection::vec(arb_step_op(), 0..50),
    ) {
        let mut stepper = QuantityStepper::new(initial_max);
        for op in ops {
            match op {
                StepOp::Increment => { stepper.increment(); }
                StepOp::Decrement => { stepper.decrement(); }
                StepOp::Input(text) => { stepper.set_from_input(&text); }
                StepOp::SetMax(max) => stepper.set_max(max),
            }
            prop_assert!(stepper.max() >= 0);
            prop_assert!(stepper.value() >= 0);
            prop_assert!(stepper.value() <= stepper.max());
        }
    }

    /// Plain digit strings parse to their value.
    #[test]
    fn prop_parse_quantity_reads_digits(n in 0i64..1_000_000_000) {
        prop_assert_eq!(parse_quantity(&n.to_string()), n);
        prop_assert_eq!(parse_quantity(&format!("{}shares", n)), n);
    }

    /// Input without a leading number reads as zero.
    #[test]
    fn prop_parse_quantity_garbage_is_zero(text in "[a-z][a-z0-9]{0,10}") {
        prop_assert_eq!(parse_quantity(&text), 0);
    }

    /// A buy passes local validation exactly when `1 <= shares <= available`.
    #[test]
    fn prop_buy_validation_matches_bounds(
        available in 0i64..10_000,
        shares in -10i64..12_000,
        price in arb_price(),
    ) {
        let property = fixtures::property("prop-1", "Harbour Lofts", price, 10_000, available);
        let result = validate_buy(&property, shares);
        prop_assert_eq!(result.is_ok(), shares >= 1 && shares <= available);
        if shares > available && shares >= 1 {
            prop_assert_eq!(
                result,
                Err(ValidationError::ExceedsAvailable { requested: shares, available })
            );
        }
    }

    /// A sell passes local validation exactly when `1 <= shares <= owned`.
    #[test]
    fn prop_sell_validation_matches_bounds(
        owned in 0i64..10_000,
        shares in -10i64..12_000,
    ) {
        let investment = fixtures::investment("user-1", "prop-1", owned, Decimal::ONE_HUNDRED);
        let result = validate_sell(Some(&investment), shares);
        prop_assert_eq!(result.is_ok(), shares >= 1 && shares <= owned);
    }

    /// The estimate is price times quantity, and any quantity the ticket
    /// holds above zero is submittable.
    #[test]
    fn prop_ticket_estimate_and_submittable(
        available in 1i64..10_000,
        input in 0i64..20_000,
        price in arb_price(),
    ) {
        let property = fixtures::property("prop-1", "Harbour Lofts", price, 10_000, available);
        let mut ticket = TradeTicket::new(TradeSide::Buy, property, None);
        ticket.set_input(&input.to_string());

        prop_assert_eq!(ticket.shares(), input.min(available));
        prop_assert_eq!(ticket.estimated_total(), price * Decimal::from(ticket.shares()));
        prop_assert_eq!(ticket.can_submit(), ticket.shares() >= 1);
    }
}
