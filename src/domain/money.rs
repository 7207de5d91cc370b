//! Monetary types for stake and odds representation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary amount represented as a Decimal for precision.
pub type Amount = Decimal;

/// Decimal odds (payout multiplier), e.g. 2.00 pays double the stake.
pub type Odds = Decimal;

/// Round to two decimal places, half away from zero.
///
/// All published odds and recorded payouts use this rounding.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
