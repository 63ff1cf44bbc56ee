//! Business domain types. Pure data with no channel or task concerns.

pub mod order;
pub mod product;
pub mod statistics;

pub use order::*;
pub use product::*;
pub use statistics::*;

use rust_decimal::{Decimal, RoundingStrategy};

/// Money values are kept to cents.
pub const DECIMAL_PLACES: u32 = 2;

/// Round a money value to [`DECIMAL_PLACES`], halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
