use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_money;

/// Running aggregate over finished orders.
///
/// Forms a monoid under [`Statistics::combine`] with [`Statistics::default`]
/// as identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub completed_orders: i64,
    pub rejected_orders: i64,
    pub reversed_orders: i64,
    pub revenue: Decimal,
}

impl Statistics {
    /// Component-wise sum. Revenue is rounded to cents after the addition.
    ///
    /// Every component saturates at its numeric bounds instead of overflowing.
    pub fn combine(self, other: Statistics) -> Statistics {
        Statistics {
            completed_orders: self.completed_orders.saturating_add(other.completed_orders),
            rejected_orders: self.rejected_orders.saturating_add(other.rejected_orders),
            reversed_orders: self.reversed_orders.saturating_add(other.reversed_orders),
            revenue: round_money(self.revenue.saturating_add(other.revenue)),
        }
    }
}
