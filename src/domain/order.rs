use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::OrderError;

/// A single line of a purchase request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub product_id: String,
    pub amount: i64,
}

impl Item {
    pub fn new(product_id: impl Into<String>, amount: i64) -> Self {
        Self {
            product_id: product_id.into(),
            amount,
        }
    }
}

/// Lifecycle of an order.
///
/// ```text
/// Created -> Pending -> Completed | Rejected
/// Completed -> ReversalRequested -> Reversed | Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Created,
    Pending,
    Completed,
    Rejected,
    ReversalRequested,
    Reversed,
}

impl OrderStatus {
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Created, Pending)
                | (Pending, Completed)
                | (Pending, Rejected)
                | (Completed, ReversalRequested)
                | (ReversalRequested, Reversed)
                | (ReversalRequested, Rejected)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Created => "Created",
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Rejected => "Rejected",
            OrderStatus::ReversalRequested => "ReversalRequested",
            OrderStatus::Reversed => "Reversed",
        };
        f.write_str(name)
    }
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub item: Item,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Order {
    /// Creates a new order with a fresh id and status `Created`.
    pub fn new(item: Item) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            item,
            status: OrderStatus::Created,
            total: None,
            error: None,
        }
    }

    pub fn is_reversal(&self) -> bool {
        self.status == OrderStatus::ReversalRequested
    }

    /// Moves the order to `next`, refusing any edge outside the state machine.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidState {
                order_id: self.id.clone(),
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Marks the order as rejected and records why.
    pub fn reject(&mut self, reason: impl Into<String>) -> Result<(), OrderError> {
        self.transition(OrderStatus::Rejected)?;
        self.error = Some(reason.into());
        Ok(())
    }

    /// Finishes a successfully processed order: `Completed` for a fresh
    /// order, `Reversed` for a reversal.
    pub fn complete(&mut self, total: Decimal) -> Result<(), OrderError> {
        let next = if self.is_reversal() {
            OrderStatus::Reversed
        } else {
            OrderStatus::Completed
        };
        self.transition(next)?;
        self.total = Some(total);
        Ok(())
    }
}
