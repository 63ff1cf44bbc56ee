use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents a product in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub stock: i64,
    pub price: Decimal,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, stock: i64, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stock,
            price,
        }
    }

    /// Whether `amount` units can be taken out of stock. Negative amounts
    /// credit stock back and always fit.
    pub fn has_stock_for(&self, amount: i64) -> bool {
        self.stock >= amount
    }
}
