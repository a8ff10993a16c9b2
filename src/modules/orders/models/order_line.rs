use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::money::validate_amount;
use crate::core::{AppError, Entity, EntityId, Result};

/// Product line of an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub order_id: EntityId,
    pub product: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn new(order_id: EntityId, product: impl Into<String>, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            id: None,
            order_id,
            product: product.into(),
            quantity,
            unit_price,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn validate(&self) -> Result<()> {
        if self.product.trim().is_empty() {
            return Err(AppError::validation("Product cannot be empty"));
        }
        if self.quantity == 0 {
            return Err(AppError::validation("Quantity must be at least 1"));
        }
        validate_amount("unit_price", self.unit_price)?;
        validate_amount("subtotal", self.subtotal())
    }
}

impl Entity for OrderLine {
    const TABLE: &'static str = "order_lines";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }
}

/// Request payload for adding a line to an order
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderLineRequest {
    pub product: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}
