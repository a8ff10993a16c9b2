use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::order_line::OrderLine;
use crate::core::money::validate_amount;
use crate::core::{AppError, Entity, EntityId, Result};
use crate::modules::customers::models::Customer;

/// Order status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Order placed, payment outstanding
    #[serde(rename = "pending")]
    Pending,

    /// Payment received
    #[serde(rename = "paid")]
    Paid,

    /// Handed over to the carrier
    #[serde(rename = "shipped")]
    Shipped,

    /// Cancelled before shipping
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Paid => write!(f, "paid"),
            OrderStatus::Shipped => write!(f, "shipped"),
            OrderStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "shipped" => Ok(OrderStatus::Shipped),
            "cancelled" => Ok(OrderStatus::Cancelled),
            _ => Err(format!("Invalid order status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub customer_id: EntityId,
    #[serde(default)]
    pub status: OrderStatus,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn new(customer_id: EntityId, total: Decimal) -> Self {
        Self {
            id: None,
            customer_id,
            status: OrderStatus::Pending,
            total,
            placed_at: Utc::now(),
            customer: None,
            lines: Vec::new(),
        }
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.customer_id <= 0 {
            return Err(AppError::validation("Order must reference a customer"));
        }
        validate_amount("total", self.total)
    }

    /// Cancelled and shipped orders no longer accept changes.
    pub fn is_editable(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Paid)
    }
}

impl Entity for Order {
    const TABLE: &'static str = "orders";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn clear_navigations(&mut self) {
        self.customer = None;
        self.lines.clear();
    }
}

/// Request payload for creating an order
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: EntityId,
    pub total: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
}

/// Request payload for replacing an order's mutable fields
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderRequest {
    pub status: OrderStatus,
    pub total: Decimal,
}
