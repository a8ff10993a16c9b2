use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{AppError, Entity, EntityId, Result};
use crate::modules::orders::models::Order;

/// Customer placing orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
    /// Unique across customers
    pub email: String,
    pub created_at: DateTime<Utc>,

    /// Loaded on demand through an include
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orders: Vec<Order>,
}

impl Customer {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: normalize_email(email.into()),
            created_at: Utc::now(),
            orders: Vec::new(),
        }
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = normalize_email(email.into());
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Customer name cannot be empty"));
        }
        if self.name.len() > 200 {
            return Err(AppError::validation("Customer name cannot exceed 200 characters"));
        }
        if !is_plausible_email(&self.email) {
            return Err(AppError::validation(format!("Invalid email address: {}", self.email)));
        }
        Ok(())
    }
}

impl Entity for Customer {
    const TABLE: &'static str = "customers";

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    fn clear_navigations(&mut self) {
        self.orders.clear();
    }
}

/// Emails are stored trimmed and lowercased
fn normalize_email(email: String) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.') && email.len() <= 254
        }
        None => false,
    }
}

/// Request payload for creating or replacing a customer
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerRequest {
    pub name: String,
    pub email: String,
}
