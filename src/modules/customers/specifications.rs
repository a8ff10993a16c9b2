//! Reusable customer queries

use crate::core::{EntityId, Include, Query, Specification};
use crate::modules::customers::models::Customer;
use crate::modules::orders::models::Order;
use crate::modules::orders::specifications::lines_include;

/// Loads the customer's orders together with each order's lines
pub fn orders_with_lines_include() -> Include<Customer> {
    Include::collection_with::<Order, _, _>(
        "orders",
        |order: &Order| Some(order.customer_id),
        |customer: &mut Customer, orders| customer.orders = orders,
        Query::new().include(lines_include()),
    )
}

pub fn customer_by_email(email: impl Into<String>) -> Specification<Customer> {
    let email = email.into().trim().to_lowercase();
    Specification::with_criteria(move |customer: &Customer| customer.email.to_lowercase() == email)
}

/// Single customer with orders and order lines (two hops)
pub fn customer_with_orders(id: EntityId) -> Specification<Customer> {
    Specification::with_complex_include(
        move |customer: &Customer| customer.id == Some(id),
        |query| query.include(orders_with_lines_include()),
    )
}
