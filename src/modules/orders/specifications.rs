//! Reusable order queries

use crate::core::{EntityId, Include, Specification};
use crate::modules::customers::models::Customer;
use crate::modules::orders::models::{Order, OrderLine, OrderStatus};

/// Loads the customer who placed the order
pub fn customer_include() -> Include<Order> {
    Include::reference::<Customer, _, _>(
        "customer",
        |order: &Order| Some(order.customer_id),
        |order: &mut Order, customer| order.customer = Some(customer),
    )
}

/// Loads the order's lines
pub fn lines_include() -> Include<Order> {
    Include::collection::<OrderLine, _, _>(
        "lines",
        |line: &OrderLine| Some(line.order_id),
        |order: &mut Order, lines| order.lines = lines,
    )
}

pub fn orders_with_status(status: OrderStatus) -> Specification<Order> {
    Specification::with_criteria(move |order: &Order| order.status == status)
}

pub fn paid_orders_with_customer() -> Specification<Order> {
    orders_with_status(OrderStatus::Paid).add_include(customer_include())
}

pub fn orders_of_customer(customer_id: EntityId) -> Specification<Order> {
    Specification::with_criteria(move |order: &Order| order.customer_id == customer_id)
}

/// Single order with its customer and lines
pub fn order_details(id: EntityId) -> Specification<Order> {
    Specification::with_complex_include(
        move |order: &Order| order.id == Some(id),
        |query| query.include(customer_include()).include(lines_include()),
    )
}

/// Lines of one order, in insertion order
pub fn lines_of_order(order_id: EntityId) -> Specification<OrderLine> {
    Specification::with_criteria(move |line: &OrderLine| line.order_id == order_id)
}
