// Test data factory
//
// Seeds customers, orders and lines through a unit of work so fixtures go
// through the same write path as production code.

use crudkit::core::Repository;
use crudkit::modules::customers::Customer;
use crudkit::modules::orders::{Order, OrderLine, OrderStatus};
use crudkit::persistence::UnitOfWorkFactory;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

pub struct TestDataFactory;

impl TestDataFactory {
    /// Unique e-mail so fixtures never collide on the unique index
    pub fn random_email() -> String {
        format!("test-{}@example.com", Uuid::new_v4().simple())
    }

    pub fn customer_payload() -> Value {
        json!({
            "name": "Test Customer",
            "email": Self::random_email(),
        })
    }

    pub fn order_payload(customer_id: i64) -> Value {
        json!({
            "customer_id": customer_id,
            "total": "125.50",
        })
    }

    pub async fn seed_customer(factory: &UnitOfWorkFactory, name: &str) -> Customer {
        let uow = factory.begin();
        let staged = uow
            .repository::<Customer>()
            .unwrap()
            .add(Customer::new(name, Self::random_email()))
            .await
            .unwrap();
        uow.complete().await.unwrap();
        staged.into_inner()
    }

    pub async fn seed_order(
        factory: &UnitOfWorkFactory,
        customer_id: i64,
        status: OrderStatus,
        total: Decimal,
    ) -> Order {
        let uow = factory.begin();
        let staged = uow
            .repository::<Order>()
            .unwrap()
            .add(Order::new(customer_id, total).with_status(status))
            .await
            .unwrap();
        uow.complete().await.unwrap();
        staged.into_inner()
    }

    pub async fn seed_line(
        factory: &UnitOfWorkFactory,
        order_id: i64,
        product: &str,
        quantity: u32,
        unit_price: Decimal,
    ) -> OrderLine {
        let uow = factory.begin();
        let staged = uow
            .repository::<OrderLine>()
            .unwrap()
            .add(OrderLine::new(order_id, product, quantity, unit_price))
            .await
            .unwrap();
        uow.complete().await.unwrap();
        staged.into_inner()
    }
}
