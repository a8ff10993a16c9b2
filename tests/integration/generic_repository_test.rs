/// Generic repository reads and writes through specifications

#[path = "../helpers/mod.rs"]
#[macro_use]
mod helpers;

use crudkit::core::{Entity, Repository, Specification};
use crudkit::modules::customers::specifications::{customer_by_email, customer_with_orders};
use crudkit::modules::customers::Customer;
use crudkit::modules::orders::specifications::{
    customer_include, lines_include, order_details, orders_of_customer, paid_orders_with_customer,
};
use crudkit::modules::orders::{Order, OrderLine, OrderStatus};
use helpers::{memory_factory, TestDataFactory};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_get_by_id_absent_returns_none() {
    let (_store, factory) = memory_factory();
    let uow = factory.begin();
    assert!(uow.repository::<Order>().unwrap().get_by_id(42).await.unwrap().is_none());
}

#[tokio::test]
async fn test_paid_orders_with_customer() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    let grace = TestDataFactory::seed_customer(&factory, "Grace").await;
    let paid_ada = TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Paid, dec!(10)).await;
    TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Pending, dec!(20)).await;
    let paid_grace = TestDataFactory::seed_order(&factory, grace.id.unwrap(), OrderStatus::Paid, dec!(30)).await;

    let uow = factory.begin();
    let orders = uow
        .repository::<Order>()
        .unwrap()
        .get_all_with_spec(&paid_orders_with_customer())
        .await
        .unwrap();

    let ids: Vec<_> = orders.iter().map(|order| order.id).collect();
    assert_eq!(ids, vec![paid_ada.id, paid_grace.id]);
    assert_eq!(orders[0].customer.as_ref().unwrap().name, "Ada");
    assert_eq!(orders[1].customer.as_ref().unwrap().name, "Grace");
    assert!(orders.iter().all(|order| order.lines.is_empty()));
}

#[tokio::test]
async fn test_no_match_returns_empty_list_and_none() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Pending, dec!(1)).await;

    let uow = factory.begin();
    let repository = uow.repository::<Order>().unwrap();
    assert!(repository
        .get_all_with_spec(&paid_orders_with_customer())
        .await
        .unwrap()
        .is_empty());
    assert!(repository
        .get_entity_with_spec(&order_details(999))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_order_details_loads_customer_and_lines() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    let order = TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Pending, dec!(7)).await;
    TestDataFactory::seed_line(&factory, order.id.unwrap(), "Pen", 2, dec!(1.50)).await;
    TestDataFactory::seed_line(&factory, order.id.unwrap(), "Ink", 1, dec!(4.00)).await;

    let uow = factory.begin();
    let loaded = uow
        .repository::<Order>()
        .unwrap()
        .get_entity_with_spec(&order_details(order.id.unwrap()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(loaded.customer.unwrap().id, ada.id);
    let products: Vec<_> = loaded.lines.iter().map(|line| line.product.as_str()).collect();
    assert_eq!(products, vec!["Pen", "Ink"]);
}

#[tokio::test]
async fn test_two_hop_include_loads_orders_and_lines() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    let first = TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Paid, dec!(3)).await;
    TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Pending, dec!(0)).await;
    TestDataFactory::seed_line(&factory, first.id.unwrap(), "Pen", 2, dec!(1.50)).await;

    let uow = factory.begin();
    let customer = uow
        .repository::<Customer>()
        .unwrap()
        .get_entity_with_spec(&customer_with_orders(ada.id.unwrap()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(customer.orders.len(), 2);
    assert_eq!(customer.orders[0].lines.len(), 1);
    assert!(customer.orders[1].lines.is_empty());
}

#[tokio::test]
async fn test_multiple_includes_all_load() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    let order = TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Paid, dec!(3)).await;
    TestDataFactory::seed_line(&factory, order.id.unwrap(), "Pen", 2, dec!(1.50)).await;

    let spec = Specification::new()
        .add_include(lines_include())
        .add_include(customer_include());

    let uow = factory.begin();
    let orders = uow.repository::<Order>().unwrap().get_all_with_spec(&spec).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert!(orders[0].customer.is_some());
    assert_eq!(orders[0].lines.len(), 1);
}

#[tokio::test]
async fn test_remove_range_deletes_all_on_complete() {
    let (store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    let order = TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Pending, dec!(0)).await;
    for product in ["A", "B", "C"] {
        TestDataFactory::seed_line(&factory, order.id.unwrap(), product, 1, dec!(1)).await;
    }

    let uow = factory.begin();
    let lines = uow.repository::<OrderLine>().unwrap();
    let all = lines.get_all().await.unwrap();
    lines.remove_range(&all).unwrap();
    assert_eq!(store.row_count(OrderLine::TABLE).await, 3);

    assert_eq!(uow.complete().await.unwrap(), 3);
    assert_eq!(store.row_count(OrderLine::TABLE).await, 0);
}

#[tokio::test]
async fn test_remove_range_with_unsaved_entity_stages_nothing() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    let order = TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Pending, dec!(0)).await;
    let saved = TestDataFactory::seed_line(&factory, order.id.unwrap(), "A", 1, dec!(1)).await;
    let unsaved = OrderLine::new(order.id.unwrap(), "B", 1, dec!(1));

    let uow = factory.begin();
    assert!(uow.repository::<OrderLine>().unwrap().remove_range(&[saved, unsaved]).is_err());
    assert_eq!(uow.pending_changes(), 0);
}

#[tokio::test]
async fn test_list_reads_are_untracked_and_single_reads_tracked() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Paid, dec!(1)).await;
    TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Paid, dec!(2)).await;

    let uow = factory.begin();
    let repository = uow.repository::<Order>().unwrap();
    repository.get_all().await.unwrap();
    repository.get_all_with_spec(&orders_of_customer(ada.id.unwrap())).await.unwrap();
    assert_eq!(uow.tracked_entities(), 0);

    repository
        .get_entity_with_spec(&orders_of_customer(ada.id.unwrap()))
        .await
        .unwrap();
    assert_eq!(uow.tracked_entities(), 1);
}

#[tokio::test]
async fn test_update_writes_full_row_without_navigations() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;
    TestDataFactory::seed_order(&factory, ada.id.unwrap(), OrderStatus::Paid, dec!(1)).await;

    let uow = factory.begin();
    let repository = uow.repository::<Customer>().unwrap();
    let mut loaded = repository
        .get_entity_with_spec(&customer_with_orders(ada.id.unwrap()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.orders.len(), 1);

    loaded.name = "Ada King".to_string();
    repository.update(&loaded).unwrap();
    uow.complete().await.unwrap();

    let reread = repository.get_by_id(ada.id.unwrap()).await.unwrap().unwrap();
    assert_eq!(reread.name, "Ada King");
    assert!(reread.orders.is_empty());
}

#[tokio::test]
async fn test_email_lookup_is_case_insensitive() {
    let (_store, factory) = memory_factory();
    let ada = TestDataFactory::seed_customer(&factory, "Ada").await;

    let uow = factory.begin();
    let found = uow
        .repository::<Customer>()
        .unwrap()
        .get_entity_with_spec(&customer_by_email(ada.email.to_uppercase()))
        .await
        .unwrap();
    assert_eq!(found.map(|customer| customer.id), Some(ada.id));
}
