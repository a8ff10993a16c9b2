/// Unit of work behavior against the in-memory store
///
/// Covers repository identity, atomic commits, misuse after dispose and
/// store failures surfacing unchanged.

#[path = "../helpers/mod.rs"]
#[macro_use]
mod helpers;

use std::sync::Arc;

use crudkit::core::{DataError, Entity, Repository, StoreError};
use crudkit::modules::customers::Customer;
use crudkit::modules::orders::{Order, OrderLine, OrderStatus};
use crudkit::persistence::{MemoryStore, Model, UnitOfWork, UnitOfWorkFactory};
use futures_util::FutureExt;
use helpers::{memory_factory, TestDataFactory};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_repository_is_cached_per_unit_of_work() {
    let (_store, factory) = memory_factory();

    let uow = factory.begin();
    let first = uow.repository::<Order>().unwrap();
    let second = uow.repository::<Order>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let other = factory.begin();
    let foreign = other.repository::<Order>().unwrap();
    assert!(!Arc::ptr_eq(&first, &foreign));
}

#[tokio::test]
async fn test_complete_without_changes_returns_zero() {
    let (_store, factory) = memory_factory();
    let uow = factory.begin();
    assert_eq!(uow.complete().await.unwrap(), 0);
}

#[tokio::test]
async fn test_added_entity_is_readable_after_complete() {
    let (store, factory) = memory_factory();

    let uow = factory.begin();
    let repository = uow.repository::<Customer>().unwrap();
    let staged = repository
        .add(Customer::new("Ada Lovelace", "ada@example.com"))
        .await
        .unwrap();
    assert!(!staged.is_persisted());
    assert_eq!(store.row_count(Customer::TABLE).await, 0);

    assert_eq!(uow.complete().await.unwrap(), 1);
    let id = staged.id().expect("id assigned on commit");

    let stored = repository.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored, staged.entity());
}

#[tokio::test]
async fn test_changes_from_several_repositories_commit_together() {
    let (store, factory) = memory_factory();
    let customer = TestDataFactory::seed_customer(&factory, "Ada").await;
    let order = TestDataFactory::seed_order(&factory, customer.id.unwrap(), OrderStatus::Pending, dec!(0)).await;

    let uow = factory.begin();
    let mut updated = order.clone();
    updated.total = dec!(7.00);
    uow.repository::<OrderLine>()
        .unwrap()
        .add(OrderLine::new(order.id.unwrap(), "Pen", 2, dec!(3.50)))
        .await
        .unwrap();
    uow.repository::<Order>().unwrap().update(&updated).unwrap();

    assert_eq!(uow.pending_changes(), 2);
    assert_eq!(uow.complete().await.unwrap(), 2);
    assert_eq!(uow.pending_changes(), 0);
    assert_eq!(store.row_count(OrderLine::TABLE).await, 1);
}

#[tokio::test]
async fn test_failed_commit_persists_nothing() {
    let (store, factory) = memory_factory();
    let customer = TestDataFactory::seed_customer(&factory, "Ada").await;

    let uow = factory.begin();
    uow.repository::<Order>()
        .unwrap()
        .add(Order::new(customer.id.unwrap(), dec!(10)))
        .await
        .unwrap();
    // Row 999 does not exist, so the whole batch is rejected
    let mut ghost = Order::new(customer.id.unwrap(), dec!(1));
    ghost.id = Some(999);
    uow.repository::<Order>().unwrap().update(&ghost).unwrap();

    let err = uow.complete().await.unwrap_err();
    assert!(matches!(
        err,
        DataError::Store(StoreError::ConcurrencyConflict { id: 999, .. })
    ));
    assert_eq!(store.row_count(Order::TABLE).await, 0);
    // Nothing was discarded; the caller decides what to do next
    assert_eq!(uow.pending_changes(), 2);
}

#[tokio::test]
async fn test_unique_violation_rejects_batch() {
    let (store, factory) = memory_factory();
    let existing = TestDataFactory::seed_customer(&factory, "Ada").await;

    let uow = factory.begin();
    let repository = uow.repository::<Customer>().unwrap();
    repository
        .add(Customer::new("Fresh", TestDataFactory::random_email()))
        .await
        .unwrap();
    repository
        .add(Customer::new("Duplicate", existing.email.clone()))
        .await
        .unwrap();

    let err = uow.complete().await.unwrap_err();
    match err {
        DataError::Store(store_err) => assert!(store_err.is_constraint_violation()),
        other => panic!("expected a store error, got {:?}", other),
    }
    assert_eq!(store.row_count(Customer::TABLE).await, 1);
}

#[tokio::test]
async fn test_repository_unusable_after_dispose() {
    let (_store, factory) = memory_factory();

    let uow = factory.begin();
    let repository = uow.repository::<Customer>().unwrap();
    let uow_id = uow.id();
    uow.dispose();

    let err = repository.get_all().await.unwrap_err();
    assert!(matches!(err, DataError::Disposed(id) if id == uow_id));
    assert!(err.is_misuse());
    assert!(repository.update(&Customer::new("Late", "late@example.com")).is_err());
}

#[tokio::test]
async fn test_dispose_discards_staged_changes() {
    let (store, factory) = memory_factory();

    let uow = factory.begin();
    uow.repository::<Customer>()
        .unwrap()
        .add(Customer::new("Never", "never@example.com"))
        .await
        .unwrap();
    drop(uow);

    assert_eq!(store.row_count(Customer::TABLE).await, 0);
}

#[tokio::test]
async fn test_unmapped_entity_is_rejected() {
    let store = Arc::new(MemoryStore::new(
        Model::builder().entity::<Customer>().build().unwrap(),
    ));
    let uow = UnitOfWork::new(store);

    assert!(uow.repository::<Customer>().is_ok());
    let err = uow.repository::<Order>().err().unwrap();
    assert!(matches!(err, DataError::Unmapped("orders")));
}

#[tokio::test]
async fn test_update_without_id_is_misuse() {
    let (_store, factory) = memory_factory();
    let uow = factory.begin();

    let err = uow
        .repository::<Customer>()
        .unwrap()
        .update(&Customer::new("Nobody", "nobody@example.com"))
        .unwrap_err();
    assert!(matches!(err, DataError::MissingKey("customers")));
    assert_eq!(uow.pending_changes(), 0);
}

#[tokio::test]
async fn test_store_outage_surfaces_unchanged() {
    let (store, factory) = memory_factory();
    store.set_offline(true);

    let uow = factory.begin();
    let err = uow.repository::<Customer>().unwrap().get_all().await.unwrap_err();
    assert!(matches!(err, DataError::Store(StoreError::Unavailable(_))));
    assert!(!err.is_misuse());
}

#[tokio::test]
async fn test_scope_disposes_after_work() {
    let (store, factory) = memory_factory();

    let count = factory
        .scope(|uow| {
            async move {
                uow.repository::<Customer>()?
                    .add(Customer::new("Scoped", "scoped@example.com"))
                    .await?;
                uow.complete().await
            }
            .boxed()
        })
        .await
        .unwrap();
    assert_eq!(count, 1);

    let failed: Result<u64, DataError> = factory
        .scope(|uow| {
            async move {
                uow.repository::<Customer>()?
                    .add(Customer::new("Dropped", "dropped@example.com"))
                    .await?;
                Err(DataError::MissingKey("customers"))
            }
            .boxed()
        })
        .await;
    assert!(failed.is_err());
    assert_eq!(store.row_count(Customer::TABLE).await, 1);
}

#[tokio::test]
async fn test_factory_shares_store() {
    let (_store, factory) = memory_factory();
    let clone: UnitOfWorkFactory = factory.clone();
    TestDataFactory::seed_customer(&factory, "Ada").await;

    let uow = clone.begin();
    assert_eq!(uow.repository::<Customer>().unwrap().get_all().await.unwrap().len(), 1);
}
