//! Crudkit
//!
//! Generic data-access core (repositories, specifications, units of work)
//! and the versioned CRUD API built on it.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;
pub mod persistence;

use std::sync::Arc;

use config::{Config, StoreBackend};
use persistence::{MemoryStore, MySqlStore, Store, UnitOfWorkFactory};

/// Open the configured store and wrap it in a unit-of-work factory
pub async fn build_factory(config: &Config) -> crate::core::Result<UnitOfWorkFactory> {
    let model = modules::model()?;

    let store: Arc<dyn Store> = match config.app.store {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Arc::new(MemoryStore::new(model))
        }
        StoreBackend::Mysql => {
            let pool = config.database.create_pool().await?;
            tracing::info!(
                "Database pool initialized ({} connections)",
                config.database.pool_size
            );
            let store = MySqlStore::new(pool, model);
            store.ensure_schema().await.map_err(crate::core::DataError::from)?;
            Arc::new(store)
        }
    };

    Ok(UnitOfWorkFactory::new(store))
}
