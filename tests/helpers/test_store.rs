// Store fixtures

use std::sync::Arc;

use crudkit::persistence::{MemoryStore, UnitOfWorkFactory};

/// Empty in-memory store mapped with the API's model
pub fn memory_store() -> Arc<MemoryStore> {
    let model = crudkit::modules::model().expect("API model is valid");
    Arc::new(MemoryStore::new(model))
}

/// Factory plus the concrete store, for tests that inspect or break it
pub fn memory_factory() -> (Arc<MemoryStore>, UnitOfWorkFactory) {
    let store = memory_store();
    let factory = UnitOfWorkFactory::new(store.clone());
    (store, factory)
}
