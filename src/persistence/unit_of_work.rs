//! Unit of work
//!
//! One unit of work wraps one store session. Repositories requested from it
//! share that session, so a single [`UnitOfWork::complete`] commits
//! everything they staged. Lifecycle: created, active until disposed. The
//! session is released exactly once: by [`UnitOfWork::dispose`], at the end
//! of [`UnitOfWorkFactory::scope`], or on drop.

use futures_util::future::BoxFuture;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

use crate::core::entity::Entity;
use crate::core::error::DataResult;
use crate::persistence::repository::GenericRepository;
use crate::persistence::session::Session;
use crate::persistence::store::Store;

pub struct UnitOfWork {
    session: Arc<Session>,
    repositories: Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl UnitOfWork {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            session: Arc::new(Session::open(store)),
            repositories: Mutex::new(HashMap::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.session.id()
    }

    /// Repository for `T`, created on first request and cached for the
    /// lifetime of this unit of work.
    pub fn repository<T: Entity>(&self) -> DataResult<Arc<GenericRepository<T>>> {
        self.session.ensure_active()?;
        self.session.ensure_mapped(T::TABLE)?;

        let mut repositories = self.repositories.lock().unwrap_or_else(PoisonError::into_inner);
        let entry = repositories.entry(TypeId::of::<T>()).or_insert_with(|| {
            tracing::debug!(unit_of_work = %self.session.id(), table = T::TABLE, "Creating repository");
            let repository: Arc<dyn Any + Send + Sync> =
                Arc::new(GenericRepository::<T>::new(self.session.clone()));
            repository
        });

        // Entries are keyed by the TypeId of the repository's entity type
        match entry.clone().downcast::<GenericRepository<T>>() {
            Ok(repository) => Ok(repository),
            Err(_) => unreachable!("repository cache entry does not match its type key"),
        }
    }

    /// Commit every change staged through this unit of work as one transaction.
    ///
    /// Returns the number of affected rows; 0 when nothing was staged.
    pub async fn complete(&self) -> DataResult<u64> {
        self.session.save_changes().await
    }

    pub fn pending_changes(&self) -> usize {
        self.session.pending_count()
    }

    pub fn tracked_entities(&self) -> usize {
        self.session.tracked_count()
    }

    /// Release the store session. Staged changes that were not completed are
    /// discarded and repositories obtained from this unit of work stop working.
    pub fn dispose(self) {
        self.session.dispose();
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if !self.session.is_disposed() {
            self.session.dispose();
        }
    }
}

/// Opens units of work against a shared store
#[derive(Clone)]
pub struct UnitOfWorkFactory {
    store: Arc<dyn Store>,
}

impl UnitOfWorkFactory {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    pub fn begin(&self) -> UnitOfWork {
        UnitOfWork::new(self.store.clone())
    }

    /// Run `work` inside a fresh unit of work and dispose it afterwards,
    /// whether `work` succeeded or not.
    pub async fn scope<R, E, F>(&self, work: F) -> Result<R, E>
    where
        F: for<'u> FnOnce(&'u UnitOfWork) -> BoxFuture<'u, Result<R, E>>,
    {
        let unit_of_work = self.begin();
        let result = work(&unit_of_work).await;
        unit_of_work.dispose();
        result
    }
}
