use async_trait::async_trait;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::core::entity::{Entity, EntityId, Staged};
use crate::core::error::DataResult;
use crate::core::query::Query;
use crate::core::specification::{Specification, SpecificationEvaluator};
use crate::core::traits::Repository;
use crate::persistence::session::Session;

/// Repository for one entity type, bound to one store session
pub struct GenericRepository<T: Entity> {
    session: Arc<Session>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> GenericRepository<T> {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            _entity: PhantomData,
        }
    }

    /// Materialize `query` and record its results when it tracks.
    async fn run(&self, query: Query<T>) -> DataResult<Vec<T>> {
        let items = query.execute(self.session.as_ref()).await?;
        if query.is_tracking() {
            self.session.track(&items)?;
        }
        Ok(items)
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for GenericRepository<T> {
    async fn add(&self, entity: T) -> DataResult<Staged<T>> {
        let assigned = self.session.stage_insert(&entity)?;
        tracing::debug!(table = T::TABLE, session_id = %self.session.id(), "Staged insert");
        Ok(Staged::new(entity, assigned))
    }

    fn delete(&self, entity: &T) -> DataResult<()> {
        self.session.stage_delete(std::iter::once(entity))
    }

    fn remove_range(&self, entities: &[T]) -> DataResult<()> {
        self.session.stage_delete(entities)?;
        tracing::debug!(table = T::TABLE, count = entities.len(), "Staged range removal");
        Ok(())
    }

    fn update(&self, entity: &T) -> DataResult<()> {
        self.session.stage_update(entity)
    }

    async fn get_by_id(&self, id: EntityId) -> DataResult<Option<T>> {
        self.session.find(id).await
    }

    async fn get_all(&self) -> DataResult<Vec<T>> {
        self.run(Query::new().as_no_tracking()).await
    }

    async fn get_entity_with_spec(&self, spec: &Specification<T>) -> DataResult<Option<T>> {
        let query = SpecificationEvaluator::get_query(Query::new(), spec);
        let first = query.first(self.session.as_ref()).await?;
        if let (true, Some(entity)) = (query.is_tracking(), &first) {
            self.session.track(std::slice::from_ref(entity))?;
        }
        Ok(first)
    }

    async fn get_all_with_spec(&self, spec: &Specification<T>) -> DataResult<Vec<T>> {
        let query = SpecificationEvaluator::get_query(Query::new(), spec).as_no_tracking();
        self.run(query).await
    }
}
