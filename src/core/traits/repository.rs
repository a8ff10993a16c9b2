use async_trait::async_trait;

use crate::core::entity::{Entity, EntityId, Staged};
use crate::core::error::DataResult;
use crate::core::specification::Specification;

/// Base repository trait for CRUD and specification-driven reads
///
/// Writes only stage changes on the owning session; nothing is durable until
/// the unit of work completes. Reads go to the store.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Stage a new entity for insertion
    async fn add(&self, entity: T) -> DataResult<Staged<T>>;

    /// Stage an entity for removal
    fn delete(&self, entity: &T) -> DataResult<()>;

    /// Stage several entities for removal in one call
    fn remove_range(&self, entities: &[T]) -> DataResult<()>;

    /// Stage the entity's current values as a full replacement of the stored row
    fn update(&self, entity: &T) -> DataResult<()>;

    /// Find entity by ID, `None` when no row matches
    async fn get_by_id(&self, id: EntityId) -> DataResult<Option<T>>;

    /// List all entities, untracked
    async fn get_all(&self) -> DataResult<Vec<T>>;

    /// First entity matching the specification
    async fn get_entity_with_spec(&self, spec: &Specification<T>) -> DataResult<Option<T>>;

    /// All entities matching the specification, untracked
    async fn get_all_with_spec(&self, spec: &Specification<T>) -> DataResult<Vec<T>>;
}
