//! Persisted entity capability and the store's row representation.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// Store-assigned unique identifier
pub type EntityId = i64;

/// Capability every persisted domain object implements
///
/// Entities are stored as JSON documents keyed by their identifier. The
/// identifier is assigned by the store when the insert that created the
/// entity is committed.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Table the entity type is mapped to
    const TABLE: &'static str;

    fn id(&self) -> Option<EntityId>;

    fn set_id(&mut self, id: EntityId);

    /// Reset navigation properties so eagerly loaded relations are never
    /// written back as part of this entity's document.
    fn clear_navigations(&mut self) {}
}

/// One persisted row: identifier plus JSON document
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: EntityId,
    pub document: Value,
}

impl Record {
    pub fn new(id: EntityId, document: Value) -> Self {
        Self { id, document }
    }

    /// Deserialize the document and restore the row identifier.
    pub fn into_entity<T: Entity>(self) -> Result<T, serde_json::Error> {
        let mut entity: T = serde_json::from_value(self.document)?;
        entity.set_id(self.id);
        Ok(entity)
    }
}

/// Serialize an entity into the document stored for it.
///
/// Navigation properties and the `id` key are stripped: the identifier lives
/// in its own column.
pub fn to_document<T: Entity>(entity: &T) -> Result<Value, serde_json::Error> {
    let mut detached = entity.clone();
    detached.clear_navigations();

    let mut document = serde_json::to_value(&detached)?;
    if let Value::Object(fields) = &mut document {
        fields.remove("id");
    }
    Ok(document)
}

/// Entity staged for insertion
///
/// The identifier becomes visible once the unit of work that staged the
/// insert commits successfully.
#[derive(Debug, Clone)]
pub struct Staged<T: Entity> {
    entity: T,
    assigned: Arc<OnceLock<EntityId>>,
}

impl<T: Entity> Staged<T> {
    pub(crate) fn new(entity: T, assigned: Arc<OnceLock<EntityId>>) -> Self {
        Self { entity, assigned }
    }

    /// Store-assigned identifier, `None` until committed
    pub fn id(&self) -> Option<EntityId> {
        self.assigned.get().copied()
    }

    pub fn is_persisted(&self) -> bool {
        self.assigned.get().is_some()
    }

    /// Entity with its generated identifier applied (when committed).
    pub fn entity(&self) -> T {
        let mut entity = self.entity.clone();
        if let Some(id) = self.assigned.get() {
            entity.set_id(*id);
        }
        entity
    }

    pub fn into_inner(self) -> T {
        let mut entity = self.entity;
        if let Some(id) = self.assigned.get() {
            entity.set_id(*id);
        }
        entity
    }
}
