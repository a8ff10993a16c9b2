//! Eager-load instructions
//!
//! An [`Include`] attaches related entities to every item of a query result.
//! Relations are resolved by key: a reference include reads a key on the
//! principal, a collection include reads a foreign key on the dependent.
//! Either can carry a nested query on the related type, which is how
//! multi-hop and filtered loading is expressed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{Query, RecordSource};
use crate::core::entity::{Entity, EntityId};
use crate::core::error::DataResult;

#[async_trait]
trait RelationLoader<T>: Send + Sync {
    async fn load(&self, source: &dyn RecordSource, items: &mut [T]) -> DataResult<()>;
}

/// Instruction to load one relation of `T`
pub struct Include<T> {
    relation: &'static str,
    loader: Arc<dyn RelationLoader<T>>,
}

impl<T: Entity> Include<T> {
    /// Many-to-one relation: `key` reads the related identifier from `T`,
    /// `assign` stores the loaded entity.
    pub fn reference<R, K, A>(relation: &'static str, key: K, assign: A) -> Self
    where
        R: Entity,
        K: Fn(&T) -> Option<EntityId> + Send + Sync + 'static,
        A: Fn(&mut T, R) + Send + Sync + 'static,
    {
        Self::reference_with(relation, key, assign, Query::new())
    }

    /// Reference include whose related entities come from `related`,
    /// including any eager loads declared on it.
    pub fn reference_with<R, K, A>(relation: &'static str, key: K, assign: A, related: Query<R>) -> Self
    where
        R: Entity,
        K: Fn(&T) -> Option<EntityId> + Send + Sync + 'static,
        A: Fn(&mut T, R) + Send + Sync + 'static,
    {
        Self {
            relation,
            loader: Arc::new(ReferenceLoader {
                key: Box::new(key),
                assign: Box::new(assign),
                related,
            }),
        }
    }

    /// One-to-many relation: `foreign_key` reads the principal's identifier
    /// from each related entity, `assign` stores the matching group.
    pub fn collection<R, K, A>(relation: &'static str, foreign_key: K, assign: A) -> Self
    where
        R: Entity,
        K: Fn(&R) -> Option<EntityId> + Send + Sync + 'static,
        A: Fn(&mut T, Vec<R>) + Send + Sync + 'static,
    {
        Self::collection_with(relation, foreign_key, assign, Query::new())
    }

    pub fn collection_with<R, K, A>(
        relation: &'static str,
        foreign_key: K,
        assign: A,
        related: Query<R>,
    ) -> Self
    where
        R: Entity,
        K: Fn(&R) -> Option<EntityId> + Send + Sync + 'static,
        A: Fn(&mut T, Vec<R>) + Send + Sync + 'static,
    {
        Self {
            relation,
            loader: Arc::new(CollectionLoader {
                foreign_key: Box::new(foreign_key),
                assign: Box::new(assign),
                related,
            }),
        }
    }

    pub fn relation(&self) -> &'static str {
        self.relation
    }

    pub(crate) async fn load(&self, source: &dyn RecordSource, items: &mut [T]) -> DataResult<()> {
        tracing::trace!(table = T::TABLE, relation = self.relation, count = items.len(), "Loading relation");
        self.loader.load(source, items).await
    }
}

impl<T> Clone for Include<T> {
    fn clone(&self) -> Self {
        Self {
            relation: self.relation,
            loader: self.loader.clone(),
        }
    }
}

impl<T> fmt::Debug for Include<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Include").field("relation", &self.relation).finish()
    }
}

struct ReferenceLoader<T, R: Entity> {
    key: Box<dyn Fn(&T) -> Option<EntityId> + Send + Sync>,
    assign: Box<dyn Fn(&mut T, R) + Send + Sync>,
    related: Query<R>,
}

#[async_trait]
impl<T: Entity, R: Entity> RelationLoader<T> for ReferenceLoader<T, R> {
    async fn load(&self, source: &dyn RecordSource, items: &mut [T]) -> DataResult<()> {
        if items.iter().all(|item| (self.key)(item).is_none()) {
            return Ok(());
        }

        let related: HashMap<EntityId, R> = self
            .related
            .execute(source)
            .await?
            .into_iter()
            .filter_map(|entity| entity.id().map(|id| (id, entity)))
            .collect();

        for item in items.iter_mut() {
            if let Some(entity) = (self.key)(item).and_then(|id| related.get(&id)) {
                (self.assign)(item, entity.clone());
            }
        }

        Ok(())
    }
}

struct CollectionLoader<T, R: Entity> {
    foreign_key: Box<dyn Fn(&R) -> Option<EntityId> + Send + Sync>,
    assign: Box<dyn Fn(&mut T, Vec<R>) + Send + Sync>,
    related: Query<R>,
}

#[async_trait]
impl<T: Entity, R: Entity> RelationLoader<T> for CollectionLoader<T, R> {
    async fn load(&self, source: &dyn RecordSource, items: &mut [T]) -> DataResult<()> {
        let mut groups: HashMap<EntityId, Vec<R>> = HashMap::new();
        for entity in self.related.execute(source).await? {
            if let Some(principal) = (self.foreign_key)(&entity) {
                groups.entry(principal).or_default().push(entity);
            }
        }

        for item in items.iter_mut() {
            let group = item
                .id()
                .and_then(|id| groups.get(&id).cloned())
                .unwrap_or_default();
            (self.assign)(item, group);
        }

        Ok(())
    }
}
