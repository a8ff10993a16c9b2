//! Persisted store abstraction
//!
//! A store keeps one collection of JSON documents per mapped table and
//! applies a batch of staged changes atomically.

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::entity::{EntityId, Record};
use crate::core::error::StoreResult;
use crate::persistence::model::Model;

/// One staged change
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Insert {
        table: &'static str,
        document: Value,
    },
    Update {
        table: &'static str,
        id: EntityId,
        document: Value,
    },
    Delete {
        table: &'static str,
        id: EntityId,
    },
}

impl Change {
    pub fn table(&self) -> &'static str {
        match self {
            Change::Insert { table, .. } | Change::Update { table, .. } | Change::Delete { table, .. } => table,
        }
    }
}

/// Outcome of a successful commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Rows inserted, updated or deleted
    pub affected: u64,
    /// Generated identifiers, in the order the inserts were submitted
    pub inserted_ids: Vec<EntityId>,
}

#[async_trait]
pub trait Store: Send + Sync {
    fn model(&self) -> &Model;

    /// Cheap connectivity probe used by readiness checks.
    async fn ping(&self) -> StoreResult<()>;

    async fn find(&self, table: &'static str, id: EntityId) -> StoreResult<Option<Record>>;

    /// Every row of `table`, ordered by identifier.
    async fn scan(&self, table: &'static str) -> StoreResult<Vec<Record>>;

    /// Apply all changes as one transaction: either every change is durable
    /// afterwards or none is.
    async fn commit(&self, changes: &[Change]) -> StoreResult<CommitReceipt>;
}
