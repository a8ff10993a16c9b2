//! In-process store
//!
//! Commits are copy-on-write: the batch is applied to a copy of the tables
//! and the copy replaces the live state only when every change and every
//! unique index check succeeded.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::{Change, CommitReceipt, Store};
use crate::core::entity::{EntityId, Record};
use crate::core::error::{StoreError, StoreResult};
use crate::persistence::model::Model;

#[derive(Debug, Clone, Default)]
struct Table {
    rows: BTreeMap<EntityId, Value>,
    next_id: EntityId,
}

pub struct MemoryStore {
    model: Model,
    tables: RwLock<HashMap<&'static str, Table>>,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            tables: RwLock::new(HashMap::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Simulate connectivity loss: every operation fails while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of committed rows in `table`.
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }

    fn ensure_online(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store is offline".to_string()));
        }
        Ok(())
    }

    fn check_unique(&self, table: &'static str, rows: &BTreeMap<EntityId, Value>) -> StoreResult<()> {
        let Some(mapping) = self.model.table(table) else {
            return Ok(());
        };

        for field in &mapping.unique {
            let mut seen = HashSet::new();
            for document in rows.values() {
                // Case-insensitive, matching the MySQL column collation
                let value = match document.get(*field) {
                    None | Some(Value::Null) => continue,
                    Some(Value::String(text)) => text.to_lowercase(),
                    Some(value) => value.to_string(),
                };
                if !seen.insert(value) {
                    return Err(StoreError::ConstraintViolation {
                        table,
                        constraint: Model::unique_index_name(table, field),
                    });
                }
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn ping(&self) -> StoreResult<()> {
        self.ensure_online()
    }

    async fn find(&self, table: &'static str, id: EntityId) -> StoreResult<Option<Record>> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .and_then(|t| t.rows.get(&id))
            .map(|document| Record::new(id, document.clone())))
    }

    async fn scan(&self, table: &'static str) -> StoreResult<Vec<Record>> {
        self.ensure_online()?;
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|t| {
                t.rows
                    .iter()
                    .map(|(id, document)| Record::new(*id, document.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn commit(&self, changes: &[Change]) -> StoreResult<CommitReceipt> {
        self.ensure_online()?;
        let mut tables = self.tables.write().await;

        let mut working = tables.clone();
        let mut receipt = CommitReceipt::default();
        let mut touched = BTreeSet::new();

        for change in changes {
            let table = working.entry(change.table()).or_default();
            match change {
                Change::Insert { document, .. } => {
                    table.next_id += 1;
                    let id = table.next_id;
                    table.rows.insert(id, document.clone());
                    receipt.inserted_ids.push(id);
                }
                Change::Update { table: name, id, document } => {
                    let row = table
                        .rows
                        .get_mut(id)
                        .ok_or(StoreError::ConcurrencyConflict { table: *name, id: *id })?;
                    *row = document.clone();
                }
                Change::Delete { table: name, id } => {
                    table
                        .rows
                        .remove(id)
                        .ok_or(StoreError::ConcurrencyConflict { table: *name, id: *id })?;
                }
            }
            touched.insert(change.table());
            receipt.affected += 1;
        }

        for name in touched {
            if let Some(table) = working.get(name) {
                self.check_unique(name, &table.rows)?;
            }
        }

        *tables = working;
        Ok(receipt)
    }
}
