//! Store session
//!
//! A session owns the pending change set and the identity map of tracked
//! snapshots for one unit of work. It is the only mutable state shared by the
//! repositories created from that unit of work.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use uuid::Uuid;

use crate::core::entity::{to_document, Entity, EntityId, Record};
use crate::core::error::{DataError, DataResult};
use crate::core::query::RecordSource;
use crate::persistence::store::{Change, Store};

struct PendingChange {
    change: Change,
    assigned: Option<Arc<OnceLock<EntityId>>>,
}

#[derive(Default)]
struct ChangeTracker {
    pending: Vec<PendingChange>,
    tracked: HashMap<(&'static str, EntityId), Value>,
}

pub struct Session {
    id: Uuid,
    store: Arc<dyn Store>,
    tracker: Mutex<ChangeTracker>,
    disposed: AtomicBool,
}

impl Session {
    pub fn open(store: Arc<dyn Store>) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session_id = %id, "Store session opened");
        Self {
            id,
            store,
            tracker: Mutex::new(ChangeTracker::default()),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn ensure_active(&self) -> DataResult<()> {
        if self.is_disposed() {
            tracing::error!(session_id = %self.id, "Session used after dispose");
            return Err(DataError::Disposed(self.id));
        }
        Ok(())
    }

    pub fn ensure_mapped(&self, table: &'static str) -> DataResult<()> {
        if !self.store.model().is_mapped(table) {
            tracing::error!(session_id = %self.id, table, "Entity type has no store mapping");
            return Err(DataError::Unmapped(table));
        }
        Ok(())
    }

    // The tracker is never locked across an await point
    fn tracker(&self) -> MutexGuard<'_, ChangeTracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stage_insert<T: Entity>(&self, entity: &T) -> DataResult<Arc<OnceLock<EntityId>>> {
        self.ensure_active()?;
        let document = to_document(entity)?;
        let assigned = Arc::new(OnceLock::new());

        self.tracker().pending.push(PendingChange {
            change: Change::Insert {
                table: T::TABLE,
                document,
            },
            assigned: Some(assigned.clone()),
        });
        Ok(assigned)
    }

    pub fn stage_update<T: Entity>(&self, entity: &T) -> DataResult<()> {
        self.ensure_active()?;
        let id = entity.id().ok_or(DataError::MissingKey(T::TABLE))?;
        let document = to_document(entity)?;

        let mut tracker = self.tracker();
        if tracker.tracked.get(&(T::TABLE, id)) == Some(&document) {
            tracing::debug!(session_id = %self.id, table = T::TABLE, id, "Skipping update of unchanged entity");
            return Ok(());
        }
        tracker.pending.push(PendingChange {
            change: Change::Update {
                table: T::TABLE,
                id,
                document,
            },
            assigned: None,
        });
        Ok(())
    }

    /// Stage removal of every entity, or of none when one lacks an identifier.
    pub fn stage_delete<'a, T, I>(&self, entities: I) -> DataResult<()>
    where
        T: Entity,
        I: IntoIterator<Item = &'a T>,
    {
        self.ensure_active()?;
        let ids = entities
            .into_iter()
            .map(|entity| entity.id().ok_or(DataError::MissingKey(T::TABLE)))
            .collect::<DataResult<Vec<_>>>()?;

        let mut tracker = self.tracker();
        for id in ids {
            tracker.pending.push(PendingChange {
                change: Change::Delete { table: T::TABLE, id },
                assigned: None,
            });
        }
        Ok(())
    }

    /// Record snapshots of entities returned by a tracking query.
    ///
    /// Snapshots live until the session is disposed. An update whose document
    /// equals the snapshot is not staged.
    pub fn track<T: Entity>(&self, entities: &[T]) -> DataResult<()> {
        let mut snapshots = Vec::with_capacity(entities.len());
        for entity in entities {
            if let Some(id) = entity.id() {
                snapshots.push(((T::TABLE, id), to_document(entity)?));
            }
        }
        self.tracker().tracked.extend(snapshots);
        Ok(())
    }

    pub fn pending_count(&self) -> usize {
        self.tracker().pending.len()
    }

    pub fn tracked_count(&self) -> usize {
        self.tracker().tracked.len()
    }

    /// Point lookup straight from the store, ignoring tracked snapshots.
    pub async fn find<T: Entity>(&self, id: EntityId) -> DataResult<Option<T>> {
        self.ensure_active()?;
        match self.store.find(T::TABLE, id).await? {
            Some(record) => Ok(Some(record.into_entity()?)),
            None => Ok(None),
        }
    }

    /// Flush every pending change in one store commit.
    ///
    /// On failure nothing is durable, pending changes are kept and the store
    /// error is returned unchanged.
    pub async fn save_changes(&self) -> DataResult<u64> {
        self.ensure_active()?;

        let changes: Vec<Change> = self
            .tracker()
            .pending
            .iter()
            .map(|pending| pending.change.clone())
            .collect();
        if changes.is_empty() {
            return Ok(0);
        }

        let receipt = match self.store.commit(&changes).await {
            Ok(receipt) => receipt,
            Err(err) => {
                tracing::warn!(session_id = %self.id, changes = changes.len(), error = %err, "Commit rejected by store");
                return Err(err.into());
            }
        };

        let mut tracker = self.tracker();
        // Only the committed prefix; changes staged during the await stay pending
        let committed = changes.len().min(tracker.pending.len());
        let pending: Vec<PendingChange> = tracker.pending.drain(..committed).collect();
        let mut inserted = receipt.inserted_ids.iter();

        for PendingChange { change, assigned } in pending {
            match change {
                Change::Insert { table, document } => {
                    if let Some(id) = inserted.next() {
                        if let Some(assigned) = assigned {
                            let _ = assigned.set(*id);
                        }
                        tracker.tracked.insert((table, *id), document);
                    }
                }
                Change::Update { table, id, document } => {
                    tracker.tracked.insert((table, id), document);
                }
                Change::Delete { table, id } => {
                    tracker.tracked.remove(&(table, id));
                }
            }
        }

        tracing::info!(session_id = %self.id, affected = receipt.affected, "Changes committed");
        Ok(receipt.affected)
    }

    /// Release the session. Pending changes are discarded.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        let mut tracker = self.tracker();
        let discarded = tracker.pending.len();
        tracker.pending.clear();
        tracker.tracked.clear();
        tracing::debug!(session_id = %self.id, discarded, "Store session disposed");
    }
}

#[async_trait]
impl RecordSource for Session {
    async fn records(&self, table: &'static str) -> DataResult<Vec<Record>> {
        self.ensure_active()?;
        Ok(self.store.scan(table).await?)
    }
}
