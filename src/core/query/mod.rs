//! Deferred query composition
//!
//! A [`Query`] only describes work: filters and eager-load instructions are
//! appended as steps and nothing touches the store until [`Query::execute`]
//! or [`Query::first`] is awaited. Steps run in the order they were added.

pub mod include;

pub use include::Include;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::core::entity::{Entity, Record};
use crate::core::error::DataResult;

/// Boolean predicate over an entity
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Where a query reads its rows from
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every row of `table`, ordered by identifier.
    async fn records(&self, table: &'static str) -> DataResult<Vec<Record>>;
}

/// Kind of a query step, as reported by [`Query::steps`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Filter,
    Include(&'static str),
}

enum Step<T> {
    Filter(Predicate<T>),
    Include(Include<T>),
}

impl<T> Clone for Step<T> {
    fn clone(&self) -> Self {
        match self {
            Step::Filter(predicate) => Step::Filter(predicate.clone()),
            Step::Include(include) => Step::Include(include.clone()),
        }
    }
}

/// Lazily evaluated query over entities of type `T`
pub struct Query<T: Entity> {
    steps: Vec<Step<T>>,
    tracking: bool,
}

impl<T: Entity> Query<T> {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            tracking: true,
        }
    }

    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.filter_by(Arc::new(predicate))
    }

    pub fn filter_by(mut self, predicate: Predicate<T>) -> Self {
        self.steps.push(Step::Filter(predicate));
        self
    }

    pub fn include(mut self, include: Include<T>) -> Self {
        self.steps.push(Step::Include(include));
        self
    }

    /// Results of this query are not recorded by the session's change tracker.
    pub fn as_no_tracking(mut self) -> Self {
        self.tracking = false;
        self
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn steps(&self) -> Vec<StepKind> {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Filter(_) => StepKind::Filter,
                Step::Include(include) => StepKind::Include(include.relation()),
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Materialize the query against `source`.
    pub async fn execute(&self, source: &dyn RecordSource) -> DataResult<Vec<T>> {
        self.run(source, None).await
    }

    /// First match in identifier order, or `None`.
    ///
    /// Includes only load for the returned row once no filter step remains.
    pub async fn first(&self, source: &dyn RecordSource) -> DataResult<Option<T>> {
        Ok(self.run(source, Some(1)).await?.into_iter().next())
    }

    async fn run(&self, source: &dyn RecordSource, limit: Option<usize>) -> DataResult<Vec<T>> {
        let records = source.records(T::TABLE).await?;
        let mut items = records
            .into_iter()
            .map(Record::into_entity::<T>)
            .collect::<Result<Vec<_>, _>>()?;

        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Filter(predicate) => items.retain(|item| predicate(item)),
                Step::Include(include) => {
                    if let Some(limit) = limit {
                        if !self.has_filter_after(index) {
                            items.truncate(limit);
                        }
                    }
                    if !items.is_empty() {
                        include.load(source, &mut items).await?;
                    }
                }
            }
        }

        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    fn has_filter_after(&self, index: usize) -> bool {
        self.steps[index + 1..]
            .iter()
            .any(|step| matches!(step, Step::Filter(_)))
    }
}

impl<T: Entity> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            steps: self.steps.clone(),
            tracking: self.tracking,
        }
    }
}

impl<T: Entity> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("table", &T::TABLE)
            .field("steps", &self.steps())
            .field("tracking", &self.tracking)
            .finish()
    }
}
