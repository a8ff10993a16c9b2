//! Query specifications
//!
//! A [`Specification`] captures one query intent: an optional filter, simple
//! eager loads and composite include transforms. It is purely descriptive;
//! [`SpecificationEvaluator`] turns it into a [`Query`](crate::core::query::Query).

pub mod evaluator;

pub use evaluator::SpecificationEvaluator;

use std::fmt;
use std::sync::Arc;

use crate::core::entity::Entity;
use crate::core::query::{Include, Predicate, Query};

/// Transform from one query to another, used for include paths that a
/// single [`Include`] cannot express.
pub type ComplexInclude<T> = Arc<dyn Fn(Query<T>) -> Query<T> + Send + Sync>;

pub struct Specification<T: Entity> {
    criteria: Option<Predicate<T>>,
    includes: Vec<Include<T>>,
    complex_includes: Vec<ComplexInclude<T>>,
}

impl<T: Entity> Specification<T> {
    /// Matches every entity and loads nothing extra.
    pub fn new() -> Self {
        Self {
            criteria: None,
            includes: Vec::new(),
            complex_includes: Vec::new(),
        }
    }

    pub fn with_criteria<F>(criteria: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            criteria: Some(Arc::new(criteria)),
            ..Self::new()
        }
    }

    pub fn with_complex_include<F, I>(criteria: F, include_query: I) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
        I: Fn(Query<T>) -> Query<T> + Send + Sync + 'static,
    {
        Self::with_criteria(criteria).add_complex_include(include_query)
    }

    pub fn add_include(mut self, include: Include<T>) -> Self {
        self.includes.push(include);
        self
    }

    pub fn add_complex_include<I>(mut self, include_query: I) -> Self
    where
        I: Fn(Query<T>) -> Query<T> + Send + Sync + 'static,
    {
        self.complex_includes.push(Arc::new(include_query));
        self
    }

    pub fn criteria(&self) -> Option<&Predicate<T>> {
        self.criteria.as_ref()
    }

    pub fn includes(&self) -> &[Include<T>] {
        &self.includes
    }

    pub fn complex_includes(&self) -> &[ComplexInclude<T>] {
        &self.complex_includes
    }
}

impl<T: Entity> Default for Specification<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for Specification<T> {
    fn clone(&self) -> Self {
        Self {
            criteria: self.criteria.clone(),
            includes: self.includes.clone(),
            complex_includes: self.complex_includes.clone(),
        }
    }
}

impl<T: Entity> fmt::Debug for Specification<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Specification")
            .field("table", &T::TABLE)
            .field("has_criteria", &self.criteria.is_some())
            .field("includes", &self.includes)
            .field("complex_includes", &self.complex_includes.len())
            .finish()
    }
}
