use crate::core::entity::Entity;
use crate::core::query::Query;
use crate::core::specification::Specification;

/// Applies a specification to a base query
pub struct SpecificationEvaluator;

impl SpecificationEvaluator {
    /// Appends, in order: the criteria filter, each simple include, then each
    /// complex include transform fed with the previous result.
    pub fn get_query<T: Entity>(input: Query<T>, spec: &Specification<T>) -> Query<T> {
        let mut query = input;

        if let Some(criteria) = spec.criteria() {
            query = query.filter_by(criteria.clone());
        }

        query = spec
            .includes()
            .iter()
            .fold(query, |current, include| current.include(include.clone()));

        spec.complex_includes()
            .iter()
            .fold(query, |current, include_query| include_query(current))
    }
}
