pub mod entity;
pub mod error;
pub mod money;
pub mod query;
pub mod specification;
pub mod traits;

pub use entity::{Entity, EntityId, Record, Staged};
pub use error::{AppError, DataError, DataResult, Result, StoreError, StoreResult};
pub use query::{Include, Query, RecordSource};
pub use specification::{Specification, SpecificationEvaluator};
pub use traits::Repository;
