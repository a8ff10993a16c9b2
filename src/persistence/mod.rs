//! Data-access infrastructure: store mapping, stores, sessions, the generic
//! repository and the unit of work.

pub mod model;
pub mod repository;
pub mod session;
pub mod store;
pub mod unit_of_work;

pub use model::{Model, ModelBuilder};
pub use repository::GenericRepository;
pub use session::Session;
pub use store::{Change, CommitReceipt, MemoryStore, MySqlStore, Store};
pub use unit_of_work::{UnitOfWork, UnitOfWorkFactory};
