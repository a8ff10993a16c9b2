pub mod controllers;
pub mod models;
pub mod specifications;

pub use models::{Order, OrderLine, OrderStatus};
