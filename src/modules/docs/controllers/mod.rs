pub mod docs_controller;

pub use docs_controller::configure;
