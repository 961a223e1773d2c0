//! Configuration management for Art Space

pub mod loader;
mod schema;

pub use loader::{load_config, write_default_config};
pub use schema::*;
