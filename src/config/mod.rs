//! Configuration: YAML schema, loader, and validation.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{LoadResult, load_config, load_or_default};
pub use schema::AppConfig;
