//! Infrastructure layer: configuration and record stores.

pub mod config;
pub mod store;

pub use config::{AppConfig, ConfigError, StoreBackend};
pub use store::{AuthorStore, PostStore, StoreError, StoreResult};
