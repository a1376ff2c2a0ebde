//! Storage implementations for the directory

pub mod factory;
pub mod in_memory;
pub mod migrations;
pub mod postgres;

pub use factory::{StorageConfig, StorageType, StoreFactory};
pub use in_memory::InMemoryStore;
pub use postgres::{PostgresConfig, PostgresStore};
