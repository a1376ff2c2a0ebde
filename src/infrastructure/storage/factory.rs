//! Storage factory for runtime backend selection

use std::sync::Arc;

use tracing::info;

use crate::domain::store::DirectoryStore;
use crate::domain::DomainError;

use super::in_memory::InMemoryStore;
use super::postgres::{PostgresConfig, PostgresStore};

/// Supported storage types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// In-memory storage (for testing/development)
    InMemory,
    /// PostgreSQL storage
    Postgres,
}

impl StorageType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Some(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone)]
pub enum StorageConfig {
    /// In-memory storage configuration
    InMemory,
    /// PostgreSQL storage configuration
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Creates an in-memory storage configuration
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Creates a PostgreSQL storage configuration
    pub fn postgres(config: PostgresConfig) -> Self {
        Self::Postgres(config)
    }

    /// Returns the storage type
    pub fn storage_type(&self) -> StorageType {
        match self {
            Self::InMemory => StorageType::InMemory,
            Self::Postgres(_) => StorageType::Postgres,
        }
    }
}

/// Factory for creating directory stores
#[derive(Debug)]
pub struct StoreFactory;

impl StoreFactory {
    /// Creates a store based on the configuration
    pub async fn create(config: &StorageConfig) -> Result<Arc<dyn DirectoryStore>, DomainError> {
        info!(backend = ?config.storage_type(), "Creating directory store");

        match config {
            StorageConfig::InMemory => Ok(Arc::new(InMemoryStore::new())),
            StorageConfig::Postgres(pg_config) => {
                Ok(Arc::new(PostgresStore::connect(pg_config).await?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserId;

    #[test]
    fn test_storage_type_from_str() {
        assert_eq!(
            StorageType::from_str("memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("In-Memory"),
            Some(StorageType::InMemory)
        );
        assert_eq!(
            StorageType::from_str("postgresql"),
            Some(StorageType::Postgres)
        );
        assert_eq!(StorageType::from_str("pg"), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("sqlite"), None);
    }

    #[test]
    fn test_storage_config_type() {
        assert_eq!(
            StorageConfig::in_memory().storage_type(),
            StorageType::InMemory
        );
        assert_eq!(
            StorageConfig::postgres(PostgresConfig::new("postgres:///warbler")).storage_type(),
            StorageType::Postgres
        );
    }

    #[tokio::test]
    async fn test_create_in_memory() {
        let store = StoreFactory::create(&StorageConfig::in_memory())
            .await
            .unwrap();

        assert!(store.get_user(UserId::new(1)).await.unwrap().is_none());
    }
}
