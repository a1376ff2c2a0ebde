//! Warbler user directory
//!
//! The account and social-graph core of the Warbler microblog:
//! - Signup with Argon2id password hashing and authentication
//! - Directed follow relationships between users
//! - A unit of work whose constraint violations surface at commit
//! - PostgreSQL and in-memory storage backends

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use domain::DomainError;
use infrastructure::storage::StoreFactory;
use infrastructure::user::{Argon2Hasher, UserDirectory};

/// Build a user directory from configuration.
///
/// Opens the configured store (running migrations if enabled) and sets up the
/// password hasher with the configured cost parameters.
pub async fn create_directory(
    config: &AppConfig,
) -> Result<UserDirectory<Argon2Hasher>, DomainError> {
    let store = StoreFactory::create(&config.storage_config()?).await?;
    let hasher = Arc::new(Argon2Hasher::from_config(&config.password)?);

    Ok(UserDirectory::new(store, hasher).with_profile_defaults(config.profile.clone()))
}
