//! Migrate command - applies or reverts the directory schema

use clap::Args;
use tracing::info;

use crate::config::AppConfig;
use crate::infrastructure::storage::migrations::{
    revert_latest_migration, run_directory_migrations,
};
use crate::infrastructure::storage::{PostgresStore, StorageConfig};

/// Arguments for the migrate command
#[derive(Args, Clone, Debug)]
pub struct MigrateArgs {
    /// Revert the most recently applied migration instead
    #[arg(long)]
    pub revert: bool,
}

/// Run the migrate command
pub async fn run(config: &AppConfig, args: MigrateArgs) -> anyhow::Result<()> {
    let StorageConfig::Postgres(pg_config) = config.storage_config()? else {
        anyhow::bail!(
            "Migrations need the postgres backend, got '{}'",
            config.database.backend
        );
    };

    let store = PostgresStore::connect(&pg_config.with_migrations(false)).await?;

    if args.revert {
        match revert_latest_migration(store.pool()).await? {
            Some(version) => println!("Reverted migration {}", version),
            None => println!("No migrations to revert"),
        }
    } else {
        let applied = run_directory_migrations(store.pool()).await?;
        info!(applied, "Migrations complete");
        println!("Applied {} migration(s)", applied);
    }

    Ok(())
}
