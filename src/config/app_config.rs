use serde::Deserialize;

use crate::domain::{DomainError, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};
use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};

/// Environment variable that selects the database, as in most twelve-factor deployments
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Application configuration
///
/// Built once at startup and passed explicitly to whatever needs it, so the target
/// database is fixed before any connection is opened.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub password: PasswordConfig,
    pub profile: ProfileConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres` or `memory`
    pub backend: String,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    /// Apply pending migrations when the store is created
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

/// Defaults applied to new profiles
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub default_image_url: String,
    pub default_header_image_url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let pg = PostgresConfig::default();

        Self {
            backend: "postgres".to_string(),
            url: pg.url,
            max_connections: pg.max_connections,
            min_connections: pg.min_connections,
            connect_timeout_secs: pg.connect_timeout_secs,
            idle_timeout_secs: pg.idle_timeout_secs,
            run_migrations: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum for Argon2id)
        Self {
            memory_cost_kib: 19 * 1024,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            default_image_url: DEFAULT_IMAGE_URL.to_string(),
            default_header_image_url: DEFAULT_HEADER_IMAGE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from `config/default`, `config/local`, `WARBLER__*` variables and
    /// finally `DATABASE_URL`, each layer overriding the previous one.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("WARBLER")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", std::env::var(DATABASE_URL_ENV).ok())?
            .build()?;

        config.try_deserialize()
    }

    /// Point the configuration at another database, e.g. an isolated test database
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database.url = url.into();
        self
    }

    /// Use the in-memory backend
    pub fn in_memory(mut self) -> Self {
        self.database.backend = "memory".to_string();
        self
    }

    /// Resolve the storage backend selected by `database.backend`
    pub fn storage_config(&self) -> Result<StorageConfig, DomainError> {
        let storage_type = StorageType::from_str(&self.database.backend).ok_or_else(|| {
            DomainError::configuration(format!(
                "Unknown database backend '{}'",
                self.database.backend
            ))
        })?;

        Ok(match storage_type {
            StorageType::InMemory => StorageConfig::in_memory(),
            StorageType::Postgres => StorageConfig::postgres(
                PostgresConfig::new(&self.database.url)
                    .with_max_connections(self.database.max_connections)
                    .with_min_connections(self.database.min_connections)
                    .with_connect_timeout(self.database.connect_timeout_secs)
                    .with_idle_timeout(self.database.idle_timeout_secs)
                    .with_migrations(self.database.run_migrations),
            ),
        })
    }
}
