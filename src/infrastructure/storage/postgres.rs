//! PostgreSQL directory store with connection pooling

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::postgres::{PgDatabaseError, PgPool, PgPoolOptions, PgRow};
use sqlx::{Postgres, Row, Transaction};
use tracing::debug;

use super::migrations::run_directory_migrations;
use crate::domain::follow::Follow;
use crate::domain::message::{Message, MessageId};
use crate::domain::store::{DirectoryStore, PendingWrite};
use crate::domain::user::{User, UserId};
use crate::domain::{ConstraintKind, DomainError};

/// PostgreSQL storage configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,
    /// Apply pending migrations after connecting
    pub run_migrations: bool,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            url: "postgres:///warbler".to_string(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            run_migrations: true,
        }
    }
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn with_connect_timeout(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = secs;
        self
    }

    pub fn with_idle_timeout(mut self, secs: u64) -> Self {
        self.idle_timeout_secs = secs;
        self
    }

    pub fn with_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }
}

/// PostgreSQL implementation of DirectoryStore
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool and, if configured, bring the schema up to date
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(std::time::Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        if config.run_migrations {
            run_directory_migrations(&pool).await?;
        }

        Ok(Self::new(pool))
    }

    /// Returns a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn apply_one(
        tx: &mut Transaction<'_, Postgres>,
        write: &PendingWrite,
    ) -> Result<(), sqlx::Error> {
        match write {
            PendingWrite::InsertUser(user) => {
                sqlx::query(
                    r#"
                    INSERT INTO users (id, username, email, password, image_url, header_image_url)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    "#,
                )
                .bind(user.id().value())
                .bind(user.username())
                .bind(user.email())
                .bind(user.password_hash())
                .bind(user.image_url())
                .bind(user.header_image_url())
                .execute(&mut **tx)
                .await?;
            }
            PendingWrite::DeleteUser(id) => {
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id.value())
                    .execute(&mut **tx)
                    .await?;
            }
            PendingWrite::InsertFollow(follow) => {
                sqlx::query(
                    r#"
                    INSERT INTO follows (user_being_followed_id, user_following_id)
                    VALUES ($1, $2)
                    "#,
                )
                .bind(follow.user_being_followed_id().value())
                .bind(follow.user_following_id().value())
                .execute(&mut **tx)
                .await?;
            }
            PendingWrite::DeleteFollow(follow) => {
                sqlx::query(
                    r#"
                    DELETE FROM follows
                    WHERE user_being_followed_id = $1 AND user_following_id = $2
                    "#,
                )
                .bind(follow.user_being_followed_id().value())
                .bind(follow.user_following_id().value())
                .execute(&mut **tx)
                .await?;
            }
            PendingWrite::InsertMessage(message) => {
                sqlx::query(
                    r#"
                    INSERT INTO messages (id, text, timestamp, user_id)
                    VALUES ($1, $2, $3, $4)
                    "#,
                )
                .bind(message.id().value())
                .bind(message.text())
                .bind(message.timestamp())
                .bind(message.user_id().value())
                .execute(&mut **tx)
                .await?;
            }
        }

        Ok(())
    }

    async fn fetch_users(&self, sql: &str, id: UserId) -> Result<Vec<User>, DomainError> {
        let rows = sqlx::query(sql)
            .bind(id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }
}

const USER_COLUMNS: &str =
    "u.id, u.username, u.email, u.password, u.image_url, u.header_image_url, u.bio, u.location";

#[async_trait]
impl DirectoryStore for PostgresStore {
    async fn next_user_id(&self) -> Result<UserId, DomainError> {
        let id: i64 = sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('users', 'id'))")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to allocate user id: {}", e)))?;

        Ok(UserId::new(id))
    }

    async fn next_message_id(&self) -> Result<MessageId, DomainError> {
        let id: i64 =
            sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence('messages', 'id'))")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to allocate message id: {}", e))
                })?;

        Ok(MessageId::new(id))
    }

    async fn apply(&self, writes: Vec<PendingWrite>) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        for write in &writes {
            debug!(write = %write.describe(), "Applying write");
            // Dropping the transaction on error rolls it back
            Self::apply_one(&mut tx, write).await.map_err(map_write_error)?;
        }

        tx.commit().await.map_err(map_write_error)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!("SELECT {} FROM users u WHERE u.id = $1", USER_COLUMNS))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users u WHERE u.username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get user by username: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn follow_exists(&self, follow: Follow) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM follows
                WHERE user_being_followed_id = $1 AND user_following_id = $2
            )
            "#,
        )
        .bind(follow.user_being_followed_id().value())
        .bind(follow.user_following_id().value())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to check follow: {}", e)))
    }

    async fn followers(&self, id: UserId) -> Result<Vec<User>, DomainError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM users u
            JOIN follows f ON f.user_following_id = u.id
            WHERE f.user_being_followed_id = $1
            ORDER BY u.id
            "#,
            USER_COLUMNS
        );

        self.fetch_users(&sql, id).await
    }

    async fn following(&self, id: UserId) -> Result<Vec<User>, DomainError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM users u
            JOIN follows f ON f.user_being_followed_id = u.id
            WHERE f.user_following_id = $1
            ORDER BY u.id
            "#,
            USER_COLUMNS
        );

        self.fetch_users(&sql, id).await
    }

    async fn messages_by(&self, id: UserId) -> Result<Vec<Message>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, text, timestamp, user_id
            FROM messages
            WHERE user_id = $1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(id.value())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to list messages: {}", e)))?;

        rows.iter().map(row_to_message).collect()
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        for table in ["follows", "messages", "users"] {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await
                .map_err(|e| DomainError::storage(format!("Failed to clear {}: {}", table, e)))?;
        }

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to clear tables: {}", e)))
    }
}

/// Translate integrity errors into constraint violations; everything else is a
/// storage failure.
fn map_write_error(e: sqlx::Error) -> DomainError {
    let Some(db) = e.as_database_error() else {
        return DomainError::storage(format!("Failed to apply writes: {}", e));
    };

    let kind = match db.kind() {
        ErrorKind::UniqueViolation => ConstraintKind::Unique,
        ErrorKind::NotNullViolation => ConstraintKind::NotNull,
        ErrorKind::ForeignKeyViolation => ConstraintKind::ForeignKey,
        ErrorKind::CheckViolation => ConstraintKind::Check,
        _ => return DomainError::storage(format!("Failed to apply writes: {}", e)),
    };

    // Not-null violations carry no constraint name, only table and column
    let constraint = match db.constraint() {
        Some(name) => name.to_string(),
        None => db
            .try_downcast_ref::<PgDatabaseError>()
            .and_then(|pg| Some(format!("{}.{}", pg.table()?, pg.column()?)))
            .unwrap_or_else(|| "unknown".to_string()),
    };

    DomainError::constraint(kind, constraint)
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let decode = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: i64 = row.try_get("id").map_err(decode)?;
    let username: String = row.try_get("username").map_err(decode)?;
    let email: String = row.try_get("email").map_err(decode)?;
    let password: String = row.try_get("password").map_err(decode)?;
    let image_url: Option<String> = row.try_get("image_url").map_err(decode)?;
    let header_image_url: Option<String> = row.try_get("header_image_url").map_err(decode)?;
    let bio: Option<String> = row.try_get("bio").map_err(decode)?;
    let location: Option<String> = row.try_get("location").map_err(decode)?;

    let mut user = User::new(UserId::new(id), username, email, password)
        .with_bio(bio)
        .with_location(location);

    if let Some(url) = image_url {
        user = user.with_image_url(url);
    }
    if let Some(url) = header_image_url {
        user = user.with_header_image_url(url);
    }

    Ok(user)
}

fn row_to_message(row: &PgRow) -> Result<Message, DomainError> {
    let decode = |e: sqlx::Error| DomainError::storage(format!("Invalid message row: {}", e));

    let id: i64 = row.try_get("id").map_err(decode)?;
    let text: String = row.try_get("text").map_err(decode)?;
    let timestamp: DateTime<Utc> = row.try_get("timestamp").map_err(decode)?;
    let user_id: i64 = row.try_get("user_id").map_err(decode)?;

    Ok(Message::with_timestamp(
        MessageId::new(id),
        text,
        UserId::new(user_id),
        timestamp,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{NewUser, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};

    fn test_database_url() -> String {
        std::env::var("WARBLER_TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgres:///warbler-test".to_string())
    }

    async fn connect_clean() -> PostgresStore {
        let store = PostgresStore::connect(&PostgresConfig::new(test_database_url()))
            .await
            .unwrap();
        store.clear().await.unwrap();
        store
    }

    async fn new_user(store: &PostgresStore, username: &str, email: Option<&str>) -> NewUser {
        NewUser::new(
            store.next_user_id().await.unwrap(),
            username,
            email.map(str::to_string),
            "HASHED_PASSWORD",
            DEFAULT_IMAGE_URL,
            DEFAULT_HEADER_IMAGE_URL,
        )
    }

    #[test]
    fn test_config_builders() {
        let config = PostgresConfig::new("postgres:///x")
            .with_max_connections(3)
            .with_min_connections(0)
            .with_connect_timeout(5)
            .with_idle_timeout(60)
            .with_migrations(false);

        assert_eq!(config.url, "postgres:///x");
        assert_eq!(config.max_connections, 3);
        assert_eq!(config.min_connections, 0);
        assert_eq!(config.connect_timeout_secs, 5);
        assert_eq!(config.idle_timeout_secs, 60);
        assert!(!config.run_migrations);
    }

    #[test]
    fn test_non_database_errors_are_storage_errors() {
        let err = map_write_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_round_trip_user() {
        let store = connect_clean().await;
        let staged = new_user(&store, "TestUser", Some("Test@Test.com")).await;
        let id = staged.id();

        store.apply(vec![staged.into()]).await.unwrap();

        let user = store.get_user(id).await.unwrap().unwrap();
        assert_eq!(user.username(), "TestUser");
        assert_eq!(user.email(), "Test@Test.com");
        assert_eq!(user.image_url(), DEFAULT_IMAGE_URL);
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_constraint_violations() {
        let store = connect_clean().await;
        let first = new_user(&store, "testuser1", Some("test1@test.com")).await;
        store.apply(vec![first.into()]).await.unwrap();

        let no_email = new_user(&store, "testuser2", None).await;
        let err = store.apply(vec![no_email.into()]).await.unwrap_err();
        assert_eq!(err.violated_constraint(), Some("users.email"));

        let dup_email = new_user(&store, "testuser3", Some("test1@test.com")).await;
        let err = store.apply(vec![dup_email.into()]).await.unwrap_err();
        assert_eq!(err.violated_constraint(), Some("users_email_key"));
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_follow_queries() {
        let store = connect_clean().await;
        let u1 = new_user(&store, "testuser1", Some("test1@test.com")).await;
        let u2 = new_user(&store, "testuser2", Some("test2@test.com")).await;
        let (id1, id2) = (u1.id(), u2.id());
        let edge = Follow::new(id2, id1);

        store
            .apply(vec![u1.into(), u2.into(), edge.into()])
            .await
            .unwrap();

        assert!(store.follow_exists(edge).await.unwrap());
        assert!(!store.follow_exists(edge.reversed()).await.unwrap());
        assert_eq!(store.followers(id1).await.unwrap()[0].id(), id2);
        assert_eq!(store.following(id2).await.unwrap()[0].id(), id1);

        let err = store.apply(vec![edge.into()]).await.unwrap_err();
        assert_eq!(err.violated_constraint(), Some("follows_pkey"));

        let err = store
            .apply(vec![Follow::new(id1, id1).into()])
            .await
            .unwrap_err();
        assert_eq!(err.violated_constraint(), Some("follows_no_self_follow"));
    }

    #[tokio::test]
    #[ignore = "Requires running PostgreSQL instance"]
    async fn test_messages_and_cascade() {
        let store = connect_clean().await;
        let author = new_user(&store, "author", Some("author@test.com")).await;
        let id = author.id();
        let message_id = store.next_message_id().await.unwrap();

        store
            .apply(vec![
                author.into(),
                Message::new(message_id, "hello", id).into(),
            ])
            .await
            .unwrap();
        assert_eq!(store.messages_by(id).await.unwrap().len(), 1);

        store.apply(vec![PendingWrite::DeleteUser(id)]).await.unwrap();
        assert!(store.messages_by(id).await.unwrap().is_empty());
    }
}
