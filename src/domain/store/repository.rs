//! Directory store trait

use async_trait::async_trait;

use super::write::PendingWrite;
use crate::domain::follow::Follow;
use crate::domain::message::{Message, MessageId};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Relational storage behind the user directory.
///
/// Reads only observe committed data. All writes go through [`apply`], which must
/// be all-or-nothing and report broken integrity rules as
/// [`DomainError::ConstraintViolation`].
///
/// [`apply`]: DirectoryStore::apply
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Allocate the next user id. Ids are never reused, even after a rollback.
    async fn next_user_id(&self) -> Result<UserId, DomainError>;

    /// Allocate the next message id
    async fn next_message_id(&self) -> Result<MessageId, DomainError>;

    /// Apply a batch of staged writes atomically
    async fn apply(&self, writes: Vec<PendingWrite>) -> Result<(), DomainError>;

    /// Get a user by id
    async fn get_user(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by exact username
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;

    /// Check whether a follow edge exists
    async fn follow_exists(&self, follow: Follow) -> Result<bool, DomainError>;

    /// Users following `id`, ordered by id
    async fn followers(&self, id: UserId) -> Result<Vec<User>, DomainError>;

    /// Users that `id` follows, ordered by id
    async fn following(&self, id: UserId) -> Result<Vec<User>, DomainError>;

    /// Messages authored by `id`, newest first
    async fn messages_by(&self, id: UserId) -> Result<Vec<Message>, DomainError>;

    /// Delete every follow, message and user (use with caution)
    async fn clear(&self) -> Result<(), DomainError>;
}
