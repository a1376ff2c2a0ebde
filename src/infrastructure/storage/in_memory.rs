//! In-memory directory store
//!
//! Tables live behind a single lock. `apply` works on a copy of the tables and only
//! swaps it in when every write passed its constraints, so a failed batch leaves no
//! trace. Constraint names match the PostgreSQL schema.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::follow::Follow;
use crate::domain::message::{Message, MessageId};
use crate::domain::store::{DirectoryStore, PendingWrite};
use crate::domain::user::{User, UserId};
use crate::domain::DomainError;

#[derive(Debug, Clone, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    follows: BTreeSet<Follow>,
    messages: BTreeMap<MessageId, Message>,
}

impl Tables {
    fn apply(&mut self, write: PendingWrite) -> Result<(), DomainError> {
        match write {
            PendingWrite::InsertUser(new_user) => {
                let id = new_user.id();
                let user = new_user
                    .into_user()
                    .ok_or_else(|| DomainError::not_null("users.email"))?;

                if self.users.contains_key(&id) {
                    return Err(DomainError::unique("users_pkey"));
                }

                if self.users.values().any(|u| u.username() == user.username()) {
                    return Err(DomainError::unique("users_username_key"));
                }

                if self.users.values().any(|u| u.email() == user.email()) {
                    return Err(DomainError::unique("users_email_key"));
                }

                self.users.insert(id, user);
            }
            PendingWrite::DeleteUser(id) => {
                self.users.remove(&id);
                // ON DELETE CASCADE
                self.follows.retain(|f| {
                    f.user_following_id() != id && f.user_being_followed_id() != id
                });
                self.messages.retain(|_, m| m.user_id() != id);
            }
            PendingWrite::InsertFollow(follow) => {
                if !self.users.contains_key(&follow.user_being_followed_id()) {
                    return Err(DomainError::foreign_key(
                        "follows_user_being_followed_id_fkey",
                    ));
                }

                if !self.users.contains_key(&follow.user_following_id()) {
                    return Err(DomainError::foreign_key("follows_user_following_id_fkey"));
                }

                if follow.is_self_follow() {
                    return Err(DomainError::check("follows_no_self_follow"));
                }

                if !self.follows.insert(follow) {
                    return Err(DomainError::unique("follows_pkey"));
                }
            }
            PendingWrite::DeleteFollow(follow) => {
                self.follows.remove(&follow);
            }
            PendingWrite::InsertMessage(message) => {
                if !self.users.contains_key(&message.user_id()) {
                    return Err(DomainError::foreign_key("messages_user_id_fkey"));
                }

                if self.messages.contains_key(&message.id()) {
                    return Err(DomainError::unique("messages_pkey"));
                }

                self.messages.insert(message.id(), message);
            }
        }

        Ok(())
    }
}

/// In-memory implementation of DirectoryStore
#[derive(Debug)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    user_seq: AtomicI64,
    message_seq: AtomicI64,
}

impl InMemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::default())),
            user_seq: AtomicI64::new(1),
            message_seq: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryStore {
    async fn next_user_id(&self) -> Result<UserId, DomainError> {
        Ok(UserId::new(self.user_seq.fetch_add(1, Ordering::SeqCst)))
    }

    async fn next_message_id(&self) -> Result<MessageId, DomainError> {
        Ok(MessageId::new(self.message_seq.fetch_add(1, Ordering::SeqCst)))
    }

    async fn apply(&self, writes: Vec<PendingWrite>) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        let mut working = tables.clone();

        for write in writes {
            working.apply(write)?;
        }

        *tables = working;
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username() == username)
            .cloned())
    }

    async fn follow_exists(&self, follow: Follow) -> Result<bool, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.follows.contains(&follow))
    }

    async fn followers(&self, id: UserId) -> Result<Vec<User>, DomainError> {
        let tables = self.tables.read().await;

        let mut ids: Vec<UserId> = tables
            .follows
            .iter()
            .filter(|f| f.user_being_followed_id() == id)
            .map(|f| f.user_following_id())
            .collect();
        ids.sort();

        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn following(&self, id: UserId) -> Result<Vec<User>, DomainError> {
        let tables = self.tables.read().await;

        let mut ids: Vec<UserId> = tables
            .follows
            .iter()
            .filter(|f| f.user_following_id() == id)
            .map(|f| f.user_being_followed_id())
            .collect();
        ids.sort();

        Ok(ids
            .iter()
            .filter_map(|id| tables.users.get(id).cloned())
            .collect())
    }

    async fn messages_by(&self, id: UserId) -> Result<Vec<Message>, DomainError> {
        let tables = self.tables.read().await;

        let mut messages: Vec<Message> = tables
            .messages
            .values()
            .filter(|m| m.user_id() == id)
            .cloned()
            .collect();
        messages.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()).then(b.id().cmp(&a.id())));

        Ok(messages)
    }

    async fn clear(&self) -> Result<(), DomainError> {
        let mut tables = self.tables.write().await;
        *tables = Tables::default();
        Ok(())
    }
}
