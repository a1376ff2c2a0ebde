//! Unit of work over a [`DirectoryStore`]
//!
//! Writes are staged in memory and only reach the store on [`Session::commit`].
//! Staging never checks constraints; integrity errors surface from `commit`.
//! A failed commit leaves the session aborted until [`Session::rollback`] is
//! called, mirroring a database transaction that must be rolled back.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::message::MessageId;
use crate::domain::store::{DirectoryStore, PendingWrite};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Active,
    Aborted { reason: String },
}

pub struct Session {
    store: Arc<dyn DirectoryStore>,
    pending: Vec<PendingWrite>,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("pending", &self.pending.len())
            .field("state", &self.state)
            .finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn DirectoryStore>) -> Self {
        Self {
            store,
            pending: Vec::new(),
            state: SessionState::Active,
        }
    }

    /// Stage a write for the next commit
    pub fn stage(&mut self, write: impl Into<PendingWrite>) -> Result<(), DomainError> {
        self.ensure_active()?;

        let write = write.into();
        debug!(write = %write.describe(), "Staged write");
        self.pending.push(write);

        Ok(())
    }

    /// Writes staged since the last commit or rollback
    pub fn pending(&self) -> &[PendingWrite] {
        &self.pending
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.state, SessionState::Aborted { .. })
    }

    /// Allocate a user id from the store sequence
    pub async fn next_user_id(&self) -> Result<UserId, DomainError> {
        self.ensure_active()?;
        self.store.next_user_id().await
    }

    /// Allocate a message id from the store sequence
    pub async fn next_message_id(&self) -> Result<MessageId, DomainError> {
        self.ensure_active()?;
        self.store.next_message_id().await
    }

    /// Apply every staged write atomically. Returns the number of writes applied.
    ///
    /// On failure the staged writes are kept and the session is aborted.
    pub async fn commit(&mut self) -> Result<usize, DomainError> {
        self.ensure_active()?;

        if self.pending.is_empty() {
            return Ok(0);
        }

        let count = self.pending.len();

        match self.store.apply(self.pending.clone()).await {
            Ok(()) => {
                self.pending.clear();
                info!(writes = count, "Committed session");
                Ok(count)
            }
            Err(e) => {
                warn!(writes = count, error = %e, "Commit failed, session aborted");
                self.state = SessionState::Aborted {
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    /// Discard staged writes and clear an aborted state. Returns the number of
    /// writes discarded.
    pub fn rollback(&mut self) -> usize {
        let discarded = self.pending.len();
        self.pending.clear();
        self.state = SessionState::Active;

        debug!(discarded, "Rolled back session");
        discarded
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        match &self.state {
            SessionState::Active => Ok(()),
            SessionState::Aborted { reason } => Err(DomainError::session_aborted(reason.clone())),
        }
    }
}
