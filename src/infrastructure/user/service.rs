//! User directory: signup, authentication and the follow graph

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::ProfileConfig;
use crate::domain::follow::Follow;
use crate::domain::message::{validate_message_text, Message};
use crate::domain::session::Session;
use crate::domain::store::{DirectoryStore, PendingWrite};
use crate::domain::user::{validate_password, validate_username, NewUser, User, UserId};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for signing up a new user
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub username: String,
    /// Left optional so that a missing email reaches the store's not-null rule
    pub email: Option<String>,
    pub password: String,
    /// Blank or missing falls back to the configured default
    pub image_url: Option<String>,
}

impl SignupRequest {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: Some(email.into()),
            password: password.into(),
            image_url: None,
        }
    }

    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Outcome of a credential check.
///
/// Unknown usernames and wrong passwords both map to `Rejected`, so callers
/// cannot tell which half of the credential was wrong.
#[derive(Debug, Clone, PartialEq)]
pub enum Authentication {
    Authenticated(User),
    Rejected,
}

impl Authentication {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Rejected => None,
        }
    }

    pub fn into_user(self) -> Option<User> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Rejected => None,
        }
    }
}

/// Owns users and follows on top of a [`DirectoryStore`]
pub struct UserDirectory<H: PasswordHasher> {
    store: Arc<dyn DirectoryStore>,
    hasher: Arc<H>,
    profile: ProfileConfig,
}

impl<H: PasswordHasher> std::fmt::Debug for UserDirectory<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserDirectory")
            .field("hasher", &self.hasher)
            .field("profile", &self.profile)
            .finish()
    }
}

impl<H: PasswordHasher> UserDirectory<H> {
    /// Create a new user directory
    pub fn new(store: Arc<dyn DirectoryStore>, hasher: Arc<H>) -> Self {
        Self {
            store,
            hasher,
            profile: ProfileConfig::default(),
        }
    }

    /// Override the defaults applied to new profiles
    pub fn with_profile_defaults(mut self, profile: ProfileConfig) -> Self {
        self.profile = profile;
        self
    }

    /// Start a unit of work against this directory's store
    pub fn session(&self) -> Session {
        Session::new(Arc::clone(&self.store))
    }

    /// Hash the password and stage a new user on `session`.
    ///
    /// Only an empty username or password is refused here. Nothing is written until the session commits; duplicate usernames or emails
    /// and a missing email are reported by `commit`, not here.
    pub async fn signup(
        &self,
        session: &mut Session,
        request: SignupRequest,
    ) -> Result<NewUser, DomainError> {
        validate_username(&request.username).map_err(|e| DomainError::validation(e.to_string()))?;
        validate_password(&request.password).map_err(|e| DomainError::validation(e.to_string()))?;

        let password_hash = self.hasher.hash(&request.password)?;

        let image_url = request
            .image_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.profile.default_image_url.clone());

        let id = session.next_user_id().await?;

        let user = NewUser::new(
            id,
            request.username,
            request.email,
            password_hash,
            image_url,
            self.profile.default_header_image_url.clone(),
        );

        session.stage(user.clone())?;
        debug!(user_id = %id, username = %user.username(), "Staged signup");

        Ok(user)
    }

    /// Check a username/password pair
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Authentication, DomainError> {
        let Some(user) = self.store.get_user_by_username(username).await? else {
            info!(username, "Authentication rejected");
            return Ok(Authentication::Rejected);
        };

        if !self.hasher.verify(password, user.password_hash()) {
            info!(username, "Authentication rejected");
            return Ok(Authentication::Rejected);
        }

        debug!(user_id = %user.id(), "Authenticated");
        Ok(Authentication::Authenticated(user))
    }

    /// Get a user by ID
    pub async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        self.store.get_user(id).await
    }

    /// Get a user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        self.store.get_user_by_username(username).await
    }

    /// Like [`get_by_username`](Self::get_by_username) but missing users are an error
    pub async fn require_by_username(&self, username: &str) -> Result<User, DomainError> {
        self.get_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", username)))
    }

    /// Does `user` follow `other`?
    pub async fn is_following(&self, user: &User, other: &User) -> Result<bool, DomainError> {
        self.store
            .follow_exists(Follow::new(user.id(), other.id()))
            .await
    }

    /// Is `user` followed by `other`?
    pub async fn is_followed_by(&self, user: &User, other: &User) -> Result<bool, DomainError> {
        self.store
            .follow_exists(Follow::new(user.id(), other.id()).reversed())
            .await
    }

    /// Stage "`follower` follows `followee`"
    pub fn follow(
        &self,
        session: &mut Session,
        follower: &User,
        followee: &User,
    ) -> Result<Follow, DomainError> {
        let follow = Follow::new(follower.id(), followee.id());
        session.stage(follow)?;
        Ok(follow)
    }

    /// Stage removal of "`follower` follows `followee`"
    pub fn unfollow(
        &self,
        session: &mut Session,
        follower: &User,
        followee: &User,
    ) -> Result<(), DomainError> {
        session.stage(PendingWrite::DeleteFollow(Follow::new(
            follower.id(),
            followee.id(),
        )))
    }

    /// Users following `user`
    pub async fn followers(&self, user: &User) -> Result<Vec<User>, DomainError> {
        self.store.followers(user.id()).await
    }

    /// Users `user` follows
    pub async fn following(&self, user: &User) -> Result<Vec<User>, DomainError> {
        self.store.following(user.id()).await
    }

    /// Messages authored by `user`, newest first
    pub async fn messages(&self, user: &User) -> Result<Vec<Message>, DomainError> {
        self.store.messages_by(user.id()).await
    }

    /// Stage a new message by `author`
    pub async fn post_message(
        &self,
        session: &mut Session,
        author: &User,
        text: &str,
    ) -> Result<Message, DomainError> {
        validate_message_text(text)?;

        let id = session.next_message_id().await?;
        let message = Message::new(id, text, author.id());
        session.stage(message.clone())?;

        Ok(message)
    }

    /// Stage deletion of `user`, together with their follows and messages
    pub fn delete_user(&self, session: &mut Session, user: &User) -> Result<(), DomainError> {
        session.stage(PendingWrite::DeleteUser(user.id()))
    }
}
