//! Follows domain
//!
//! A follow is a directed edge in a self-join over `users`: the user in
//! `user_following_id` follows the user in `user_being_followed_id`.

use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Directed follow edge, keyed by the (followed, following) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Follow {
    user_being_followed_id: UserId,
    user_following_id: UserId,
}

impl Follow {
    /// Edge meaning "`follower` follows `followee`"
    pub fn new(follower: UserId, followee: UserId) -> Self {
        Self {
            user_being_followed_id: followee,
            user_following_id: follower,
        }
    }

    pub fn user_being_followed_id(&self) -> UserId {
        self.user_being_followed_id
    }

    pub fn user_following_id(&self) -> UserId {
        self.user_following_id
    }

    /// The same pair pointing the other way
    pub fn reversed(&self) -> Self {
        Self::new(self.user_being_followed_id, self.user_following_id)
    }

    pub fn is_self_follow(&self) -> bool {
        self.user_being_followed_id == self.user_following_id
    }
}
