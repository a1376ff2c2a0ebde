//! Staged writes applied by a store on commit

use crate::domain::follow::Follow;
use crate::domain::message::Message;
use crate::domain::user::{NewUser, UserId};

/// A single staged mutation. A store applies a batch of these atomically.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingWrite {
    InsertUser(NewUser),
    DeleteUser(UserId),
    InsertFollow(Follow),
    /// Removing an edge that does not exist is a no-op
    DeleteFollow(Follow),
    InsertMessage(Message),
}

impl PendingWrite {
    /// Short label for logs
    pub fn describe(&self) -> String {
        match self {
            Self::InsertUser(user) => format!("insert user '{}'", user.username()),
            Self::DeleteUser(id) => format!("delete user {}", id),
            Self::InsertFollow(f) => format!(
                "insert follow {} -> {}",
                f.user_following_id(),
                f.user_being_followed_id()
            ),
            Self::DeleteFollow(f) => format!(
                "delete follow {} -> {}",
                f.user_following_id(),
                f.user_being_followed_id()
            ),
            Self::InsertMessage(m) => format!("insert message {} by {}", m.id(), m.user_id()),
        }
    }
}

impl From<NewUser> for PendingWrite {
    fn from(user: NewUser) -> Self {
        Self::InsertUser(user)
    }
}

impl From<Follow> for PendingWrite {
    fn from(follow: Follow) -> Self {
        Self::InsertFollow(follow)
    }
}

impl From<Message> for PendingWrite {
    fn from(message: Message) -> Self {
        Self::InsertMessage(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message::MessageId;

    #[test]
    fn test_from_conversions() {
        let follow = Follow::new(UserId::new(1), UserId::new(2));
        assert_eq!(PendingWrite::from(follow), PendingWrite::InsertFollow(follow));

        let message = crate::domain::message::Message::new(MessageId::new(1), "hi", UserId::new(1));
        assert!(matches!(
            PendingWrite::from(message),
            PendingWrite::InsertMessage(_)
        ));
    }

    #[test]
    fn test_describe() {
        let follow = Follow::new(UserId::new(2), UserId::new(1));

        assert_eq!(
            PendingWrite::InsertFollow(follow).describe(),
            "insert follow 2 -> 1"
        );
        assert_eq!(
            PendingWrite::DeleteUser(UserId::new(4)).describe(),
            "delete user 4"
        );
    }
}
