//! Domain layer - Core entities, the storage boundary and the unit of work

pub mod error;
pub mod follow;
pub mod message;
pub mod session;
pub mod store;
pub mod user;

pub use error::{ConstraintKind, DomainError};
pub use follow::Follow;
pub use message::{validate_message_text, Message, MessageId, MAX_MESSAGE_LENGTH};
pub use session::Session;
pub use store::{DirectoryStore, PendingWrite};
pub use user::{
    validate_password, validate_username, NewUser, User, UserId,
    UserValidationError, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL,
};
