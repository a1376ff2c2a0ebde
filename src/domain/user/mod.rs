//! User domain
//!
//! Domain types for users: the persisted entity, the staged signup row,
//! and input validation.

mod entity;
mod validation;

pub use entity::{NewUser, User, UserId, DEFAULT_HEADER_IMAGE_URL, DEFAULT_IMAGE_URL};
pub use validation::{validate_password, validate_username, UserValidationError};
