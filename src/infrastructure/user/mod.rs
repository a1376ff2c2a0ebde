//! User infrastructure module
//!
//! Password hashing with Argon2 and the user directory service built on top of a
//! directory store.

mod password;
mod service;

pub use password::{Argon2Hasher, PasswordHasher, ARGON2ID_PREFIX};
pub use service::{Authentication, SignupRequest, UserDirectory};
