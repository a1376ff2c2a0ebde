//! Infrastructure layer - storage backends, password hashing and logging

pub mod logging;
pub mod storage;
pub mod user;
