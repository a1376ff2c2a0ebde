//! Storage boundary for the user directory

mod repository;
mod write;

pub use repository::DirectoryStore;
pub use write::PendingWrite;

#[cfg(test)]
pub use repository::MockDirectoryStore;
