//! Port contracts for user account management.

pub mod directory;

pub use directory::{UserDirectory, UserDirectoryError, UserDirectoryResult};
