//! Document store adapters.
//!
//! The `tasks` and `users` collections and the organization settings
//! document live behind one store so that a task transition and the
//! matching counter increment commit as a single atomic unit.

pub mod memory;

pub use memory::InMemoryStore;
