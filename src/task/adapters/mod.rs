//! Adapter implementations for task lifecycle ports.
//!
//! Task persistence is provided by [`crate::store::InMemoryStore`], which
//! shares one transaction boundary with user counters.

pub mod broadcast;

pub use broadcast::BroadcastTransitionBus;
