//! Task lifecycle engine.
//!
//! Admins post help requests; volunteers claim and complete them. The
//! engine guarantees that exactly one volunteer can claim an open task by
//! running every transition as a single store transaction, keeps the
//! per-user counters in the same atomic unit, and publishes a typed event
//! after each commit. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
