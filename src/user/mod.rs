//! Volunteer and administrator accounts.
//!
//! Users are created once per authenticated identity, carry the task
//! counters maintained by the lifecycle engine, and hold the opaque push
//! notification token issued by the external transport. The module follows
//! the same hexagonal split as [`crate::task`]:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Profile orchestration in [`services`]

pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
