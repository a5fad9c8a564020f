//! Notification dispatcher.
//!
//! Turns committed task transitions into push notifications. The
//! dispatcher resolves the recipients from the user directory, renders the
//! message from a fixed label table, fans out through a [`ports::PushTransport`]
//! and clears tokens the transport reports as dead. Delivery is best effort:
//! every failure is logged and folded into a [`services::DispatchReport`],
//! never returned to the lifecycle operation that produced the event.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
