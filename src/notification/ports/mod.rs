//! Port contracts for push delivery.

mod transport;

pub use transport::{DeliveryFailure, DeliveryOutcome, PushTransport, PushTransportError};

#[cfg(test)]
pub use transport::MockPushTransport;
