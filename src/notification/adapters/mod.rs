//! Push transport adapters.

pub mod recording;

pub use recording::{RecordingPushTransport, SentNotification};
