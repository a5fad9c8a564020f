//! Explicit per-request session context.
//!
//! Every lifecycle and profile operation receives a [`Session`] naming the
//! acting user instead of reading process-wide state. Sessions are resolved
//! from the external identity provider by [`SessionResolver`].

mod context;
mod identity;
mod resolver;

pub use context::{PolicyError, Session};
pub use identity::{IdentityProvider, StaticIdentityProvider};
pub use resolver::{SessionError, SessionResolver, SessionState};
