//! Aid Connect: volunteer task coordination.
//!
//! Admins post help requests, volunteers claim and complete them, and the
//! people involved are told about it by push notification. The crate holds
//! the claim-safe task lifecycle engine and the notification dispatcher that
//! reacts to its transitions.
//!
//! # Architecture
//!
//! Aid Connect follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (store, event bus, push)
//!
//! # Modules
//!
//! - [`task`]: Task lifecycle engine and live task views
//! - [`notification`]: Recipient resolution, message templates, and fan-out
//! - [`user`]: Accounts, counters, and notification tokens
//! - [`organization`]: Organization settings and the admin enrollment code
//! - [`session`]: Explicit per-request session context
//! - [`store`]: In-memory transactional document store
//! - [`config`]: Layered runtime configuration
//! - [`telemetry`]: Tracing subscriber setup
//! - [`app`]: Composition root

pub mod app;
pub mod config;
pub mod notification;
pub mod organization;
pub mod session;
pub mod store;
pub mod task;
pub mod telemetry;
pub mod user;
