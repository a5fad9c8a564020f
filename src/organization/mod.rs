//! Organization-wide settings document.
//!
//! A single settings document names the organization and holds the admin
//! enrollment code checked when a new profile asks for the admin role.

mod service;
mod settings;

pub use service::{OrganizationError, OrganizationService, UpdateSettingsRequest};
pub use settings::{AdminCode, OrganizationSettings, SettingsError, SettingsRepository};
