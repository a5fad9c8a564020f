//! Application services for user profiles.

mod profile;

pub use profile::{CreateProfileRequest, ProfileError, ProfileService};
