//! Runtime configuration.
//!
//! Settings are layered with the `config` crate: built-in defaults, then an
//! optional TOML file, then `AID_CONNECT__*` environment variables using
//! `__` as the section separator (for example
//! `AID_CONNECT__LIFECYCLE__MAX_TRANSACTION_ATTEMPTS=8`).

use crate::notification::domain::DEFAULT_VOLUNTEER_PLACEHOLDER;
use crate::task::services::DEFAULT_MAX_TRANSACTION_ATTEMPTS;
use ::config::builder::DefaultState;
use ::config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "AID_CONNECT";

/// Default capacity of the transition broadcast channel.
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum AppConfigError {
    /// A source could not be read or deserialized.
    #[error(transparent)]
    Load(#[from] ::config::ConfigError),
    /// A value was read but is out of range.
    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        field: &'static str,
        /// Why the value was rejected.
        reason: &'static str,
    },
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Lifecycle engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Attempts per transition before store contention is reported.
    pub max_transaction_attempts: u32,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_transaction_attempts: DEFAULT_MAX_TRANSACTION_ATTEMPTS,
        }
    }
}

/// Notification dispatch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Events buffered per listener before it starts lagging.
    ///
    /// Notification delivery is best effort: when the dispatcher falls
    /// further behind than this, the skipped transitions are logged and
    /// their notifications are never sent.
    pub event_buffer: usize,
    /// Name used in messages when the claimant name is unknown.
    pub volunteer_placeholder: String,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            event_buffer: DEFAULT_EVENT_BUFFER,
            volunteer_placeholder: DEFAULT_VOLUNTEER_PLACEHOLDER.to_owned(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging settings.
    pub log: LogConfig,
    /// Lifecycle engine settings.
    pub lifecycle: LifecycleConfig,
    /// Notification dispatch settings.
    pub dispatch: DispatchConfig,
}

impl AppConfig {
    /// Loads configuration from an optional TOML file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`AppConfigError::Load`] when a source is unreadable or
    /// malformed and [`AppConfigError::Invalid`] when a value is out of
    /// range.
    pub fn load(path: Option<&Path>) -> Result<Self, AppConfigError> {
        let mut builder = Config::builder();
        if let Some(file) = path {
            builder = builder.add_source(File::from(file).required(true));
        }
        let with_env = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );
        Self::build(with_env)
    }

    /// Parses configuration from TOML text, without environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`AppConfigError`] as for [`AppConfig::load`].
    pub fn from_toml(source: &str) -> Result<Self, AppConfigError> {
        Self::build(Config::builder().add_source(File::from_str(source, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppConfigError> {
        let loaded: Self = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Rejects values the services cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`AppConfigError::Invalid`] for zero attempts or a zero
    /// event buffer.
    pub const fn validate(&self) -> Result<(), AppConfigError> {
        if self.lifecycle.max_transaction_attempts == 0 {
            return Err(AppConfigError::Invalid {
                field: "lifecycle.max_transaction_attempts",
                reason: "must be at least 1",
            });
        }
        if self.dispatch.event_buffer == 0 {
            return Err(AppConfigError::Invalid {
                field: "dispatch.event_buffer",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}
