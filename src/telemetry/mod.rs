//! Tracing subscriber initialisation.

use crate::config::LogConfig;
use std::sync::OnceLock;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static TRACING_INSTALLED: OnceLock<bool> = OnceLock::new();

/// Errors raised while configuring tracing.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directive does not parse.
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),
}

/// Installs the global `tracing` subscriber once per process.
///
/// `RUST_LOG` takes precedence over [`LogConfig::filter`]. Returns `true`
/// when this crate's subscriber is active and `false` when another global
/// subscriber was already installed; later calls return the first result.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when the configured filter is
/// malformed and `RUST_LOG` is unset or invalid.
pub fn init_tracing(config: &LogConfig) -> Result<bool, TelemetryError> {
    if let Some(installed) = TRACING_INSTALLED.get() {
        return Ok(*installed);
    }
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;
    Ok(*TRACING_INSTALLED.get_or_init(|| install(filter, config.json)))
}

fn install(filter: EnvFilter, json: bool) -> bool {
    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    if result.is_err() {
        tracing::debug!("global tracing subscriber already installed");
        return false;
    }
    tracing::info!(json, "tracing initialised");
    true
}
