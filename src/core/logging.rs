//! Tracing subscriber setup for applications embedding this crate.

use anyhow::Result;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Default directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,hyper=info,reqwest=info";

/// Installs a global fmt subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Returns `Ok(false)` when a global subscriber was already installed.
pub fn init_logging(default_filter: &str) -> Result<bool> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => Ok(true),
        Err(_) => Ok(false),
    }
}
