//! `tracing` subscriber setup.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat};

/// Install a global `fmt` subscriber for `config`.
///
/// `RUST_LOG`, when set and valid, overrides `config.filter`. An invalid
/// configured filter falls back to `info`. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
#[must_use = "returns whether this call installed the subscriber"]
pub fn init_tracing(config: &LogConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Plain => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry.with(fmt::layer().json().with_target(true)).try_init(),
    };
    installed.is_ok()
}
