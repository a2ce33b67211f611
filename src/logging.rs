//! Tracing subscriber setup for applications embedding Mosaic

use anyhow::Context;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Install a global fmt subscriber that logs up to `max_level`.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(max_level: Level) -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

/// Like [`init_logging`], but honours `RUST_LOG` when it is set.
pub fn init_logging_from_env(default_level: Level) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}
