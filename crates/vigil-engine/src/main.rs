//! # Vigil
//!
//! Headless runner for the Vigil auto-battler.
//!
//! Loads `vigil.toml` (or the path given as the first argument), resumes the
//! stored snapshot, plays the configured session with its scripted commands
//! and saves on exit.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod config;
mod file_store;
mod session;
mod timing;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{EngineConfig, CONFIG_FILE};
use crate::file_store::FileSnapshotStore;
use crate::session::Session;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("vigil=info".parse()?))
        .init();

    info!("Vigil starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let config = EngineConfig::load_or_create(&config_path);

    let save_dir = config.save.resolved_dir();
    info!("Snapshots in {}", save_dir.display());
    let store = FileSnapshotStore::new(&save_dir);

    let summary = Session::new(&config, store)
        .run()
        .with_context(|| format!("Session failed (snapshots in {})", save_dir.display()))?;

    info!(
        "Vigil shutdown complete: level {}, stage {}, {} gold after {:.1}s",
        summary.level, summary.stage, summary.gold, summary.sim_seconds
    );
    Ok(())
}
