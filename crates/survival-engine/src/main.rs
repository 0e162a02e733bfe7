//! # Survival Engine
//!
//! Headless entry point for Tiny Survival World.
//!
//! This binary ties the subsystems together:
//! - World: seeded generation, chunk streaming and idle eviction
//! - Gameplay: the continuous game clock

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod error;
mod world;

use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("survival=info".parse()?))
        .init();

    info!("Tiny Survival World starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = EngineConfig::config_path();
    let mut config = EngineConfig::load_from(&path);
    config.validate();
    if !path.exists() {
        if let Err(e) = config.save_to(&path) {
            warn!("Could not write default config: {e}");
        }
    }

    let report = app::run(&config)?;
    info!("Terrain around spawn (seed {}):", report.seed);
    for (kind, count) in report.histogram.iter() {
        info!("  {:<14} {count}", kind.display_name());
    }
    info!(
        "Walked from ({:.1}, {:.1}) to ({:.1}, {:.1}) over {} ticks",
        report.spawn.x,
        report.spawn.y,
        report.final_position.0,
        report.final_position.1,
        report.ticks
    );
    info!(
        "{} chunks generated, peak {} loaded, {} evicted, {} clock transitions",
        report.chunks_generated, report.peak_loaded, report.chunks_evicted, report.transitions
    );

    info!("Tiny Survival World shutdown complete");
    Ok(())
}
