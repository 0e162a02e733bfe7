//! Application lifecycle management.
//!
//! Headless session loop tying the world and the game clock together.

use std::time::Instant;

use survival_gameplay::{TimeManager, TimeTransition};
use survival_world::SpawnPoint;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::SurvivalResult;
use crate::world::{EvictionWorker, TerrainHistogram, WorldSession};

/// Summary of a finished session.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// World seed used
    pub seed: u64,
    /// Spawn point chosen at startup
    pub spawn: SpawnPoint,
    /// Ticks simulated
    pub ticks: u32,
    /// Player position at shutdown
    pub final_position: (f32, f32),
    /// Chunks generated over the session
    pub chunks_generated: usize,
    /// Most chunks resident at once
    pub peak_loaded: usize,
    /// Chunks evicted by the background sweeper
    pub chunks_evicted: usize,
    /// Clock transitions observed
    pub transitions: usize,
    /// Terrain around spawn at shutdown
    pub histogram: TerrainHistogram,
}

/// Runs a session with the given configuration.
pub fn run(config: &EngineConfig) -> SurvivalResult<SessionReport> {
    let seed = config.resolve_seed();
    info!("World seed: {seed}");

    let mut clock = TimeManager::new();
    info!(
        "Game time {} ({}), light {:.2}",
        clock.formatted_date_time(),
        clock.current_time_of_day().display_name(),
        clock.light_intensity()
    );

    let mut session = WorldSession::new(seed, config)?;
    session.preload(config.preload_radius)?;

    let eviction = EvictionWorker::spawn(session.manager().clone(), config.sweep_interval())?;

    let started = Instant::now();
    let tick_interval = config.tick_interval();
    let mut peak_loaded = session.manager().loaded_chunk_count();
    let mut transitions = 0;

    for tick in 0..config.session_ticks {
        let tick_start = Instant::now();

        session.tick();
        peak_loaded = peak_loaded.max(session.manager().loaded_chunk_count());

        for transition in clock.update() {
            transitions += 1;
            log_transition(transition, &clock);
        }

        if tick % 100 == 0 {
            let (x, y) = session.position();
            debug!(
                "Tick {tick}: player at ({x:.1}, {y:.1}), {} chunks loaded, {} evicted",
                session.manager().loaded_chunk_count(),
                eviction.evicted()
            );
        }

        if let Some(remaining) = tick_interval.checked_sub(tick_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    let chunks_evicted = eviction.shutdown()?;
    let histogram = session.spawn_area_histogram(config.preload_radius);

    let manager = session.manager();
    let report = SessionReport {
        seed,
        spawn: session.spawn(),
        ticks: config.session_ticks,
        final_position: session.position(),
        chunks_generated: manager.generated_count(),
        peak_loaded,
        chunks_evicted,
        transitions,
        histogram,
    };
    manager.unload_all_chunks();

    info!("Session finished in {:.2?}", started.elapsed());
    Ok(report)
}

fn log_transition(transition: TimeTransition, clock: &TimeManager) {
    match transition {
        TimeTransition::DayChanged(_) => info!(
            "{} ({:.1}h of daylight)",
            transition.description(),
            clock.daylight_hours()
        ),
        TimeTransition::TimeOfDayChanged(_) => info!(
            "{}, light {:.2}",
            transition.description(),
            clock.light_intensity()
        ),
        TimeTransition::HourChanged(_) => debug!("{}", transition.description()),
    }
}
