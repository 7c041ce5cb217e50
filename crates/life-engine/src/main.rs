//! Engine binary for the Life simulation.
//!
//! Wires configuration, seeding, the operator console, and the run loop
//! together, then runs the board until a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Load configuration (first argument, `LIFE_CONFIG`, or
//!    `life-config.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the board and seed it from a pattern or a random soup
//! 4. Create operator state from simulation bounds
//! 5. Start the operator console and the interrupt handler
//! 6. Run the simulation loop
//! 7. Log the result and, optionally, the final board

mod board;
mod console;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use life_core::config::{SeedingConfig, SimulationConfig};
use life_core::operator::OperatorState;
use life_core::runner;
use life_world::{World, WorldEvent, place_pattern, scatter};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::board::{BoardCallback, BoardStats};
use crate::error::EngineError;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "LIFE_CONFIG";

/// Configuration file looked up in the working directory.
const DEFAULT_CONFIG_FILE: &str = "life-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("life-engine starting");
    if let Some(path) = source {
        info!(path = %path.display(), "Configuration loaded");
    } else {
        info!("Config file not found, using defaults");
    }

    // 3. Create and seed the board.
    let bounds = config.world.bounds()?;
    let mut world = World::new(bounds);
    if config.logging.log_events {
        world.subscribe(|event: &WorldEvent| debug!(?event, "World event"));
    }
    let seeded = seed_world(&mut world, &config.seeding, config.world.seed)?;
    info!(%bounds, seeded, "Board ready");

    // 4. Create operator state.
    let operator = Arc::new(OperatorState::new(&config.simulation));
    info!(
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Operator state initialized"
    );

    // 5. Operator console and interrupt handler.
    let stats = Arc::new(BoardStats::from_world(&world));
    let _console = console::spawn_console(Arc::clone(&operator), Arc::clone(&stats));
    spawn_interrupt_handler(Arc::clone(&operator));

    // 6. Run the simulation.
    let mut callback = BoardCallback::new(stats);
    let result =
        runner::run_simulation(&mut world, &operator, &config.simulation, &mut callback).await?;

    // 7. Log results.
    runner::log_simulation_end(&result);
    if config.logging.final_snapshot {
        let snapshot = serde_json::to_string(&world.snapshot()).map_err(EngineError::from)?;
        info!(snapshot = %snapshot, "Final board");
    }

    info!(
        end_reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        "life-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration.
///
/// The path comes from the first argument, then `LIFE_CONFIG`, then
/// `life-config.yaml` in the working directory. Returns the path actually
/// read, or `None` when no file exists and defaults are used.
fn load_config() -> Result<(SimulationConfig, Option<PathBuf>), EngineError> {
    let explicit = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os(CONFIG_ENV))
        .map(PathBuf::from);

    let Some(path) = config_path(explicit, Path::new(DEFAULT_CONFIG_FILE)) else {
        return Ok((SimulationConfig::default(), None));
    };

    let config = SimulationConfig::from_file(&path)?;
    Ok((config, Some(path)))
}

/// Pick the configuration file: an explicit path always wins, otherwise
/// `fallback` if it exists.
fn config_path(explicit: Option<PathBuf>, fallback: &Path) -> Option<PathBuf> {
    explicit.or_else(|| fallback.exists().then(|| fallback.to_path_buf()))
}

/// Populate the board before the first tick.
///
/// A non-zero `fill_percent` scatters a reproducible soup from `seed`;
/// otherwise the configured pattern is placed, unless it is `none`.
fn seed_world(world: &mut World, seeding: &SeedingConfig, seed: u64) -> Result<usize, EngineError> {
    if seeding.fill_percent > 0 {
        let mut rng = StdRng::seed_from_u64(seed);
        return Ok(scatter(world, seeding.fill_percent, &mut rng)?);
    }

    if seeding.is_empty_board() {
        return Ok(0);
    }

    let pattern =
        life_world::pattern(&seeding.pattern).ok_or_else(|| EngineError::UnknownPattern {
            key: seeding.pattern.clone(),
        })?;
    Ok(place_pattern(world, pattern)?)
}

/// Turn Ctrl-C into a clean operator stop.
fn spawn_interrupt_handler(operator: Arc<OperatorState>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping");
                operator.request_stop();
            }
            Err(e) => warn!(error = %e, "failed to listen for interrupt"),
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use life_world::Bounds;

    use super::*;

    fn world() -> World {
        World::new(Bounds::new(20, 20).unwrap())
    }

    #[test]
    fn explicit_config_path_wins() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
        let chosen = config_path(Some(PathBuf::from("custom.yaml")), manifest);
        assert_eq!(chosen, Some(PathBuf::from("custom.yaml")));
    }

    #[test]
    fn missing_fallback_means_defaults() {
        let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
        assert_eq!(config_path(None, &manifest.join("no-such-config.yaml")), None);
        assert_eq!(
            config_path(None, &manifest.join("Cargo.toml")),
            Some(manifest.join("Cargo.toml"))
        );
    }

    #[test]
    fn seeds_named_pattern() {
        let mut w = world();
        let seeding = SeedingConfig {
            pattern: "Toad".to_owned(),
            fill_percent: 0,
        };
        assert_eq!(seed_world(&mut w, &seeding, 1).unwrap(), 6);
        assert_eq!(w.population(), 6);
    }

    #[test]
    fn soup_takes_precedence_and_is_reproducible() {
        let seeding = SeedingConfig {
            pattern: "glider".to_owned(),
            fill_percent: 30,
        };
        let mut a = world();
        let mut b = world();
        seed_world(&mut a, &seeding, 9).unwrap();
        seed_world(&mut b, &seeding, 9).unwrap();
        assert_eq!(a.live_positions(), b.live_positions());
    }

    #[test]
    fn none_leaves_board_empty() {
        let mut w = world();
        let seeding = SeedingConfig {
            pattern: "none".to_owned(),
            fill_percent: 0,
        };
        assert_eq!(seed_world(&mut w, &seeding, 1).unwrap(), 0);
        assert!(w.is_empty());
    }

    #[test]
    fn unknown_pattern_is_an_error() {
        let mut w = world();
        let seeding = SeedingConfig {
            pattern: "spaceship".to_owned(),
            fill_percent: 0,
        };
        assert!(matches!(
            seed_world(&mut w, &seeding, 1),
            Err(EngineError::UnknownPattern { .. })
        ));
    }
}
