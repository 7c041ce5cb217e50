//! Simulation loop runner with operator controls.
//!
//! This module provides [`run_simulation`], the top-level async function
//! that drives [`World::tick`] with support for:
//!
//! - **Bounded runs**: stop after `max_ticks` or `max_real_time_seconds`
//! - **Pause/resume/step**: the operator can halt the loop and advance it
//!   one generation at a time
//! - **Variable tick speed**: tick interval adjustable at runtime
//! - **End detection**: extinction and repeating boards
//! - **Operator stop**: immediate clean stop from another task

use std::sync::Arc;

use life_world::{TickSummary, World, WorldError};
use tracing::{debug, info, warn};

use crate::config::SimulationBoundsConfig;
use crate::history::StateHistory;
use crate::operator::{OperatorState, SimulationEndReason};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Advancing the board failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
///
/// Front ends use this to redraw the board or publish the summary.
pub trait TickCallback: Send {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, world: &World);
}

/// A tick callback that does nothing.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _world: &World) {}
}

/// Run the simulation loop until a termination condition is met.
///
/// Checks, in order: pause, stop request, time limit, then ticks and checks
/// extinction, repetition, and the tick limit. Extinction and repetition
/// only end the run when enabled in `bounds`.
///
/// # Errors
///
/// Returns [`RunnerError`] if the world cannot advance.
pub async fn run_simulation(
    world: &mut World,
    operator: &Arc<OperatorState>,
    bounds: &SimulationBoundsConfig,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError> {
    let mut last_summary: Option<TickSummary> = None;
    let mut total_ticks: u64 = 0;
    let mut history = bounds
        .stop_on_cycle
        .then(|| StateHistory::new(bounds.history_depth));
    if let Some(history) = history.as_mut() {
        history.record(world.live_positions());
    }

    info!(
        generation = world.generation(),
        population = world.population(),
        max_ticks = operator.max_ticks(),
        max_real_time_seconds = operator.max_real_time_seconds(),
        tick_interval_ms = operator.tick_interval_ms(),
        "Simulation starting"
    );

    loop {
        // --- Check pause ---
        if operator.is_paused() {
            info!(generation = world.generation(), "Simulation paused");
            operator.wait_if_paused().await;
            if !operator.is_paused() {
                info!("Simulation resumed");
            }
        }

        // --- Check stop request (before tick) ---
        if operator.is_stop_requested() {
            info!("Operator stop requested");
            return finish(operator, SimulationEndReason::OperatorStop, last_summary, total_ticks)
                .await;
        }

        // --- Check time limit (before tick) ---
        if operator.time_limit_reached() {
            info!(
                max_seconds = operator.max_real_time_seconds(),
                elapsed = operator.elapsed_seconds(),
                "Real-time limit reached"
            );
            return finish(
                operator,
                SimulationEndReason::MaxRealTimeReached,
                last_summary,
                total_ticks,
            )
            .await;
        }

        // --- Execute tick ---
        let summary = world.tick()?;
        total_ticks = total_ticks.saturating_add(1);

        callback.on_tick(&summary, world);

        // --- Check extinction ---
        if bounds.stop_on_extinction && summary.population == 0 {
            info!(generation = summary.generation, "Board is empty -- extinction");
            return finish(operator, SimulationEndReason::Extinction, Some(summary), total_ticks)
                .await;
        }

        // --- Check repetition ---
        if let Some(period) = history
            .as_mut()
            .and_then(|history| history.record(world.live_positions()))
        {
            info!(generation = summary.generation, period, "Board repeats");
            return finish(
                operator,
                SimulationEndReason::Stabilized { period },
                Some(summary),
                total_ticks,
            )
            .await;
        }

        // --- Check tick limit (after tick) ---
        if operator.tick_limit_reached(total_ticks) {
            info!(
                generation = summary.generation,
                max_ticks = operator.max_ticks(),
                "Tick limit reached"
            );
            return finish(
                operator,
                SimulationEndReason::MaxTicksReached,
                Some(summary),
                total_ticks,
            )
            .await;
        }

        last_summary = Some(summary);

        // --- Sleep for tick interval ---
        let interval_ms = operator.tick_interval_ms();
        if interval_ms > 0 && !operator.is_paused() {
            debug!(interval_ms, "Sleeping until next tick");
            tokio::time::sleep(tokio::time::Duration::from_millis(interval_ms)).await;
        }
    }
}

async fn finish(
    operator: &OperatorState,
    reason: SimulationEndReason,
    final_summary: Option<TickSummary>,
    total_ticks: u64,
) -> Result<SimulationResult, RunnerError> {
    operator.set_end_reason(reason.clone()).await;
    Ok(SimulationResult {
        end_reason: reason,
        final_summary,
        total_ticks,
    })
}

/// Log the simulation end sequence.
///
/// Call after [`run_simulation`] returns.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_generation = result.final_summary.as_ref().map(|s| s.generation),
        final_population = result.final_summary.as_ref().map(|s| s.population),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            generation = summary.generation,
            population = summary.population,
            births = summary.births.len(),
            deaths = summary.deaths.len(),
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
