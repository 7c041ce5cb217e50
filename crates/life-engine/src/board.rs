//! Tick callback that publishes board statistics and renders the board.
//!
//! After each tick, [`BoardCallback`] stores the generation and population
//! in a shared [`BoardStats`] (read by the operator console) and, when
//! trace logging is enabled, logs the whole board as text.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use life_core::runner::TickCallback;
use life_world::{Position, TickSummary, World};
use tracing::{Level, debug, trace};

/// Glyph for a live cell.
const LIVE: char = '#';
/// Glyph for an empty cell.
const DEAD: char = '.';

/// Latest board figures, shared between the run loop and the console.
#[derive(Debug, Default)]
pub struct BoardStats {
    generation: AtomicU64,
    population: AtomicUsize,
}

impl BoardStats {
    /// Stats seeded from the board as it stands.
    pub fn from_world(world: &World) -> Self {
        let stats = Self::default();
        stats.update(world.generation(), world.population());
        stats
    }

    /// Record the figures of the latest generation.
    pub fn update(&self, generation: u64, population: usize) {
        self.generation.store(generation, Ordering::Release);
        self.population.store(population, Ordering::Release);
    }

    /// Generation of the last recorded board.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Population of the last recorded board.
    pub fn population(&self) -> usize {
        self.population.load(Ordering::Acquire)
    }
}

/// Callback that bridges the run loop to the console and the log.
pub struct BoardCallback {
    stats: Arc<BoardStats>,
}

impl BoardCallback {
    /// Create a callback publishing into `stats`.
    pub const fn new(stats: Arc<BoardStats>) -> Self {
        Self { stats }
    }
}

impl TickCallback for BoardCallback {
    fn on_tick(&mut self, summary: &TickSummary, world: &World) {
        self.stats.update(summary.generation, summary.population);

        debug!(
            generation = summary.generation,
            population = summary.population,
            births = summary.births.len(),
            deaths = summary.deaths.len(),
            "Tick complete"
        );

        if tracing::enabled!(Level::TRACE) {
            trace!(generation = summary.generation, "\n{}", render(world));
        }
    }
}

/// Draw the board as rows of text, top row first.
pub fn render(world: &World) -> String {
    let bounds = world.bounds();
    let mut out = String::new();
    for y in 0..bounds.height() {
        for x in 0..bounds.width() {
            out.push(if world.is_alive(Position::new(x, y)) {
                LIVE
            } else {
                DEAD
            });
        }
        out.push('\n');
    }
    out
}
