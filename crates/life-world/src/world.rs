//! The sparse toroidal board.
//!
//! [`World`] owns every live [`Cell`] in an arena keyed by [`Position`]. It is
//! the single source of truth for occupancy: cells only ever learn about
//! their neighbours through messages the world sends while admitting or
//! evicting cells.
//!
//! # Generation advance
//!
//! [`World::tick`] applies the classic simultaneous update in four steps:
//!
//! 1. Snapshot the birth candidates ([`World::spawn_positions`]) from the
//!    pre-tick board.
//! 2. Age every cell, collecting death decisions without touching the arena.
//! 3. Evict the dead and tell their neighbours.
//! 4. Admit a new cell at every snapshot candidate.
//!
//! # Notifications
//!
//! Subscribers implement [`WorldListener`] and receive every [`WorldEvent`]
//! synchronously, in subscription order, before the emitting call returns.
//! Listeners only see `&WorldEvent`, so they cannot mutate the world from
//! inside a notification.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::cell::{Cell, DeathCause};
use crate::error::WorldError;
use crate::position::{Bounds, Position};

/// Something that happened on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorldEvent {
    /// A cell joined the world.
    CellSpawned {
        /// Where the cell was admitted.
        position: Position,
    },
    /// A cell died, by rule or by removal.
    CellDied {
        /// Where the cell lived.
        position: Position,
        /// Why it died.
        cause: DeathCause,
    },
    /// A cell was taken off the board by [`World::remove_cell`].
    CellRemoved {
        /// The vacated position.
        position: Position,
    },
    /// Every cell was cleared at once.
    Cleared {
        /// Number of cells that were live.
        removed: usize,
    },
}

impl WorldEvent {
    /// The position the event concerns, if it concerns a single cell.
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::CellSpawned { position }
            | Self::CellDied { position, .. }
            | Self::CellRemoved { position } => Some(*position),
            Self::Cleared { .. } => None,
        }
    }
}

/// Receiver of [`WorldEvent`] notifications.
pub trait WorldListener: Send {
    /// Called synchronously for every event, in subscription order.
    fn on_event(&mut self, event: &WorldEvent);
}

impl<F> WorldListener for F
where
    F: FnMut(&WorldEvent) + Send,
{
    fn on_event(&mut self, event: &WorldEvent) {
        self(event);
    }
}

/// Handle returned by [`World::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// A cell that died during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellDeath {
    /// Where the cell lived.
    pub position: Position,
    /// Why it died.
    pub cause: DeathCause,
}

/// Outcome of one [`World::tick`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    /// The generation the board is in after the tick.
    pub generation: u64,
    /// Positions where cells were born.
    pub births: Vec<Position>,
    /// Cells that died.
    pub deaths: Vec<CellDeath>,
    /// Live cells after the tick.
    pub population: usize,
}

/// Serializable view of the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Board extent.
    pub bounds: Bounds,
    /// Current generation.
    pub generation: u64,
    /// Live positions, sorted.
    pub cells: Vec<Position>,
}

/// The sparse board: bounds, live cells, and subscribers.
pub struct World {
    bounds: Bounds,
    /// Live cells by position. At most one per position.
    cells: BTreeMap<Position, Cell>,
    generation: u64,
    listeners: BTreeMap<ListenerId, Box<dyn WorldListener>>,
    next_listener_id: u64,
}

impl World {
    /// Create an empty world.
    pub const fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            cells: BTreeMap::new(),
            generation: 0,
            listeners: BTreeMap::new(),
            next_listener_id: 0,
        }
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The fixed board extent.
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of completed ticks since creation or the last reset.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.len()
    }

    /// Whether the board is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Whether a live cell occupies `position`.
    pub fn is_alive(&self, position: Position) -> bool {
        self.cells.contains_key(&position)
    }

    /// The live cell at `position`.
    pub fn cell(&self, position: Position) -> Option<&Cell> {
        self.cells.get(&position)
    }

    /// Iterate over live cells in position order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Live positions in sorted order.
    pub fn live_positions(&self) -> Vec<Position> {
        self.cells.keys().copied().collect()
    }

    /// A serializable copy of the board.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            bounds: self.bounds,
            generation: self.generation,
            cells: self.live_positions(),
        }
    }

    /// Number of attached subscribers.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    // -------------------------------------------------------------------
    // Subscriptions
    // -------------------------------------------------------------------

    /// Attach a listener. It receives every event from now until it is
    /// unsubscribed or the world is [`reset`](Self::reset).
    pub fn subscribe(&mut self, listener: impl WorldListener + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id = self.next_listener_id.saturating_add(1);
        self.listeners.insert(id, Box::new(listener));
        id
    }

    /// Detach a listener. Returns `false` if it was not attached.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    fn emit(&mut self, event: &WorldEvent) {
        trace!(?event, "world event");
        for listener in self.listeners.values_mut() {
            listener.on_event(event);
        }
    }

    // -------------------------------------------------------------------
    // Membership
    // -------------------------------------------------------------------

    /// Admit a cell.
    ///
    /// The cell's neighbour set is re-synchronised with the board, each
    /// neighbour is told about the newcomer, and [`WorldEvent::CellSpawned`]
    /// is broadcast.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Occupied`] if a live cell already holds the
    /// position, or [`WorldError::BoundsMismatch`] if the cell was built for
    /// a world of different bounds.
    pub fn add_cell(&mut self, mut cell: Cell) -> Result<(), WorldError> {
        if cell.bounds() != self.bounds {
            return Err(WorldError::BoundsMismatch {
                expected: self.bounds,
                found: cell.bounds(),
            });
        }
        let position = cell.position();
        if self.cells.contains_key(&position) {
            return Err(WorldError::Occupied(position));
        }

        // Cells admitted since this one was built are not in its seed set.
        cell.sync_neighbours(self);
        for neighbour in cell.neighbours() {
            if let Some(peer) = self.cells.get_mut(neighbour) {
                peer.on_neighbour_spawned(position);
            }
        }
        self.cells.insert(position, cell);

        self.emit(&WorldEvent::CellSpawned { position });
        Ok(())
    }

    /// Take the cell at `position` off the board.
    ///
    /// This is the only way to remove a live cell outside of the rules. The
    /// removal is reported as a death ([`DeathCause::Removed`]) followed by
    /// [`WorldEvent::CellRemoved`]. Returns `None` if the position was empty.
    pub fn remove_cell(&mut self, position: Position) -> Option<Cell> {
        let cell = self.evict(position)?;
        self.emit(&WorldEvent::CellDied {
            position,
            cause: DeathCause::Removed,
        });
        self.emit(&WorldEvent::CellRemoved { position });
        Some(cell)
    }

    /// Build and admit a cell at `position` unless one is already live there.
    ///
    /// Returns `true` if a cell was added.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`add_cell`](Self::add_cell).
    pub fn spawn_cell(&mut self, position: Position) -> Result<bool, WorldError> {
        let position = self.bounds.wrap(position);
        if self.is_alive(position) {
            return Ok(false);
        }
        let cell = Cell::new(position, self);
        self.add_cell(cell)?;
        Ok(true)
    }

    /// Remove the cell at `position` if one is live, otherwise add one.
    ///
    /// Returns whether the position is live afterwards.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`add_cell`](Self::add_cell).
    pub fn toggle_cell(&mut self, position: Position) -> Result<bool, WorldError> {
        let position = self.bounds.wrap(position);
        if self.remove_cell(position).is_some() {
            return Ok(false);
        }
        self.spawn_cell(position)
    }

    /// Remove every cell, keeping subscribers attached.
    pub fn clear(&mut self) {
        let removed = self.cells.len();
        self.cells.clear();
        debug!(removed, "world cleared");
        self.emit(&WorldEvent::Cleared { removed });
    }

    /// Restart the simulation: remove every cell, rewind the generation
    /// counter, and detach all subscribers.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.listeners.clear();
        self.generation = 0;
        debug!("world reset");
    }

    fn evict(&mut self, position: Position) -> Option<Cell> {
        let cell = self.cells.remove(&position)?;
        for neighbour in cell.neighbours() {
            if let Some(peer) = self.cells.get_mut(neighbour) {
                peer.on_neighbour_removed(position);
            }
        }
        Some(cell)
    }

    // -------------------------------------------------------------------
    // Generation advance
    // -------------------------------------------------------------------

    /// Empty positions bordered by exactly 3 live cells.
    ///
    /// Each live cell contributes its [`spawn_area`](Cell::spawn_area) to a
    /// tally of how many distinct cells border every empty position.
    pub fn spawn_positions(&self) -> BTreeSet<Position> {
        let mut tally: BTreeMap<Position, u8> = BTreeMap::new();
        for cell in self.cells.values() {
            for position in cell.spawn_area() {
                let count = tally.entry(position).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
        tally
            .into_iter()
            .filter(|&(_, count)| count == 3)
            .map(|(position, _)| position)
            .collect()
    }

    /// Advance the board by one generation.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::GenerationOverflow`] if the generation counter
    /// would overflow. The board is left unchanged in that case.
    pub fn tick(&mut self) -> Result<TickSummary, WorldError> {
        let generation = self
            .generation
            .checked_add(1)
            .ok_or(WorldError::GenerationOverflow)?;

        let next_spawns = self.spawn_positions();

        let deaths: Vec<CellDeath> = self
            .cells
            .values_mut()
            .filter_map(|cell| {
                cell.tick().map(|cause| CellDeath {
                    position: cell.position(),
                    cause,
                })
            })
            .collect();

        for death in &deaths {
            if self.evict(death.position).is_some() {
                self.emit(&WorldEvent::CellDied {
                    position: death.position,
                    cause: death.cause,
                });
            }
        }

        let mut births = Vec::with_capacity(next_spawns.len());
        for position in next_spawns {
            if self.spawn_cell(position)? {
                births.push(position);
            }
        }

        self.generation = generation;
        debug!(
            generation,
            births = births.len(),
            deaths = deaths.len(),
            population = self.cells.len(),
            "generation advanced"
        );

        Ok(TickSummary {
            generation,
            births,
            deaths,
            population: self.cells.len(),
        })
    }

    #[cfg(test)]
    pub(crate) fn cell_mut(&mut self, position: Position) -> Option<&mut Cell> {
        self.cells.get_mut(&position)
    }
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("bounds", &self.bounds)
            .field("generation", &self.generation)
            .field("population", &self.cells.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn world(width: i32, height: i32) -> World {
        World::new(Bounds::new(width, height).unwrap())
    }

    fn world_with(width: i32, height: i32, positions: &[(i32, i32)]) -> World {
        let mut w = world(width, height);
        for &(x, y) in positions {
            let cell = Cell::new(Position::new(x, y), &w);
            w.add_cell(cell).unwrap();
        }
        w
    }

    fn positions(coords: &[(i32, i32)]) -> Vec<Position> {
        coords.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    fn recorder(world: &mut World) -> Arc<Mutex<Vec<WorldEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        world.subscribe(move |event: &WorldEvent| sink.lock().unwrap().push(event.clone()));
        events
    }

    #[test]
    fn add_cell_publishes_spawn() {
        let mut w = world(3, 3);
        let events = recorder(&mut w);

        let cell = Cell::new(Position::new(1, 1), &w);
        w.add_cell(cell).unwrap();

        assert_eq!(
            *events.lock().unwrap(),
            vec![WorldEvent::CellSpawned {
                position: Position::new(1, 1)
            }]
        );
        assert!(w.is_alive(Position::new(1, 1)));
    }

    #[test]
    fn occupied_position_rejected() {
        let mut w = world_with(4, 4, &[(1, 1)]);
        let duplicate = Cell::new(Position::new(1, 1), &w);
        assert_eq!(
            w.add_cell(duplicate).unwrap_err(),
            WorldError::Occupied(Position::new(1, 1))
        );
        assert_eq!(w.population(), 1);
    }

    #[test]
    fn foreign_cell_rejected() {
        let other = world(8, 8);
        let cell = Cell::new(Position::new(1, 1), &other);
        let mut w = world(4, 4);
        assert!(matches!(
            w.add_cell(cell),
            Err(WorldError::BoundsMismatch { .. })
        ));
    }

    #[test]
    fn neighbours_track_admissions_and_removals() {
        let mut w = world_with(5, 5, &[(2, 2), (1, 2), (3, 2)]);
        assert_eq!(w.cell(Position::new(2, 2)).unwrap().neighbour_count(), 2);
        assert_eq!(w.cell(Position::new(1, 2)).unwrap().neighbour_count(), 1);

        w.remove_cell(Position::new(3, 2)).unwrap();
        assert_eq!(w.cell(Position::new(2, 2)).unwrap().neighbour_count(), 1);
    }

    #[test]
    fn stale_cell_resynchronised_on_admission() {
        let mut w = world(5, 5);
        let late = Cell::new(Position::new(2, 2), &w);
        assert_eq!(late.neighbour_count(), 0);

        w.spawn_cell(Position::new(1, 2)).unwrap();
        w.spawn_cell(Position::new(3, 2)).unwrap();
        w.add_cell(late).unwrap();

        assert_eq!(w.cell(Position::new(2, 2)).unwrap().neighbour_count(), 2);
    }

    #[test]
    fn remove_reports_death_then_removal() {
        let mut w = world_with(4, 4, &[(0, 0)]);
        let events = recorder(&mut w);

        let removed = w.remove_cell(Position::new(0, 0)).unwrap();
        assert_eq!(removed.position(), Position::new(0, 0));
        assert!(w.remove_cell(Position::new(0, 0)).is_none());

        assert_eq!(
            *events.lock().unwrap(),
            vec![
                WorldEvent::CellDied {
                    position: Position::new(0, 0),
                    cause: DeathCause::Removed
                },
                WorldEvent::CellRemoved {
                    position: Position::new(0, 0)
                },
            ]
        );
    }

    #[test]
    fn removal_is_reflected_on_next_tick() {
        // Middle of a blinker loses one end: it must die next tick.
        let mut w = world_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        w.remove_cell(Position::new(3, 2)).unwrap();

        let summary = w.tick().unwrap();
        assert!(summary.deaths.contains(&CellDeath {
            position: Position::new(2, 2),
            cause: DeathCause::Underpopulation,
        }));
        assert!(w.is_empty());
    }

    #[test]
    fn toggle_and_spawn() {
        let mut w = world(4, 4);
        assert!(w.toggle_cell(Position::new(1, 1)).unwrap());
        assert!(!w.spawn_cell(Position::new(1, 1)).unwrap());
        assert!(!w.toggle_cell(Position::new(1, 1)).unwrap());
        assert!(w.is_empty());

        // Out-of-range input wraps instead of failing.
        assert!(w.spawn_cell(Position::new(5, -1)).unwrap());
        assert!(w.is_alive(Position::new(1, 3)));
    }

    #[test]
    fn spawn_positions_of_blinker() {
        let w = world_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        let spawns: Vec<Position> = w.spawn_positions().into_iter().collect();
        assert_eq!(spawns, positions(&[(2, 1), (2, 3)]));
    }

    #[test]
    fn spawn_positions_of_empty_world() {
        assert!(world(5, 5).spawn_positions().is_empty());
    }

    #[test]
    fn blinker_oscillates() {
        let mut w = world_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);

        let first = w.tick().unwrap();
        assert_eq!(w.live_positions(), positions(&[(2, 1), (2, 2), (2, 3)]));
        assert_eq!(first.generation, 1);
        assert_eq!(first.births, positions(&[(2, 1), (2, 3)]));
        assert_eq!(first.deaths.len(), 2);
        assert_eq!(first.population, 3);

        w.tick().unwrap();
        assert_eq!(w.live_positions(), positions(&[(1, 2), (2, 2), (3, 2)]));
        assert_eq!(w.generation(), 2);
    }

    #[test]
    fn tick_events_follow_order() {
        let mut w = world_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        let events = recorder(&mut w);
        w.tick().unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 4);
        assert!(matches!(events.first(), Some(WorldEvent::CellDied { .. })));
        assert!(matches!(events.get(1), Some(WorldEvent::CellDied { .. })));
        assert!(matches!(events.get(2), Some(WorldEvent::CellSpawned { .. })));
        assert!(matches!(events.get(3), Some(WorldEvent::CellSpawned { .. })));
    }

    #[test]
    fn flags_current_after_tick() {
        let mut w = world_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);
        w.tick().unwrap();
        for cell in w.cells() {
            assert_eq!(
                cell.expires_next_tick(),
                DeathCause::for_neighbour_count(cell.neighbour_count())
            );
        }
        assert_eq!(w.cell(Position::new(2, 1)).unwrap().neighbour_count(), 1);
        assert_eq!(w.cell(Position::new(2, 2)).unwrap().neighbour_count(), 2);
    }

    #[test]
    fn reset_detaches_everything() {
        let mut w = world_with(6, 6, &[(1, 1), (1, 2), (2, 1)]);
        let events = recorder(&mut w);
        w.tick().unwrap();
        assert_eq!(w.listener_count(), 1);

        w.reset();
        assert!(w.is_empty());
        assert!(w.spawn_positions().is_empty());
        assert_eq!(w.generation(), 0);
        assert_eq!(w.listener_count(), 0);

        let before = events.lock().unwrap().len();
        w.spawn_cell(Position::new(3, 3)).unwrap();
        assert_eq!(events.lock().unwrap().len(), before);
    }

    #[test]
    fn clear_keeps_listeners() {
        let mut w = world_with(6, 6, &[(1, 1), (4, 4)]);
        let events = recorder(&mut w);
        w.clear();
        assert!(w.is_empty());
        assert_eq!(w.listener_count(), 1);
        assert_eq!(
            *events.lock().unwrap(),
            vec![WorldEvent::Cleared { removed: 2 }]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut w = world(4, 4);
        let count = Arc::new(Mutex::new(0_u32));
        let sink = Arc::clone(&count);
        let id = w.subscribe(move |_: &WorldEvent| *sink.lock().unwrap() += 1);

        w.spawn_cell(Position::new(0, 0)).unwrap();
        assert!(w.unsubscribe(id));
        assert!(!w.unsubscribe(id));
        w.spawn_cell(Position::new(2, 2)).unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn snapshot_serializes() {
        let mut w = world_with(5, 5, &[(3, 2), (1, 2), (2, 2)]);
        w.tick().unwrap();
        let json = serde_json::to_value(w.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "bounds": [5, 5],
                "generation": 1,
                "cells": [{"x": 2, "y": 1}, {"x": 2, "y": 2}, {"x": 2, "y": 3}],
            })
        );
    }

    #[test]
    fn event_position() {
        let p = Position::new(1, 2);
        assert_eq!(WorldEvent::CellRemoved { position: p }.position(), Some(p));
        assert_eq!(WorldEvent::Cleared { removed: 0 }.position(), None);
    }
}
