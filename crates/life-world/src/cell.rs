//! A live cell and its view of the surrounding Moore neighbourhood.
//!
//! Cells live in the [`World`]'s arena and hold no references to it or to
//! each other. The world keeps every cell's neighbour set current by sending
//! it explicit messages ([`Cell::on_neighbour_spawned`],
//! [`Cell::on_neighbour_removed`]) whenever a position in the cell's local
//! area gains or loses an occupant.
//!
//! # Expiry rule
//!
//! A cell with fewer than 2 or more than 3 live neighbours is marked to
//! expire. [`Cell::tick`] acts on the mark computed *before* the call and
//! only then re-evaluates it, so a cell aged after its neighbours in the same
//! pass still decides on the pre-tick neighbourhood.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::position::{Bounds, MOORE_OFFSETS, Position};
use crate::world::World;

/// Why a cell left the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Fewer than 2 live neighbours.
    Underpopulation,
    /// More than 3 live neighbours.
    Overpopulation,
    /// Taken off the board through [`World::remove_cell`].
    Removed,
}

impl DeathCause {
    /// Apply the survival rule to a neighbour count.
    ///
    /// Returns `None` for 2 or 3 neighbours.
    pub const fn for_neighbour_count(count: usize) -> Option<Self> {
        match count {
            0 | 1 => Some(Self::Underpopulation),
            2 | 3 => None,
            _ => Some(Self::Overpopulation),
        }
    }
}

/// One live cell at a fixed position.
#[derive(Debug)]
pub struct Cell {
    position: Position,
    bounds: Bounds,
    /// The 8 wrapped Moore positions, fixed at construction.
    local_area: [Position; 8],
    /// Positions in `local_area` known to hold a live cell.
    neighbours: BTreeSet<Position>,
    expires_next_tick: Option<DeathCause>,
}

impl Cell {
    /// Build a cell at `position` against the current state of `world`.
    ///
    /// The position is wrapped into the world's bounds. The neighbour set is
    /// seeded from the cells currently live around it, and the expiry rule is
    /// evaluated immediately, so a fresh cell already knows whether its first
    /// aging step kills it.
    ///
    /// The cell does not join the world until passed to [`World::add_cell`].
    pub fn new(position: Position, world: &World) -> Self {
        let bounds = world.bounds();
        let position = bounds.wrap(position);
        let local_area = MOORE_OFFSETS.map(|offset| Position::from_offset(position, bounds, offset));

        let mut cell = Self {
            position,
            bounds,
            local_area,
            neighbours: BTreeSet::new(),
            expires_next_tick: None,
        };
        cell.sync_neighbours(world);
        cell
    }

    /// The cell's fixed position.
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Bounds of the world the cell was built for.
    pub const fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The 8 toroidally wrapped positions around the cell.
    pub const fn local_area(&self) -> &[Position; 8] {
        &self.local_area
    }

    /// Positions of the live neighbours the cell is tracking.
    pub const fn neighbours(&self) -> &BTreeSet<Position> {
        &self.neighbours
    }

    /// Number of tracked live neighbours.
    pub fn neighbour_count(&self) -> usize {
        self.neighbours.len()
    }

    /// The death the next [`tick`](Self::tick) will deliver, if any.
    pub const fn expires_next_tick(&self) -> Option<DeathCause> {
        self.expires_next_tick
    }

    /// Local-area positions not held by a tracked neighbour.
    ///
    /// These are the birth candidates this cell contributes to.
    pub fn spawn_area(&self) -> BTreeSet<Position> {
        self.local_area
            .iter()
            .filter(|position| !self.neighbours.contains(position))
            .copied()
            .collect()
    }

    /// Age the cell by one generation.
    ///
    /// Returns the cause of death if the cell was marked to expire, then
    /// re-evaluates the mark from the current neighbour count.
    pub fn tick(&mut self) -> Option<DeathCause> {
        let fate = self.expires_next_tick;
        self.refresh_expiry();
        fate
    }

    /// A cell appeared at `position`.
    ///
    /// Tracked only if `position` is in the local area. The expiry rule is
    /// re-evaluated either way.
    pub fn on_neighbour_spawned(&mut self, position: Position) {
        if position != self.position && self.local_area.contains(&position) {
            self.neighbours.insert(position);
        }
        self.refresh_expiry();
    }

    /// The cell at `position` died or was removed.
    pub fn on_neighbour_removed(&mut self, position: Position) {
        if self.neighbours.remove(&position) {
            self.refresh_expiry();
        }
    }

    /// Rebuild the neighbour set from the world's live index.
    pub(crate) fn sync_neighbours(&mut self, world: &World) {
        self.neighbours = self
            .local_area
            .iter()
            .filter(|position| world.is_alive(**position))
            .copied()
            .collect();
        self.refresh_expiry();
    }

    fn refresh_expiry(&mut self) {
        self.expires_next_tick = DeathCause::for_neighbour_count(self.neighbours.len());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn world(width: i32, height: i32) -> World {
        World::new(Bounds::new(width, height).unwrap())
    }

    fn populate(world: &mut World, positions: &[(i32, i32)]) {
        for &(x, y) in positions {
            let cell = Cell::new(Position::new(x, y), world);
            world.add_cell(cell).unwrap();
        }
    }

    #[test]
    fn local_area_wraps_around_edges() {
        let w = world(3, 3);
        let cell = Cell::new(Position::new(0, 0), &w);
        let area: BTreeSet<Position> = cell.local_area().iter().copied().collect();
        let expected: BTreeSet<Position> = [
            (0, 1),
            (0, 2),
            (1, 0),
            (1, 1),
            (1, 2),
            (2, 0),
            (2, 1),
            (2, 2),
        ]
        .into_iter()
        .map(|(x, y)| Position::new(x, y))
        .collect();
        assert_eq!(area, expected);
    }

    #[test]
    fn construction_wraps_position() {
        let w = world(3, 3);
        let cell = Cell::new(Position::new(-1, 4), &w);
        assert_eq!(cell.position(), Position::new(2, 1));
    }

    #[test]
    fn spawn_area_excludes_neighbours() {
        let mut w = world(3, 3);
        populate(&mut w, &[(0, 1), (2, 1)]);
        let cell = Cell::new(Position::new(1, 1), &w);

        let spawn_area: Vec<Position> = cell.spawn_area().into_iter().collect();
        assert_eq!(
            spawn_area,
            vec![
                Position::new(0, 0),
                Position::new(0, 2),
                Position::new(1, 0),
                Position::new(1, 2),
                Position::new(2, 0),
                Position::new(2, 2),
            ]
        );
    }

    #[test]
    fn neighbours_seeded_from_live_index() {
        let mut w = world(6, 6);
        // (5, 5) borders (0, 0) across both edges.
        populate(&mut w, &[(1, 0), (5, 5), (3, 3)]);
        let cell = Cell::new(Position::new(0, 0), &w);
        assert_eq!(cell.neighbour_count(), 2);
        assert!(cell.neighbours().contains(&Position::new(5, 5)));
        assert!(!cell.neighbours().contains(&Position::new(3, 3)));
    }

    #[test]
    fn lonely_cell_expires() {
        let w = world(3, 3);
        let mut cell = Cell::new(Position::new(0, 0), &w);
        assert_eq!(cell.tick(), Some(DeathCause::Underpopulation));
    }

    #[test]
    fn crowded_cell_expires() {
        let mut w = world(5, 5);
        populate(&mut w, &[(1, 0), (4, 0), (0, 1), (1, 1)]);
        let mut cell = Cell::new(Position::new(0, 0), &w);
        assert_eq!(cell.neighbour_count(), 4);
        assert_eq!(cell.tick(), Some(DeathCause::Overpopulation));
    }

    #[test]
    fn survives_with_two_or_three_neighbours() {
        for neighbours in [&[(2, 1), (2, 3)][..], &[(1, 1), (2, 3)][..], &[(1, 1), (2, 3), (3, 3)][..]] {
            let mut w = world(5, 5);
            populate(&mut w, &[(2, 2)]);
            populate(&mut w, neighbours);
            let cell = w.cell_mut(Position::new(2, 2)).unwrap();
            assert_eq!(cell.tick(), None);
        }
    }

    #[test]
    fn tick_acts_on_previous_evaluation() {
        let w = world(5, 5);
        let mut cell = Cell::new(Position::new(2, 2), &w);
        assert_eq!(cell.expires_next_tick(), Some(DeathCause::Underpopulation));

        // Neighbours arriving re-evaluate the mark straight away.
        cell.on_neighbour_spawned(Position::new(1, 2));
        cell.on_neighbour_spawned(Position::new(3, 2));
        assert_eq!(cell.expires_next_tick(), None);
        assert_eq!(cell.tick(), None);
    }

    #[test]
    fn spawn_outside_local_area_is_ignored() {
        let w = world(6, 6);
        let mut cell = Cell::new(Position::new(2, 2), &w);
        cell.on_neighbour_spawned(Position::new(4, 4));
        cell.on_neighbour_spawned(Position::new(2, 2));
        assert_eq!(cell.neighbour_count(), 0);
    }

    #[test]
    fn removed_neighbour_is_pruned() {
        let mut w = world(5, 5);
        populate(&mut w, &[(1, 2), (3, 2)]);
        let mut cell = Cell::new(Position::new(2, 2), &w);
        assert_eq!(cell.neighbour_count(), 2);

        cell.on_neighbour_removed(Position::new(1, 2));
        assert_eq!(cell.neighbour_count(), 1);
        assert_eq!(cell.expires_next_tick(), Some(DeathCause::Underpopulation));
    }

    #[test]
    fn survival_rule_thresholds() {
        assert_eq!(DeathCause::for_neighbour_count(0), Some(DeathCause::Underpopulation));
        assert_eq!(DeathCause::for_neighbour_count(1), Some(DeathCause::Underpopulation));
        assert_eq!(DeathCause::for_neighbour_count(2), None);
        assert_eq!(DeathCause::for_neighbour_count(3), None);
        assert_eq!(DeathCause::for_neighbour_count(4), Some(DeathCause::Overpopulation));
        assert_eq!(DeathCause::for_neighbour_count(8), Some(DeathCause::Overpopulation));
    }
}
