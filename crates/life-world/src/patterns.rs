//! Built-in seed patterns and random soups.
//!
//! Pattern cells are offsets from the board centre; placement wraps them
//! onto the torus with [`Position::from_offset`], so a pattern larger than
//! the board folds over itself rather than failing.

use rand::Rng;
use tracing::info;

use crate::error::WorldError;
use crate::position::{Offset, Position};
use crate::world::World;

/// A named arrangement of live cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pattern {
    /// Lookup key, lower case.
    pub key: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Live cells as offsets from the placement origin.
    pub cells: &'static [Offset],
}

/// 2x2 still life.
pub const BLOCK: Pattern = Pattern {
    key: "block",
    name: "Block",
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

/// Six-cell still life.
pub const BEEHIVE: Pattern = Pattern {
    key: "beehive",
    name: "Beehive",
    cells: &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (2, 2)],
};

/// Period-2 oscillator, three in a row.
pub const BLINKER: Pattern = Pattern {
    key: "blinker",
    name: "Blinker",
    cells: &[(0, 1), (1, 1), (2, 1)],
};

/// Period-2 oscillator, two offset rows of three.
pub const TOAD: Pattern = Pattern {
    key: "toad",
    name: "Toad",
    cells: &[(0, 1), (1, 1), (2, 1), (1, 0), (2, 0), (3, 0)],
};

/// The smallest spaceship; moves one cell diagonally every 4 generations.
pub const GLIDER: Pattern = Pattern {
    key: "glider",
    name: "Glider",
    cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
};

/// Period-3 oscillator, 48 cells in a 13x13 box.
#[rustfmt::skip]
pub const PULSAR: Pattern = Pattern {
    key: "pulsar",
    name: "Pulsar",
    cells: &[
        (2, 0), (3, 0), (4, 0), (8, 0), (9, 0), (10, 0),
        (0, 2), (5, 2), (7, 2), (12, 2),
        (0, 3), (5, 3), (7, 3), (12, 3),
        (0, 4), (5, 4), (7, 4), (12, 4),
        (2, 5), (3, 5), (4, 5), (8, 5), (9, 5), (10, 5),
        (2, 7), (3, 7), (4, 7), (8, 7), (9, 7), (10, 7),
        (0, 8), (5, 8), (7, 8), (12, 8),
        (0, 9), (5, 9), (7, 9), (12, 9),
        (0, 10), (5, 10), (7, 10), (12, 10),
        (2, 12), (3, 12), (4, 12), (8, 12), (9, 12), (10, 12),
    ],
};

/// Period-15 oscillator.
#[rustfmt::skip]
pub const PENTADECATHLON: Pattern = Pattern {
    key: "pentadecathlon",
    name: "Penta-Decathlon",
    cells: &[
        (0, 0), (1, 0), (2, 0),
        (0, 1), (2, 1),
        (0, 2), (1, 2), (2, 2),
        (0, 3), (1, 3), (2, 3),
        (0, 4), (1, 4), (2, 4),
        (0, 5), (1, 5), (2, 5),
        (0, 6), (2, 6),
        (0, 7), (1, 7), (2, 7),
    ],
};

/// Every built-in pattern.
pub const PATTERNS: &[Pattern] = &[BLOCK, BEEHIVE, BLINKER, TOAD, GLIDER, PULSAR, PENTADECATHLON];

/// Look up a built-in pattern by key, ignoring case.
pub fn pattern(key: &str) -> Option<&'static Pattern> {
    PATTERNS.iter().find(|p| p.key.eq_ignore_ascii_case(key))
}

/// Clear the board and lay `pattern` out around its centre.
///
/// Subscribers stay attached. Returns the number of cells placed, which is
/// lower than the pattern size only if the pattern wraps onto itself.
///
/// # Errors
///
/// Propagates errors from [`World::spawn_cell`].
pub fn place_pattern(world: &mut World, pattern: &Pattern) -> Result<usize, WorldError> {
    world.clear();
    let bounds = world.bounds();
    let center = bounds.center();

    let mut placed: usize = 0;
    for &offset in pattern.cells {
        if world.spawn_cell(Position::from_offset(center, bounds, offset))? {
            placed = placed.saturating_add(1);
        }
    }

    info!(pattern = pattern.key, placed, %center, "pattern placed");
    Ok(placed)
}

/// Clear the board and fill roughly `fill_percent` of it at random.
///
/// Values above 100 are treated as 100.
///
/// # Errors
///
/// Propagates errors from [`World::spawn_cell`].
pub fn scatter<R: Rng + ?Sized>(
    world: &mut World,
    fill_percent: u32,
    rng: &mut R,
) -> Result<usize, WorldError> {
    world.clear();
    let bounds = world.bounds();
    let fill_percent = fill_percent.min(100);

    let mut placed: usize = 0;
    for y in 0..bounds.height() {
        for x in 0..bounds.width() {
            if rng.random_ratio(fill_percent, 100) && world.spawn_cell(Position::new(x, y))? {
                placed = placed.saturating_add(1);
            }
        }
    }

    info!(fill_percent, placed, "random soup scattered");
    Ok(placed)
}
