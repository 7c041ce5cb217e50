//! Toroidal grid coordinates.
//!
//! A [`Position`] is a plain value: two positions with the same coordinates
//! are interchangeable as map keys and set members. Its canonical string key
//! is `"x,y"`, produced by [`Display`](std::fmt::Display) and parsed back by
//! [`FromStr`].
//!
//! [`Bounds`] fixes the extent of a world. All coordinate arithmetic wraps
//! modulo the bounds, so the grid has no edges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WorldError;

/// A relative `(dx, dy)` displacement.
pub type Offset = (i32, i32);

/// Relative offsets of the 8 cells in a Moore neighbourhood.
pub const MOORE_OFFSETS: [Offset; 8] = [
    (0, 1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (-1, 0),
    (-1, -1),
    (-1, 1),
];

/// Smallest extent on either axis. Below this the Moore neighbourhood of a
/// cell wraps onto itself.
pub const MIN_EXTENT: i32 = 3;

/// Failure to parse a canonical `"x,y"` position key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed position key: {key:?}")]
pub struct PositionParseError {
    /// The rejected input.
    pub key: String,
}

/// A coordinate on the toroidal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Position {
    /// Create a position from raw coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Parse a canonical `"x,y"` key.
    ///
    /// # Errors
    ///
    /// Returns [`PositionParseError`] if the key is not two integers
    /// separated by a single comma.
    pub fn from_key(key: &str) -> Result<Self, PositionParseError> {
        key.parse()
    }

    /// Floor of the straight-line distance to `other`, ignoring wrap-around.
    ///
    /// Orthogonal and diagonal neighbours are at distance 1, a position is
    /// at distance 0 from itself.
    pub fn distance_to(self, other: Self) -> u32 {
        floor_hypot(self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }

    /// Floor of the straight-line distance to `other`, measured the short
    /// way round each axis of the torus.
    ///
    /// Yields 1 for all 8 toroidal neighbours, including those across an
    /// edge.
    pub fn wrapped_distance_to(self, other: Self, bounds: Bounds) -> u32 {
        let a = bounds.wrap(self);
        let b = bounds.wrap(other);
        floor_hypot(
            shorter_way(a.x.abs_diff(b.x), bounds.width.unsigned_abs()),
            shorter_way(a.y.abs_diff(b.y), bounds.height.unsigned_abs()),
        )
    }

    /// Apply `offset` to `origin` and wrap both axes into `bounds`.
    ///
    /// Uses the Euclidean remainder, so the result lies inside the bounds
    /// for any offset, however large or negative.
    pub fn from_offset(origin: Self, bounds: Bounds, offset: Offset) -> Self {
        Self {
            x: wrap_axis(origin.x, offset.0, bounds.width),
            y: wrap_axis(origin.y, offset.1, bounds.height),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Position {
    type Err = PositionParseError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let malformed = || PositionParseError {
            key: key.to_owned(),
        };
        let (x, y) = key.split_once(',').ok_or_else(malformed)?;
        let x = x.parse().map_err(|_err| malformed())?;
        let y = y.parse().map_err(|_err| malformed())?;
        Ok(Self { x, y })
    }
}

/// The fixed `[width, height]` extent of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "(i32, i32)", into = "(i32, i32)")]
pub struct Bounds {
    width: i32,
    height: i32,
}

impl Bounds {
    /// Create bounds of the given extent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidBounds`] if either extent is below
    /// [`MIN_EXTENT`].
    pub const fn new(width: i32, height: i32) -> Result<Self, WorldError> {
        if width < MIN_EXTENT || height < MIN_EXTENT {
            return Err(WorldError::InvalidBounds {
                width,
                height,
                minimum: MIN_EXTENT,
            });
        }
        Ok(Self { width, height })
    }

    /// Number of columns.
    pub const fn width(self) -> i32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(self) -> i32 {
        self.height
    }

    /// Whether `position` already lies inside the bounds.
    pub const fn contains(self, position: Position) -> bool {
        position.x >= 0 && position.x < self.width && position.y >= 0 && position.y < self.height
    }

    /// Wrap an arbitrary position onto the torus.
    pub fn wrap(self, position: Position) -> Position {
        Position::from_offset(position, self, (0, 0))
    }

    /// The board centre, `round(extent / 2)` on each axis.
    pub fn center(self) -> Position {
        Position {
            x: half_up(self.width),
            y: half_up(self.height),
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl TryFrom<(i32, i32)> for Bounds {
    type Error = WorldError;

    fn try_from((width, height): (i32, i32)) -> Result<Self, Self::Error> {
        Self::new(width, height)
    }
}

impl From<Bounds> for (i32, i32) {
    fn from(bounds: Bounds) -> Self {
        (bounds.width, bounds.height)
    }
}

fn wrap_axis(origin: i32, offset: i32, extent: i32) -> i32 {
    // Widened to i64: the sum of two i32 values cannot overflow.
    let shifted = i64::from(origin).checked_add(i64::from(offset)).unwrap_or(0);
    shifted
        .checked_rem_euclid(i64::from(extent))
        .and_then(|wrapped| i32::try_from(wrapped).ok())
        .unwrap_or(0)
}

fn shorter_way(delta: u32, extent: u32) -> u32 {
    extent.checked_sub(delta).map_or(delta, |around| delta.min(around))
}

fn floor_hypot(dx: u32, dy: u32) -> u32 {
    let dx = u64::from(dx);
    let dy = u64::from(dy);
    let squared = dx
        .checked_mul(dx)
        .zip(dy.checked_mul(dy))
        .and_then(|(a, b)| a.checked_add(b))
        .unwrap_or(u64::MAX);
    u32::try_from(squared.isqrt()).unwrap_or(u32::MAX)
}

fn half_up(extent: i32) -> i32 {
    i32::try_from(extent.unsigned_abs().div_ceil(2)).unwrap_or(0)
}
