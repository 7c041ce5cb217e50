//! Error types for the `life-world` crate.
//!
//! Fallible world operations return [`WorldError`]. Parsing a canonical
//! position key has its own error, [`PositionParseError`].
//!
//! [`PositionParseError`]: crate::position::PositionParseError

use crate::position::{Bounds, Position};

/// Errors that can occur during world operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The requested grid extent cannot hold a Moore neighbourhood.
    #[error("invalid bounds {width}x{height}: both extents must be at least {minimum}")]
    InvalidBounds {
        /// Requested width.
        width: i32,
        /// Requested height.
        height: i32,
        /// Smallest accepted extent.
        minimum: i32,
    },

    /// A live cell already occupies the position.
    #[error("position {0} is already occupied")]
    Occupied(Position),

    /// The cell was built against a world with different bounds.
    #[error("cell built for bounds {found} cannot join a world of bounds {expected}")]
    BoundsMismatch {
        /// Bounds of the receiving world.
        expected: Bounds,
        /// Bounds the cell was built with.
        found: Bounds,
    },

    /// The generation counter would overflow.
    #[error("generation counter overflow")]
    GenerationOverflow,
}
