//! Sparse toroidal board for Conway's Game of Life.
//!
//! Only live cells are stored. Each cell keeps track of its live Moore
//! neighbours, and the world advances every cell simultaneously, one
//! generation per [`World::tick`].
//!
//! # Modules
//!
//! - [`position`] -- [`Position`] grid coordinates, [`Bounds`], and
//!   toroidal offset arithmetic.
//! - [`cell`] -- [`Cell`] neighbour tracking, spawn areas, and the survival
//!   rule.
//! - [`world`] -- [`World`] cell arena, birth candidates, the generational
//!   tick, and event subscriptions.
//! - [`patterns`] -- Built-in seed patterns and random soups.
//! - [`error`] -- Error types for world operations.

pub mod cell;
pub mod error;
pub mod patterns;
pub mod position;
pub mod world;

// Re-export primary types at crate root.
pub use cell::{Cell, DeathCause};
pub use error::WorldError;
pub use patterns::{PATTERNS, Pattern, pattern, place_pattern, scatter};
pub use position::{Bounds, MOORE_OFFSETS, Offset, Position, PositionParseError};
pub use world::{
    CellDeath, ListenerId, TickSummary, World, WorldEvent, WorldListener, WorldSnapshot,
};
