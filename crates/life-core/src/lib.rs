//! Configuration, operator controls, and the run loop for the Life
//! simulation.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `life-config.yaml` into
//!   strongly-typed structs.
//! - [`history`] -- Recent-generation memory used to detect repeating
//!   boards.
//! - [`operator`] -- Shared play/pause/step/speed/stop state.
//! - [`runner`] -- The async tick loop that ties the board to the operator.

pub mod config;
pub mod history;
pub mod operator;
pub mod runner;
