//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup and the run itself.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: life_core::config::ConfigError,
    },

    /// Building or seeding the board failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: life_world::WorldError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: life_core::runner::RunnerError,
    },

    /// The configured seeding pattern does not exist.
    #[error("unknown pattern: {key}")]
    UnknownPattern {
        /// The key that was looked up.
        key: String,
    },

    /// The final snapshot could not be serialized.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
