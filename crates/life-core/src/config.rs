//! Configuration loading and typed config structures for the Life simulation.
//!
//! The configuration lives in `life-config.yaml`. Every field has a default,
//! so a partial file (or no file at all) yields a runnable setup.

use std::path::Path;

use life_world::{Bounds, WorldError};
use serde::Deserialize;

use crate::operator::MIN_TICK_INTERVAL_MS;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but describes an unusable setup.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `life-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationConfig {
    /// Board settings.
    #[serde(default)]
    pub world: WorldConfig,

    /// How the board is populated before the first tick.
    #[serde(default)]
    pub seeding: SeedingConfig,

    /// Run loop timing and end conditions.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.world.bounds().map_err(|e| ConfigError::Invalid {
            reason: e.to_string(),
        })?;

        if self.seeding.fill_percent > 100 {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "seeding.fill_percent must be at most 100, got {}",
                    self.seeding.fill_percent
                ),
            });
        }

        if !self.seeding.is_empty_board() && life_world::pattern(&self.seeding.pattern).is_none() {
            return Err(ConfigError::Invalid {
                reason: format!("unknown seeding.pattern: {}", self.seeding.pattern),
            });
        }

        if self.simulation.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "simulation.tick_interval_ms must be at least {MIN_TICK_INTERVAL_MS}, got {}",
                    self.simulation.tick_interval_ms
                ),
            });
        }

        if self.simulation.history_depth == 0 {
            return Err(ConfigError::Invalid {
                reason: "simulation.history_depth must be at least 1".to_owned(),
            });
        }

        Ok(())
    }
}

/// Board configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Number of columns.
    #[serde(default = "default_extent")]
    pub width: i32,

    /// Number of rows.
    #[serde(default = "default_extent")]
    pub height: i32,

    /// Random seed for reproducible soups.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl WorldConfig {
    /// The configured board extent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidBounds`] if either extent is too small.
    pub const fn bounds(&self) -> Result<Bounds, WorldError> {
        Bounds::new(self.width, self.height)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_extent(),
            height: default_extent(),
            seed: default_seed(),
        }
    }
}

/// Initial population.
///
/// A non-zero `fill_percent` scatters a random soup and takes precedence
/// over `pattern`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedingConfig {
    /// Built-in pattern key, or `none` for an empty board.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Percentage of the board to fill at random (0 disables the soup).
    #[serde(default)]
    pub fill_percent: u32,
}

impl SeedingConfig {
    /// Whether the pattern setting asks for an empty board.
    pub fn is_empty_board(&self) -> bool {
        self.pattern.eq_ignore_ascii_case("none")
    }
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            pattern: default_pattern(),
            fill_percent: 0,
        }
    }
}

/// Run loop timing and end conditions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Maximum number of ticks before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Maximum wall-clock seconds before the run ends (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,

    /// End the run when the board empties.
    #[serde(default = "default_true")]
    pub stop_on_extinction: bool,

    /// End the run when the board repeats an earlier generation.
    #[serde(default)]
    pub stop_on_cycle: bool,

    /// How many past generations cycle detection remembers.
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
}

impl Default for SimulationBoundsConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            max_real_time_seconds: 0,
            stop_on_extinction: true,
            stop_on_cycle: false,
            history_depth: default_history_depth(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log every world event at debug level.
    #[serde(default)]
    pub log_events: bool,

    /// Log the final board as JSON when the run ends.
    #[serde(default = "default_true")]
    pub final_snapshot: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_events: false,
            final_snapshot: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

const fn default_extent() -> i32 {
    50
}

const fn default_seed() -> u64 {
    42
}

fn default_pattern() -> String {
    "glider".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    500
}

const fn default_history_depth() -> usize {
    10
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_true() -> bool {
    true
}
