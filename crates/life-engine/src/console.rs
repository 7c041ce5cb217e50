//! Operator console: line commands on standard input.
//!
//! This is the engine's control surface for the run loop, one command per
//! line:
//!
//! | Command         | Effect                                  |
//! |-----------------|-----------------------------------------|
//! | `pause`         | Pause the tick loop                     |
//! | `resume`/`play` | Resume the tick loop                    |
//! | `toggle`        | Flip between paused and running         |
//! | `step`          | Run one tick while paused               |
//! | `speed <ms>`    | Set the tick interval                   |
//! | `status`        | Log the current status as JSON          |
//! | `stop`/`quit`   | End the run cleanly                     |

use std::str::FromStr;
use std::sync::Arc;

use life_core::operator::{MIN_TICK_INTERVAL_MS, OperatorState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::board::BoardStats;

/// A parsed console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Pause the tick loop.
    Pause,
    /// Resume the tick loop.
    Resume,
    /// Flip between paused and running.
    Toggle,
    /// Let one tick through while paused.
    Step,
    /// Set the tick interval in milliseconds.
    Speed(u64),
    /// Report the current status.
    Status,
    /// Stop the run.
    Stop,
}

/// A console line that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    /// The first word is not a known command.
    #[error("unknown command: {0}")]
    Unknown(String),

    /// `speed` without a valid millisecond value.
    #[error("speed expects a number of milliseconds, got {0:?}")]
    BadSpeed(String),
}

impl FromStr for OperatorCommand {
    type Err = CommandParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or_default().to_ascii_lowercase();
        match verb.as_str() {
            "pause" => Ok(Self::Pause),
            "resume" | "play" => Ok(Self::Resume),
            "toggle" => Ok(Self::Toggle),
            "step" => Ok(Self::Step),
            "status" => Ok(Self::Status),
            "stop" | "quit" => Ok(Self::Stop),
            "speed" => {
                let raw = words.next().unwrap_or_default();
                raw.parse()
                    .ok()
                    .map(Self::Speed)
                    .ok_or_else(|| CommandParseError::BadSpeed(raw.to_owned()))
            }
            _ => Err(CommandParseError::Unknown(verb)),
        }
    }
}

/// Apply a command to the operator state.
pub async fn apply(command: OperatorCommand, operator: &OperatorState, stats: &BoardStats) {
    match command {
        OperatorCommand::Pause => {
            operator.pause();
            info!("Simulation paused");
        }
        OperatorCommand::Resume => {
            operator.resume();
            info!("Simulation resumed");
        }
        OperatorCommand::Toggle => {
            let paused = operator.toggle_pause();
            info!(paused, "Pause toggled");
        }
        OperatorCommand::Step => {
            if operator.is_paused() {
                operator.request_step();
                debug!("Single step requested");
            } else {
                warn!("step ignored: simulation is running");
            }
        }
        OperatorCommand::Speed(ms) => {
            if let Some(previous) = operator.set_tick_interval_ms(ms) {
                info!(previous, current = ms, "Tick interval changed");
            } else {
                warn!(
                    requested = ms,
                    minimum = MIN_TICK_INTERVAL_MS,
                    "tick interval below minimum, ignored"
                );
            }
        }
        OperatorCommand::Status => match status_json(operator, stats).await {
            Ok(json) => info!(status = %json, "Simulation status"),
            Err(e) => warn!(error = %e, "failed to serialize status"),
        },
        OperatorCommand::Stop => {
            operator.request_stop();
            info!("Operator stop requested");
        }
    }
}

/// The operator status, with the latest board figures, as JSON.
pub async fn status_json(
    operator: &OperatorState,
    stats: &BoardStats,
) -> Result<String, serde_json::Error> {
    let report = operator
        .status(stats.generation(), stats.population())
        .await;
    serde_json::to_string(&report)
}

/// Read commands from standard input until it closes or a stop is issued.
pub fn spawn_console(operator: Arc<OperatorState>, stats: Arc<BoardStats>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("Console input closed");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "failed to read console input, console disabled");
                    return;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<OperatorCommand>() {
                Ok(command) => {
                    apply(command, &operator, &stats).await;
                    if command == OperatorCommand::Stop {
                        return;
                    }
                }
                Err(e) => warn!(error = %e, "ignored console input"),
            }
        }
    })
}
