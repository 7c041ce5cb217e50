//! Recent-generation memory for cycle detection.
//!
//! A finite torus must eventually repeat itself. [`StateHistory`] keeps the
//! live-position sets of the last few generations and reports when the
//! current board matches one of them.

use std::collections::VecDeque;

use life_world::Position;

/// Bounded ring of recent boards, newest last.
#[derive(Debug, Clone)]
pub struct StateHistory {
    depth: usize,
    boards: VecDeque<Vec<Position>>,
}

impl StateHistory {
    /// Remember up to `depth` generations (at least one).
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            depth,
            boards: VecDeque::with_capacity(depth),
        }
    }

    /// Record `board` (sorted live positions) and return the period if it
    /// repeats a remembered generation.
    ///
    /// A still life reports period 1, a blinker period 2.
    pub fn record(&mut self, board: Vec<Position>) -> Option<usize> {
        let period = self
            .boards
            .iter()
            .rev()
            .position(|past| *past == board)
            .map(|steps_back| steps_back.saturating_add(1));

        if self.boards.len() >= self.depth {
            self.boards.pop_front();
        }
        self.boards.push_back(board);
        period
    }
}
