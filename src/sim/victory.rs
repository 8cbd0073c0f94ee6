//! Facet counting and win-condition evaluation

use serde::{Deserialize, Serialize};

use crate::board::FacetColor;
use crate::consts::{COLOR_COUNT, SENTINEL_COLOR};

/// Active win condition of the puzzle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryCondition {
    /// Touch facets to collect them
    Collection,
    /// Carry facets to a bumper of the same color
    ColorMatch,
}

/// Per-color facet bookkeeping. Invariant: `collected[c] <= on_board[c]`
/// for every color, maintained by construction - facets are removed from
/// the arena the moment they are counted, so a second collection of the
/// same facet has nothing to dispatch on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VictoryTracker {
    pub condition: VictoryCondition,
    on_board: [u32; COLOR_COUNT],
    collected: [u32; COLOR_COUNT],
}

impl VictoryTracker {
    pub fn new(condition: VictoryCondition) -> Self {
        Self {
            condition,
            on_board: [0; COLOR_COUNT],
            collected: [0; COLOR_COUNT],
        }
    }

    /// Record a facet entering the board.
    pub fn register_spawn(&mut self, color: FacetColor) {
        self.on_board[color.index()] += 1;
    }

    /// Count one facet of `color` as collected/matched. Returns the new
    /// collected count for that color.
    pub fn count_facet(&mut self, color: FacetColor) -> u32 {
        let i = color.index();
        self.collected[i] += 1;
        debug_assert!(
            self.collected[i] <= self.on_board[i],
            "collected {} facets of {:?} but only {} on board",
            self.collected[i],
            color,
            self.on_board[i]
        );
        self.collected[i]
    }

    pub fn on_board(&self, color: FacetColor) -> u32 {
        self.on_board[color.index()]
    }

    pub fn collected(&self, color: FacetColor) -> u32 {
        self.collected[color.index()]
    }

    /// Win iff every color except the sentinel is fully collected.
    /// Pure - safe to call any number of times.
    pub fn check_victory(&self) -> bool {
        FacetColor::ALL
            .iter()
            .filter(|&&c| c != SENTINEL_COLOR)
            .all(|&c| self.collected[c.index()] == self.on_board[c.index()])
    }

    /// Drop all counters (level reset / restore pass 1).
    pub fn reset(&mut self, condition: VictoryCondition) {
        self.condition = condition;
        self.on_board = [0; COLOR_COUNT];
        self.collected = [0; COLOR_COUNT];
    }
}
