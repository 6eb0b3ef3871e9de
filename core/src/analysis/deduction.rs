use serde::{Deserialize, Serialize};

use super::*;
use crate::*;

/// Everything the engine can say about one snapshot, ready for an overlay or the autopilot.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Deductions {
    pub safe: CoordSet,
    pub mines: CoordSet,
    pub chords: CoordSet,
    pub lowest_risk: Option<RiskMove>,
}

impl Deductions {
    /// Nothing certain was found, a guess is the only way forward.
    pub fn is_stuck(&self) -> bool {
        self.safe.is_empty() && self.mines.is_empty() && self.chords.is_empty()
    }

    /// Cells that ended up both safe and mined.
    pub fn conflicts(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.safe.intersection(&self.mines).copied()
    }
}

/// Which solvers contribute to a [`Deductions`] set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverTier {
    Basic,
    WithPatterns,
}

impl Default for SolverTier {
    fn default() -> Self {
        Self::WithPatterns
    }
}

/// Runs the solvers selected by `tier` over `grid`.
pub fn deduce_with(grid: &Grid, tier: SolverTier) -> Deductions {
    let basic = BasicSolver::new(grid);
    let mut out = Deductions {
        safe: basic.find_safe_moves(),
        mines: basic.find_definite_mines(),
        chords: basic.find_chord_moves(),
        lowest_risk: basic.find_lowest_risk_move(),
    };

    if matches!(tier, SolverTier::WithPatterns) {
        let patterns = PatternSolver::new(grid).analyze_patterns();
        out.safe.extend(patterns.safe);
        out.mines.extend(patterns.mines);
    }

    for coords in out.conflicts() {
        log::warn!("cell {coords:?} deduced both safe and mined");
    }
    log::debug!(
        "deduced {} safe, {} mines, {} chords, guess {:?}",
        out.safe.len(),
        out.mines.len(),
        out.chords.len(),
        out.lowest_risk.map(|guess| guess.coords)
    );
    out
}

/// Basic and pattern deductions over `grid`, unioned.
pub fn deduce(grid: &Grid) -> Deductions {
    deduce_with(grid, SolverTier::WithPatterns)
}
