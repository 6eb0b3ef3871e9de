use alloc::vec::Vec;

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// A single input the bot wants performed on the board.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Bulk-reveal around a satisfied clue.
    Chord(Coord2),
    /// Reveal a cell known to be safe.
    Reveal(Coord2),
    /// Flag a cell known to be a mine.
    Flag(Coord2),
    /// Reveal the least risky constrained cell.
    Guess(RiskMove),
    /// Reveal a cell nothing is known about.
    Blind(Coord2),
}

impl Action {
    pub const fn coords(self) -> Coord2 {
        match self {
            Self::Chord(coords)
            | Self::Reveal(coords)
            | Self::Flag(coords)
            | Self::Blind(coords) => coords,
            Self::Guess(guess) => guess.coords,
        }
    }

    /// Whether performing this action can hit a mine if the deduction behind it is wrong.
    pub const fn is_gamble(self) -> bool {
        matches!(self, Self::Guess(_) | Self::Blind(_))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Turn {
    Act(Vec<Action>),
    /// No unknown cells are left to act on.
    Finished,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    /// Pattern templates clear more boards, but the two-sided 1-2-1 template
    /// can flag cells that are not mines. A wrong flag is never revisited, so
    /// [`SolverTier::Basic`] is the choice when every flag has to be right.
    pub tier: SolverTier,
    /// Seeds the blind pick when nothing constrains the board.
    pub seed: u64,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            tier: SolverTier::WithPatterns,
            seed: 0,
        }
    }
}

/// Chooses the next inputs from a grid snapshot.
///
/// Priority is chord, then a single safe reveal, then flagging every known
/// mine together with the lowest-risk guess. A blind reveal is the last resort.
#[derive(Clone, Debug)]
pub struct Autopilot {
    config: AutopilotConfig,
    rng: SmallRng,
}

impl Autopilot {
    pub fn new(config: AutopilotConfig) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    pub fn plan(&mut self, grid: &Grid) -> Result<Turn> {
        let deductions = deduce_with(grid, self.config.tier);
        self.plan_from(grid, &deductions)
    }

    pub fn plan_from(&mut self, grid: &Grid, deductions: &Deductions) -> Result<Turn> {
        if let Some(&coords) = deductions.chords.first() {
            return Ok(Turn::Act(alloc::vec![Action::Chord(coords)]));
        }

        if let Some(&coords) = deductions.safe.first() {
            return Ok(Turn::Act(alloc::vec![Action::Reveal(coords)]));
        }

        let flags: Vec<Coord2> = deductions
            .mines
            .iter()
            .copied()
            .filter(|&coords| grid.get(coords).is_unknown())
            .collect();
        let mut actions: Vec<Action> = flags.iter().map(|&coords| Action::Flag(coords)).collect();

        // risk has to be judged with this turn's flags already in place
        let guess = if flags.is_empty() {
            deductions.lowest_risk
        } else {
            let flagged = grid.with_flags(&flags)?;
            let solver = BasicSolver::new(&flagged);
            if !solver.find_safe_moves().is_empty() {
                log::debug!("new flags free up safe cells, not guessing");
                return Ok(Turn::Act(actions));
            }
            solver.find_lowest_risk_move()
        };

        let guess = guess.filter(|guess| !deductions.mines.contains(&guess.coords));
        if let Some(guess) = guess {
            actions.push(Action::Guess(guess));
        } else if let Some(coords) = self.pick_blind(grid, &deductions.mines) {
            actions.push(Action::Blind(coords));
        }

        Ok(if actions.is_empty() {
            Turn::Finished
        } else {
            Turn::Act(actions)
        })
    }

    fn pick_blind(&mut self, grid: &Grid, mines: &CoordSet) -> Option<Coord2> {
        let unknown: Vec<Coord2> = grid
            .iter()
            .filter(|&(coords, cell)| cell.is_unknown() && !mines.contains(&coords))
            .map(|(coords, _)| coords)
            .collect();
        unknown.choose(&mut self.rng).copied()
    }
}
