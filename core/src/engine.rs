use alloc::collections::{BTreeSet, VecDeque};
use core::num::Saturating;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineState {
    Ready,
    Active,
    Won,
    Lost,
}

impl EngineState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::Ready
    }
}

/// Simulated game board standing in for the real puzzle window.
///
/// Holds the planted layout and the player-visible [`Grid`]; the autopilot only
/// ever sees [`PlayEngine::snapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayEngine {
    mine_layout: MineLayout,
    board: Grid,
    revealed_count: Saturating<CellCount>,
    flagged_count: Saturating<CellCount>,
    state: EngineState,
    triggered_mine: Option<Coord2>,
}

impl PlayEngine {
    pub fn new(mine_layout: MineLayout) -> Self {
        let size = mine_layout.size();
        Self {
            mine_layout,
            board: Grid::new(size),
            revealed_count: Saturating(0),
            flagged_count: Saturating(0),
            state: Default::default(),
            triggered_mine: None,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn size(&self) -> Coord2 {
        self.mine_layout.size()
    }

    pub fn total_mines(&self) -> CellCount {
        self.mine_layout.mine_count()
    }

    pub fn mines_left(&self) -> isize {
        (self.mine_layout.mine_count() as isize) - (self.flagged_count.0 as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self.board.get(coords)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn mine_layout(&self) -> &MineLayout {
        &self.mine_layout
    }

    /// What a screen capture of the board would read right now.
    pub fn snapshot(&self) -> Grid {
        self.board.clone()
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_active()?;

        let was_flagged = self.board.get(coords).is_flagged();
        let outcome = self.board.toggle_flag(coords)?;
        if outcome.has_update() {
            if was_flagged {
                self.flagged_count -= 1;
            } else {
                self.flagged_count += 1;
            }
        }
        Ok(outcome)
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;

        if self.board.get(coords).is_unknown() {
            self.check_not_finished()?;
            Ok(self.reveal_single_cell(coords))
        } else {
            Ok(RevealOutcome::NoChange)
        }
    }

    pub fn chord_reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.mine_layout.validate_coords(coords)?;
        self.check_not_finished()?;

        Ok(match self.board.get(coords) {
            Cell::Clue(count) if count == self.count_flagged_neighbors(coords) => {
                self.check_active()?;
                self.mine_layout
                    .iter_neighbors(coords)
                    .map(|neighbor_coords| self.reveal_single_cell(neighbor_coords))
                    .reduce(core::ops::BitOr::bitor)
                    .unwrap_or(RevealOutcome::NoChange)
            }
            _ => self.reveal_single_cell(coords),
        })
    }

    fn reveal_single_cell(&mut self, coords: Coord2) -> RevealOutcome {
        let cell_state = self.board.get(coords);
        let has_mine = self.mine_layout[coords];

        match (cell_state, has_mine) {
            (Cell::Unknown, true) => {
                self.triggered_mine = Some(coords);
                self.end_game(false);
                RevealOutcome::HitMine
            }
            (Cell::Unknown, false) => {
                self.open(coords);

                if self.mine_layout.adjacent_mine_count(coords) == 0 {
                    self.flood_from(coords);
                }

                if self.revealed_count == Saturating(self.mine_layout.safe_cell_count()) {
                    self.end_game(true);
                    RevealOutcome::Won
                } else {
                    self.mark_started();
                    RevealOutcome::Revealed
                }
            }
            _ => RevealOutcome::NoChange,
        }
    }

    fn open(&mut self, coords: Coord2) -> u8 {
        let adjacent_mines = self.mine_layout.adjacent_mine_count(coords);
        self.board.put(coords, Cell::Clue(adjacent_mines));
        self.revealed_count += 1;
        adjacent_mines
    }

    /// Opens every cell reachable from a zero through other zeros. Flags are left alone.
    fn flood_from(&mut self, start: Coord2) {
        let mut visited = BTreeSet::from([start]);
        let mut to_visit: VecDeque<_> = self.unknown_neighbors(start).collect();

        while let Some(visit_coords) = to_visit.pop_front() {
            if !visited.insert(visit_coords) || !self.board.get(visit_coords).is_unknown() {
                continue;
            }

            if self.open(visit_coords) == 0 {
                let next: VecDeque<_> = self
                    .unknown_neighbors(visit_coords)
                    .filter(|pos| !visited.contains(pos))
                    .collect();
                to_visit.extend(next);
            }
        }
    }

    fn unknown_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + '_ {
        self.mine_layout
            .iter_neighbors(coords)
            .filter(|&pos| self.board.get(pos).is_unknown())
    }

    fn mark_started(&mut self) {
        if matches!(self.state, EngineState::Ready) {
            self.state = EngineState::Active;
        }
    }

    fn end_game(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won {
            EngineState::Won
        } else {
            EngineState::Lost
        };
        if won {
            self.triggered_mine = None;
        }
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.mine_layout
            .iter_neighbors(coords)
            .filter(|&pos| self.board.get(pos).is_flagged())
            .count() as u8
    }

    fn check_active(&self) -> Result<()> {
        if matches!(self.state, EngineState::Active) {
            Ok(())
        } else {
            Err(GridError::AlreadyEnded)
        }
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GridError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: Coord2, mines: &[Coord2]) -> MineLayout {
        MineLayout::from_mine_coords(size, mines).unwrap()
    }

    #[test]
    fn reveal_hits_mine_and_sets_triggered_cell() {
        let mut engine = PlayEngine::new(layout((2, 2), &[(0, 0)]));

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::HitMine);
        assert_eq!(engine.state(), EngineState::Lost);
        assert_eq!(engine.triggered_mine(), Some((0, 0)));
    }

    #[test]
    fn reveal_flood_fill_opens_zero_region() {
        let mut engine = PlayEngine::new(layout((3, 3), &[(2, 2)]));

        let outcome = engine.reveal((0, 0)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((0, 0)), Cell::Clue(0));
        assert_eq!(engine.cell_at((1, 1)), Cell::Clue(1));
        assert_eq!(engine.cell_at((2, 2)), Cell::Unknown);
    }

    #[test]
    fn flood_fill_leaves_flags_in_place() {
        let mut engine = PlayEngine::new(layout((1, 4), &[(0, 3)]));
        engine.reveal((0, 2)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();

        engine.reveal((0, 0)).unwrap();

        assert_eq!(engine.snapshot(), "0F1.".parse::<Grid>().unwrap());
    }

    #[test]
    fn chord_reveal_uses_flagged_neighbors() {
        let mines = &[(0, 1), (2, 1)];
        let mut engine = PlayEngine::new(layout((3, 3), mines));

        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 1)).unwrap();
        engine.toggle_flag((2, 1)).unwrap();

        let outcome = engine.chord_reveal((1, 1)).unwrap();

        assert_eq!(outcome, RevealOutcome::Won);
        assert_eq!(engine.cell_at((1, 0)), Cell::Clue(2));
        assert_eq!(engine.cell_at((1, 2)), Cell::Clue(2));
    }

    #[test]
    fn flags_are_counted_against_mines_left() {
        let mut engine = PlayEngine::new(layout((2, 2), &[(0, 0)]));
        engine.reveal((1, 1)).unwrap();

        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(engine.mines_left(), 0);
        engine.toggle_flag((0, 0)).unwrap();
        assert_eq!(engine.mines_left(), 1);
    }

    #[test]
    fn snapshot_matches_visible_board() {
        let mut engine = PlayEngine::new(layout((2, 2), &[(0, 0)]));
        engine.reveal((1, 1)).unwrap();
        engine.toggle_flag((0, 0)).unwrap();

        assert_eq!(engine.snapshot(), "F.\n.1".parse::<Grid>().unwrap());
    }

    #[test]
    fn finished_game_rejects_moves() {
        let mut engine = PlayEngine::new(layout((2, 1), &[(0, 0)]));

        assert_eq!(engine.reveal((1, 0)).unwrap(), RevealOutcome::Won);
        assert!(engine.is_finished());
        assert_eq!(engine.toggle_flag((0, 0)), Err(GridError::AlreadyEnded));
        assert_eq!(engine.reveal((0, 0)), Err(GridError::AlreadyEnded));
    }
}
