use alloc::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::*;

/// Ordered, deduplicated set of grid coordinates.
pub type CoordSet = BTreeSet<Coord2>;

/// Flagged and unknown neighbor tallies of a single cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacency {
    pub mine_count: u8,
    pub unknown_count: u8,
}

impl Adjacency {
    /// Mines a clue of `value` still has to place among its unknown neighbors.
    pub const fn remaining_mines(self, value: u8) -> i16 {
        value as i16 - self.mine_count as i16
    }
}

/// Best guess when nothing is certain: the unknown cell whose tightest
/// neighboring clue gives the smallest chance of hiding a mine.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RiskMove {
    pub coords: Coord2,
    pub risk: f64,
}

/// Single-clue deductions over one grid snapshot.
///
/// Every query reads the grid it currently points at and nothing else, so the
/// same solver can be re-pointed at a fresh snapshot each polling cycle.
#[derive(Copy, Clone, Debug)]
pub struct BasicSolver<'a> {
    grid: &'a Grid,
}

impl<'a> BasicSolver<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    pub fn update(&mut self, grid: &'a Grid) {
        self.grid = grid;
    }

    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    pub fn count_adjacent(&self, coords: Coord2) -> Adjacency {
        let mut adjacency = Adjacency::default();
        for pos in self.grid.iter_neighbors(coords) {
            match self.grid.get(pos) {
                Cell::Flagged => adjacency.mine_count += 1,
                Cell::Unknown => adjacency.unknown_count += 1,
                Cell::Clue(_) => {}
            }
        }
        adjacency
    }

    /// Nonzero clues paired with their neighbor tallies, row-major.
    fn clues(&self) -> impl Iterator<Item = (Coord2, u8, Adjacency)> + '_ {
        self.grid.iter().filter_map(|(coords, cell)| {
            let value = cell.nonzero_clue()?;
            Some((coords, value, self.count_adjacent(coords)))
        })
    }

    fn unknown_neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + '_ {
        self.grid
            .iter_neighbors(coords)
            .filter(|&pos| self.grid.get(pos).is_unknown())
    }

    /// Unknown cells around clues whose flags already account for every mine.
    pub fn find_safe_moves(&self) -> CoordSet {
        let safe: CoordSet = self
            .clues()
            .filter(|&(_, value, adjacency)| adjacency.mine_count == value)
            .flat_map(|(coords, _, _)| self.unknown_neighbors(coords))
            .collect();
        log::trace!("basic solver: {} safe cells", safe.len());
        safe
    }

    /// Unknown cells around clues whose remaining quota equals their unknown count.
    pub fn find_definite_mines(&self) -> CoordSet {
        let mines: CoordSet = self
            .clues()
            .filter(|&(_, value, adjacency)| {
                adjacency.unknown_count > 0
                    && adjacency.remaining_mines(value) == i16::from(adjacency.unknown_count)
            })
            .flat_map(|(coords, _, _)| self.unknown_neighbors(coords))
            .collect();
        log::trace!("basic solver: {} definite mines", mines.len());
        mines
    }

    /// Satisfied clues that still border unknown cells.
    pub fn find_chord_moves(&self) -> CoordSet {
        self.clues()
            .filter(|&(_, value, adjacency)| {
                adjacency.mine_count == value && adjacency.unknown_count > 0
            })
            .map(|(coords, _, _)| coords)
            .collect()
    }

    /// Risk of `coords` hiding a mine as bounded by its tightest clue, if any clue constrains it.
    pub fn risk_at(&self, coords: Coord2) -> Option<f64> {
        let mut max_risk: Option<f64> = None;
        for pos in self.grid.iter_neighbors(coords) {
            let Some(value) = self.grid.get(pos).nonzero_clue() else {
                continue;
            };
            let adjacency = self.count_adjacent(pos);
            if adjacency.unknown_count == 0 {
                continue;
            }

            let remaining = adjacency.remaining_mines(value).max(0);
            let risk = (f64::from(remaining) / f64::from(adjacency.unknown_count)).min(1.0);
            max_risk = Some(max_risk.map_or(risk, |current| current.max(risk)));
        }
        max_risk
    }

    /// Constrained unknown cell with the lowest risk, first in row-major order on ties.
    pub fn find_lowest_risk_move(&self) -> Option<RiskMove> {
        let mut best: Option<RiskMove> = None;
        for (coords, cell) in self.grid.iter() {
            if !cell.is_unknown() {
                continue;
            }
            let Some(risk) = self.risk_at(coords) else {
                continue;
            };
            if best.is_none_or(|best| risk < best.risk) {
                best = Some(RiskMove { coords, risk });
            }
        }

        if let Some(best) = best {
            log::debug!("lowest risk move {:?} at {:.3}", best.coords, best.risk);
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(text: &str) -> Grid {
        text.parse().unwrap()
    }

    fn set<const N: usize>(coords: [Coord2; N]) -> CoordSet {
        CoordSet::from(coords)
    }

    #[test]
    fn count_adjacent_ignores_clues() {
        let grid = grid(
            "
            F1.
            .2F
            ...
        ",
        );
        let solver = BasicSolver::new(&grid);

        assert_eq!(
            solver.count_adjacent((1, 1)),
            Adjacency {
                mine_count: 2,
                unknown_count: 5,
            }
        );
        assert_eq!(
            solver.count_adjacent((0, 0)),
            Adjacency {
                mine_count: 0,
                unknown_count: 1,
            }
        );
    }

    #[test]
    fn unflagged_pair_of_ones_yields_nothing() {
        let grid = grid("11\n..");
        let solver = BasicSolver::new(&grid);

        assert!(solver.find_safe_moves().is_empty());
        assert!(solver.find_definite_mines().is_empty());
        assert!(solver.find_chord_moves().is_empty());
    }

    #[test]
    fn flag_satisfies_clues_and_frees_the_rest() {
        let grid = grid("11\nF.");
        let solver = BasicSolver::new(&grid);

        assert_eq!(solver.find_safe_moves(), set([(1, 1)]));
        assert_eq!(solver.find_chord_moves(), set([(0, 0), (0, 1)]));
        assert!(solver.find_definite_mines().is_empty());
    }

    #[test]
    fn exact_quota_marks_all_unknowns_as_mines() {
        let open = grid(
            "
            ...
            .3.
            000
        ",
        );
        assert!(BasicSolver::new(&open).find_definite_mines().is_empty());

        let closed = grid(
            "
            ...
            030
            000
        ",
        );
        let solver = BasicSolver::new(&closed);

        assert_eq!(solver.find_definite_mines(), set([(0, 0), (0, 1), (0, 2)]));
        assert!(solver.find_safe_moves().is_empty());
    }

    #[test]
    fn deductions_are_deduplicated_across_clues() {
        let unflagged = grid(
            "
            ...
            111
            000
        ",
        );
        assert!(BasicSolver::new(&unflagged).find_definite_mines().is_empty());

        let flagged = grid(
            "
            F..
            111
            000
        ",
        );

        assert_eq!(
            BasicSolver::new(&flagged).find_safe_moves(),
            set([(0, 1), (0, 2)])
        );
    }

    #[test]
    fn zero_clues_never_drive_deductions() {
        let grid = grid("0.\n..");
        let solver = BasicSolver::new(&grid);

        assert!(solver.find_safe_moves().is_empty());
        assert!(solver.find_chord_moves().is_empty());
        assert_eq!(solver.find_lowest_risk_move(), None);
    }

    #[test]
    fn lowest_risk_is_none_without_clues() {
        let grid = Grid::new((4, 4));
        let solver = BasicSolver::new(&grid);

        assert_eq!(solver.find_lowest_risk_move(), None);
    }

    #[test]
    fn lowest_risk_uses_tightest_clue() {
        // (0,0) is bounded by the 1 at (1,0) at 1/2, (0,2) sits next to the 2 at 2/2
        let grid = grid(
            "
            ...
            112
            000
        ",
        );
        let solver = BasicSolver::new(&grid);

        assert_eq!(solver.risk_at((0, 0)), Some(0.5));
        assert_eq!(solver.risk_at((0, 2)), Some(1.0));
        assert_eq!(
            solver.find_lowest_risk_move(),
            Some(RiskMove {
                coords: (0, 0),
                risk: 0.5,
            })
        );
    }

    #[test]
    fn lowest_risk_ties_resolve_row_major() {
        let grid = grid(
            "
            ...
            .1.
            ...
        ",
        );
        let solver = BasicSolver::new(&grid);

        let best = solver.find_lowest_risk_move().unwrap();
        assert_eq!(best.coords, (0, 0));
        assert_eq!(best.risk, 0.125);
    }

    #[test]
    fn over_flagged_clue_contributes_zero_risk() {
        let grid = grid("1F\nF.");
        let solver = BasicSolver::new(&grid);

        assert_eq!(solver.risk_at((1, 1)), Some(0.0));
    }

    #[test]
    fn update_swaps_snapshot() {
        let first = grid("11\n..");
        let second = grid("11\nF.");
        let mut solver = BasicSolver::new(&first);
        assert!(solver.find_safe_moves().is_empty());

        solver.update(&second);

        assert_eq!(solver.find_safe_moves(), set([(1, 1)]));
    }

    #[test]
    fn repeated_queries_are_stable() {
        let grid = grid(
            "
            .1F
            .2.
            ...
        ",
        );
        let solver = BasicSolver::new(&grid);

        assert_eq!(solver.find_safe_moves(), solver.find_safe_moves());
        assert_eq!(solver.find_definite_mines(), solver.find_definite_mines());
        assert_eq!(solver.find_chord_moves(), solver.find_chord_moves());
        assert_eq!(solver.find_lowest_risk_move(), solver.find_lowest_risk_move());
    }
}
