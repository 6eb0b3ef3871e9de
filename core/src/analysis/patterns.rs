use serde::{Deserialize, Serialize};

use super::CoordSet;
use crate::*;

/// Mine and safe cells implied by a multi-clue shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternDeductions {
    pub safe: CoordSet,
    pub mines: CoordSet,
}

impl PatternDeductions {
    pub fn is_empty(&self) -> bool {
        self.safe.is_empty() && self.mines.is_empty()
    }
}

/// Recognizes local clue shapes that no single clue resolves on its own.
///
/// A shape only counts while it is unresolved: none of its clues may touch a
/// flag yet, otherwise the flag already tells a different story.
#[derive(Copy, Clone, Debug)]
pub struct PatternSolver<'a> {
    grid: &'a Grid,
}

impl<'a> PatternSolver<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        Self { grid }
    }

    pub fn update(&mut self, grid: &'a Grid) {
        self.grid = grid;
    }

    /// Clue values of the `R × C` window anchored at `origin`, if it is in
    /// bounds and fully revealed.
    fn window<const R: usize, const C: usize>(&self, origin: Coord2) -> Option<[[u8; C]; R]> {
        let (rows, cols) = self.grid.size();
        if usize::from(origin.0) + R > usize::from(rows)
            || usize::from(origin.1) + C > usize::from(cols)
        {
            return None;
        }

        let mut values = [[0; C]; R];
        for (d_row, row) in values.iter_mut().enumerate() {
            for (d_col, value) in row.iter_mut().enumerate() {
                let coords = (origin.0 + d_row as Coord, origin.1 + d_col as Coord);
                *value = self.grid.get(coords).clue_value()?;
            }
        }
        Some(values)
    }

    fn windows<const R: usize, const C: usize>(
        &self,
    ) -> impl Iterator<Item = (Coord2, [[u8; C]; R])> + '_ {
        self.grid
            .iter()
            .filter_map(|(origin, _)| Some((origin, self.window::<R, C>(origin)?)))
    }

    /// True while none of `clues` borders a flagged cell.
    fn is_unresolved(&self, clues: impl IntoIterator<Item = Coord2>) -> bool {
        clues.into_iter().all(|clue| {
            !self
                .grid
                .iter_neighbors(clue)
                .any(|pos| self.grid.get(pos).is_flagged())
        })
    }

    fn window_cells(origin: Coord2, (rows, cols): Coord2) -> impl Iterator<Item = Coord2> {
        (0..rows).flat_map(move |d_row| {
            (0..cols).map(move |d_col| (origin.0 + d_row, origin.1 + d_col))
        })
    }

    /// Adds the cell at `delta` from `from`, when it exists and is still unknown.
    fn insert_unknown(&self, set: &mut CoordSet, from: Coord2, delta: (isize, isize)) {
        if let Some(coords) = apply_delta(from, delta, self.grid.size())
            && self.grid.get(coords).is_unknown()
        {
            set.insert(coords);
        }
    }

    /// 2×2 blocks reading `1 2 / 2 1` or `2 1 / 1 2`.
    ///
    /// Reports the corners of the block itself: the diagonal holding the ones
    /// is the mine side, the other diagonal is safe.
    pub fn find_diagonal_pattern(&self) -> PatternDeductions {
        let mut out = PatternDeductions::default();

        for (origin, values) in self.windows::<2, 2>() {
            let (row, col) = origin;
            let main = [(row, col), (row + 1, col + 1)];
            let anti = [(row, col + 1), (row + 1, col)];

            let (safe, mines) = match values {
                [[1, 2], [2, 1]] => (anti, main),
                [[2, 1], [1, 2]] => (main, anti),
                _ => continue,
            };

            if !self.is_unresolved(Self::window_cells(origin, (2, 2))) {
                continue;
            }

            log::trace!("diagonal pattern at {origin:?}");
            out.safe.extend(safe);
            out.mines.extend(mines);
        }

        out
    }

    /// Two parallel `2 3 2` lines: the cells beyond the middle of both lines are mines.
    pub fn find_box_pattern(&self) -> CoordSet {
        const LINE: [u8; 3] = [2, 3, 2];
        let mut mines = CoordSet::new();

        for (origin, values) in self.windows::<2, 3>() {
            if values != [LINE, LINE] || !self.is_unresolved(Self::window_cells(origin, (2, 3))) {
                continue;
            }
            let (row, col) = origin;
            log::trace!("horizontal box pattern at {origin:?}");
            self.insert_unknown(&mut mines, (row, col + 1), (-1, 0));
            self.insert_unknown(&mut mines, (row + 1, col + 1), (1, 0));
        }

        for (origin, values) in self.windows::<3, 2>() {
            let left = values.map(|[value, _]| value);
            let right = values.map(|[_, value]| value);
            if left != LINE
                || right != LINE
                || !self.is_unresolved(Self::window_cells(origin, (3, 2)))
            {
                continue;
            }
            let (row, col) = origin;
            log::trace!("vertical box pattern at {origin:?}");
            self.insert_unknown(&mut mines, (row + 1, col), (0, -1));
            self.insert_unknown(&mut mines, (row + 1, col + 1), (0, 1));
        }

        mines
    }

    /// `1 2 1` runs: the cells flanking both ones, on either side of the run, are mines.
    pub fn find_121_pattern(&self) -> CoordSet {
        let mut mines = CoordSet::new();

        for (origin, values) in self.windows::<1, 3>() {
            if values != [[1, 2, 1]] || !self.is_unresolved(Self::window_cells(origin, (1, 3))) {
                continue;
            }
            let (row, col) = origin;
            log::trace!("horizontal 1-2-1 pattern at {origin:?}");
            for side in [-1, 1] {
                self.insert_unknown(&mut mines, (row, col), (side, 0));
                self.insert_unknown(&mut mines, (row, col + 2), (side, 0));
            }
        }

        for (origin, values) in self.windows::<3, 1>() {
            if values != [[1], [2], [1]] || !self.is_unresolved(Self::window_cells(origin, (3, 1)))
            {
                continue;
            }
            let (row, col) = origin;
            log::trace!("vertical 1-2-1 pattern at {origin:?}");
            for side in [-1, 1] {
                self.insert_unknown(&mut mines, (row, col), (0, side));
                self.insert_unknown(&mut mines, (row + 2, col), (0, side));
            }
        }

        mines
    }

    /// Union of every detector, restricted to cells that are still unknown.
    pub fn analyze_patterns(&self) -> PatternDeductions {
        let mut out = self.find_diagonal_pattern();
        out.mines.extend(self.find_box_pattern());
        out.mines.extend(self.find_121_pattern());

        out.safe.retain(|&coords| self.grid.get(coords).is_unknown());
        out.mines.retain(|&coords| self.grid.get(coords).is_unknown());

        log::trace!(
            "pattern solver: {} safe cells, {} mines",
            out.safe.len(),
            out.mines.len()
        );
        out
    }
}
