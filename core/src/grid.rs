use alloc::vec::Vec;
use core::fmt;
use core::ops::Index;
use core::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Rectangular snapshot of the puzzle as seen by the player.
///
/// Dimensions are fixed at construction. Clue cells are ground truth and can
/// never be turned back into unrevealed cells, flags can be toggled freely by
/// the caller. The solvers only ever read a grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Array2<Cell>,
}

impl Grid {
    /// Creates a grid where every cell is [`Cell::Unknown`].
    pub fn new((rows, cols): Coord2) -> Self {
        Self {
            cells: Array2::default((rows, cols).to_nd_index()),
        }
    }

    /// Builds a grid from row-major rows, rejecting ragged input and impossible clues.
    pub fn from_rows<I, R>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = Cell>,
    {
        let mut width = None;
        let mut height: usize = 0;
        let mut flat = Vec::new();

        for row in rows {
            let before = flat.len();
            for cell in row {
                if let Cell::Clue(count) = cell {
                    Cell::clue(count)?;
                }
                flat.push(cell);
            }
            let row_len = flat.len() - before;

            match width {
                None => width = Some(row_len),
                Some(width) if width != row_len => return Err(GridError::InvalidBoardShape),
                Some(_) => {}
            }
            height += 1;
        }

        let width = width.unwrap_or(0);
        if height > usize::from(Coord::MAX) || width > usize::from(Coord::MAX) {
            return Err(GridError::InvalidBoardShape);
        }

        let cells = Array2::from_shape_vec((height, width), flat)
            .map_err(|_| GridError::InvalidBoardShape)?;
        Ok(Self { cells })
    }

    /// `(rows, cols)`.
    pub fn size(&self) -> Coord2 {
        array_size(&self.cells)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn contains(&self, (row, col): Coord2) -> bool {
        let (rows, cols) = self.size();
        row < rows && col < cols
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.contains(coords) {
            Ok(coords)
        } else {
            Err(GridError::InvalidCoords)
        }
    }

    /// Cell at `coords`. Panics when out of bounds, like slice indexing.
    pub fn get(&self, coords: Coord2) -> Cell {
        self.cells[coords.to_nd_index()]
    }

    /// In-bounds Moore neighbors of `coords`, row offset first then column offset.
    pub fn neighbors(&self, coords: Coord2) -> Neighbors {
        self.iter_neighbors(coords).collect()
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    /// All cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| {
            (0..cols).map(move |col| ((row, col), self.get((row, col))))
        })
    }

    pub fn count_cells(&self, predicate: impl Fn(Cell) -> bool) -> usize {
        self.cells.iter().filter(|&&cell| predicate(cell)).count()
    }

    /// Replaces a cell, refusing to hide a clue that was already revealed.
    pub fn set(&mut self, coords: Coord2, cell: Cell) -> Result<()> {
        let coords = self.validate_coords(coords)?;
        if let Cell::Clue(count) = cell {
            Cell::clue(count)?;
        }

        match (self.get(coords), cell) {
            (Cell::Clue(old), Cell::Clue(new)) if old == new => Ok(()),
            (Cell::Clue(_), _) => Err(GridError::ClueOverwrite(coords)),
            _ => {
                self.cells[coords.to_nd_index()] = cell;
                Ok(())
            }
        }
    }

    /// Unchecked write for callers that already hold the ground truth.
    pub(crate) fn put(&mut self, coords: Coord2, cell: Cell) {
        self.cells[coords.to_nd_index()] = cell;
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use MarkOutcome::*;

        let coords = self.validate_coords(coords)?;
        let slot = &mut self.cells[coords.to_nd_index()];
        Ok(match *slot {
            Cell::Unknown => {
                *slot = Cell::Flagged;
                Changed
            }
            Cell::Flagged => {
                *slot = Cell::Unknown;
                Changed
            }
            Cell::Clue(_) => NoChange,
        })
    }

    /// Copy of this grid with externally tracked flags folded in.
    ///
    /// Flags that land on a revealed clue are ignored, the clue wins.
    pub fn with_flags(&self, flags: &[Coord2]) -> Result<Self> {
        let mut grid = self.clone();
        for &coords in flags {
            let coords = grid.validate_coords(coords)?;
            if grid.get(coords).is_unknown() {
                grid.cells[coords.to_nd_index()] = Cell::Flagged;
            } else if grid.get(coords).is_clue() {
                log::debug!("ignoring flag on revealed cell {coords:?}");
            }
        }
        Ok(grid)
    }
}

impl Index<Coord2> for Grid {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

impl FromStr for Grid {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self> {
        let rows = s
            .lines()
            .map(|line| {
                line.chars()
                    .filter(|ch| !ch.is_whitespace())
                    .map(Cell::from_char)
                    .collect::<Result<Vec<_>>>()
            })
            .filter(|row| !matches!(row, Ok(cells) if cells.is_empty()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_rows(rows)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for &cell in row {
                write!(f, "{}", cell.to_char())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec;

    #[test]
    fn new_grid_is_all_unknown() {
        let grid = Grid::new((3, 4));

        assert_eq!(grid.size(), (3, 4));
        assert_eq!(grid.count_cells(Cell::is_unknown), 12);
    }

    #[test]
    fn parses_text_and_ignores_spaces() {
        let grid: Grid = "
            1 2 .
            F 0 8
        "
        .parse()
        .unwrap();

        assert_eq!(grid.size(), (2, 3));
        assert_eq!(grid[(0, 1)], Cell::Clue(2));
        assert_eq!(grid[(0, 2)], Cell::Unknown);
        assert_eq!(grid[(1, 0)], Cell::Flagged);
        assert_eq!(grid.to_string(), "12.\nF08\n");
    }

    #[test]
    fn rejects_ragged_rows() {
        assert_eq!("12\n1".parse::<Grid>(), Err(GridError::InvalidBoardShape));
        assert_eq!(
            Grid::from_rows(vec![vec![Cell::Unknown], vec![]]),
            Err(GridError::InvalidBoardShape)
        );
    }

    #[test]
    fn rejects_impossible_clues() {
        assert_eq!(
            Grid::from_rows(vec![vec![Cell::Clue(9)]]),
            Err(GridError::InvalidClue(9))
        );
    }

    #[test]
    fn neighbors_stay_in_bounds() {
        let grid = Grid::new((3, 3));

        assert_eq!(grid.neighbors((0, 0)).as_slice(), &[(0, 1), (1, 0), (1, 1)]);
        assert_eq!(grid.neighbors((1, 1)).len(), 8);
        assert!(!grid.neighbors((1, 1)).contains(&(1, 1)));
    }

    #[test]
    fn clues_cannot_be_hidden_again() {
        let mut grid: Grid = "1.".parse().unwrap();

        assert_eq!(grid.set((0, 0), Cell::Unknown), Err(GridError::ClueOverwrite((0, 0))));
        assert_eq!(grid.set((0, 0), Cell::Clue(1)), Ok(()));
        assert_eq!(grid.set((0, 1), Cell::Clue(0)), Ok(()));
        assert_eq!(grid.set((0, 2), Cell::Flagged), Err(GridError::InvalidCoords));
        assert_eq!(grid.set((0, 1), Cell::Clue(9)), Err(GridError::InvalidClue(9)));
        assert_eq!(grid[(0, 1)], Cell::Clue(0));
    }

    #[test]
    fn toggle_flag_round_trips_and_skips_clues() {
        let mut grid: Grid = "1.".parse().unwrap();

        assert_eq!(grid.toggle_flag((0, 1)), Ok(MarkOutcome::Changed));
        assert_eq!(grid[(0, 1)], Cell::Flagged);
        assert_eq!(grid.toggle_flag((0, 1)), Ok(MarkOutcome::Changed));
        assert_eq!(grid[(0, 1)], Cell::Unknown);
        assert_eq!(grid.toggle_flag((0, 0)), Ok(MarkOutcome::NoChange));
    }

    #[test]
    fn with_flags_folds_only_unknown_cells() {
        let grid: Grid = "1..".parse().unwrap();

        let flagged = grid.with_flags(&[(0, 0), (0, 2)]).unwrap();

        assert_eq!(flagged[(0, 0)], Cell::Clue(1));
        assert_eq!(flagged[(0, 1)], Cell::Unknown);
        assert_eq!(flagged[(0, 2)], Cell::Flagged);
        assert_eq!(grid.with_flags(&[(1, 0)]), Err(GridError::InvalidCoords));
    }

    #[test]
    fn iter_is_row_major() {
        let grid: Grid = "12\n34".parse().unwrap();
        let coords: Vec<_> = grid.iter().map(|(coords, _)| coords).collect();

        assert_eq!(coords, [(0, 0), (0, 1), (1, 0), (1, 1)]);
    }
}
