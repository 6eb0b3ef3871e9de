use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Grid rows do not all have the same length")]
    InvalidBoardShape,
    #[error("Clue value {0} is larger than 8")]
    InvalidClue(u8),
    #[error("Unrecognized cell character {0:?}")]
    InvalidCellChar(char),
    #[error("Clue at {0:?} cannot be turned back into an unrevealed cell")]
    ClueOverwrite(Coord2),
    #[error("Too many mines")]
    TooManyMines,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
}

pub type Result<T> = core::result::Result<T, GridError>;
