use serde::{Deserialize, Serialize};

use crate::*;

/// Highest mine count a clue can show: the full Moore neighborhood.
pub const MAX_CLUE: u8 = 8;

/// Player-visible state of a single grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Not revealed yet, nothing is known about it.
    Unknown,
    /// Marked as a mine by the player or the bot. A working hypothesis, not ground truth.
    Flagged,
    /// Revealed, showing the number of mines among its neighbors.
    ///
    /// Built directly, the count is unchecked. [`Cell::clue`], [`Grid::from_rows`],
    /// [`Grid::set`] and text parsing reject counts above [`MAX_CLUE`].
    Clue(u8),
}

impl Cell {
    /// Builds a clue cell, rejecting counts a neighborhood cannot hold.
    pub const fn clue(count: u8) -> Result<Self> {
        if count > MAX_CLUE {
            Err(GridError::InvalidClue(count))
        } else {
            Ok(Self::Clue(count))
        }
    }

    pub const fn is_unknown(self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }

    pub const fn is_clue(self) -> bool {
        matches!(self, Self::Clue(_))
    }

    pub const fn clue_value(self) -> Option<u8> {
        match self {
            Self::Clue(count) => Some(count),
            Self::Unknown | Self::Flagged => None,
        }
    }

    /// Clue that still carries information, i.e. anything but a zero.
    pub const fn nonzero_clue(self) -> Option<u8> {
        match self {
            Self::Clue(count) if count > 0 => Some(count),
            _ => None,
        }
    }

    pub(crate) const fn to_char(self) -> char {
        match self {
            Self::Unknown => '.',
            Self::Flagged => 'F',
            Self::Clue(count) => (b'0' + count) as char,
        }
    }

    pub(crate) fn from_char(ch: char) -> Result<Self> {
        match ch {
            '.' | '-' => Ok(Self::Unknown),
            'F' | 'f' | '*' => Ok(Self::Flagged),
            '0'..='9' => Self::clue(ch as u8 - b'0'),
            other => Err(GridError::InvalidCellChar(other)),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clue_rejects_counts_above_eight() {
        assert_eq!(Cell::clue(8), Ok(Cell::Clue(8)));
        assert_eq!(Cell::clue(9), Err(GridError::InvalidClue(9)));
    }

    #[test]
    fn nonzero_clue_skips_zero_and_unrevealed() {
        assert_eq!(Cell::Clue(0).nonzero_clue(), None);
        assert_eq!(Cell::Clue(3).nonzero_clue(), Some(3));
        assert_eq!(Cell::Flagged.nonzero_clue(), None);
        assert_eq!(Cell::Unknown.nonzero_clue(), None);
    }

    #[test]
    fn char_mapping_accepts_aliases() {
        assert_eq!(Cell::from_char('-'), Ok(Cell::Unknown));
        assert_eq!(Cell::from_char('*'), Ok(Cell::Flagged));
        assert_eq!(Cell::from_char('9'), Err(GridError::InvalidClue(9)));
        assert_eq!(Cell::from_char('x'), Err(GridError::InvalidCellChar('x')));
        assert_eq!(Cell::Clue(4).to_char(), '4');
    }
}
