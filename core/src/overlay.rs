use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// Pixel position on screen.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Half-open pixel rectangle, `right` and `bottom` excluded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl ScreenRect {
    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub const fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.left
            && point.x < self.right
            && point.y >= self.top
            && point.y < self.bottom
    }
}

/// Where the grid sits on screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardGeometry {
    /// Top-left pixel of cell `(0, 0)`.
    pub origin: ScreenPoint,
    pub cell_size: u32,
}

impl Default for BoardGeometry {
    fn default() -> Self {
        Self {
            origin: ScreenPoint::default(),
            cell_size: 52,
        }
    }
}

impl BoardGeometry {
    pub const fn new(origin: ScreenPoint, cell_size: u32) -> Self {
        Self { origin, cell_size }
    }

    fn cell_px(&self) -> i32 {
        i32::try_from(self.cell_size).unwrap_or(i32::MAX)
    }

    pub fn cell_rect(&self, (row, col): Coord2) -> ScreenRect {
        let size = self.cell_px();
        let left = self.origin.x + i32::from(col) * size;
        let top = self.origin.y + i32::from(row) * size;
        ScreenRect {
            left,
            top,
            right: left + size,
            bottom: top + size,
        }
    }

    /// Point to click to hit `coords`.
    pub fn cell_center(&self, coords: Coord2) -> ScreenPoint {
        let rect = self.cell_rect(coords);
        let half = self.cell_px() / 2;
        ScreenPoint::new(rect.left + half, rect.top + half)
    }

    /// Screen area covered by a grid of `size`.
    pub fn board_rect(&self, (rows, cols): Coord2) -> ScreenRect {
        let size = self.cell_px();
        ScreenRect {
            left: self.origin.x,
            top: self.origin.y,
            right: self.origin.x + i32::from(cols) * size,
            bottom: self.origin.y + i32::from(rows) * size,
        }
    }

    pub fn mark(&self, coords: Coord2, kind: MarkKind) -> OverlayMark {
        OverlayMark {
            coords,
            rect: self.cell_rect(coords),
            kind,
        }
    }

    /// Cell under `point`, if it lands inside a grid of `size`.
    pub fn cell_at(&self, point: ScreenPoint, size: Coord2) -> Option<Coord2> {
        let cell = self.cell_px();
        if cell == 0 || !self.board_rect(size).contains(point) {
            return None;
        }
        let row = (point.y - self.origin.y) / cell;
        let col = (point.x - self.origin.x) / cell;
        Some((Coord::try_from(row).ok()?, Coord::try_from(col).ok()?))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkKind {
    Mine,
    Safe,
    Chord,
    Guess,
}

/// One highlighted cell on the overlay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayMark {
    pub coords: Coord2,
    pub rect: ScreenRect,
    pub kind: MarkKind,
}

/// Marks to draw for `deductions`: mines, then safe cells, then chords, then the guess.
pub fn overlay_marks(geometry: &BoardGeometry, deductions: &Deductions) -> Vec<OverlayMark> {
    let categories = [
        (MarkKind::Mine, &deductions.mines),
        (MarkKind::Safe, &deductions.safe),
        (MarkKind::Chord, &deductions.chords),
    ];

    let mut marks: Vec<_> = categories
        .into_iter()
        .flat_map(|(kind, cells)| cells.iter().map(move |&coords| geometry.mark(coords, kind)))
        .collect();
    marks.extend(
        deductions
            .lowest_risk
            .map(|guess| geometry.mark(guess.coords, MarkKind::Guess)),
    );
    marks
}
