//! Cursor movement over the sensor's diamond-shaped active area.
//!
//! Rows near the top are narrower than the rest. Each row has a last
//! column, and wrapping out of it lands on the first column of the row
//! below. Rows past the table, including the phantom rows below the grid,
//! use the full width.

use super::GRID_HEIGHT;

const START_X: usize = 3;

/// (last column of this row, first column of the next row)
const ROW_BOUNDS: [(usize, usize); 4] = [(11, 2), (12, 1), (13, 1), (13, 0)];
const FULL_ROW: (usize, usize) = (14, 0);

fn bounds(y: usize) -> (usize, usize) {
    ROW_BOUNDS.get(y).copied().unwrap_or(FULL_ROW)
}

/// Inclusive column range the cursor visits on row `y`, or None for rows
/// that are not part of the grid.
pub fn row_span(y: usize) -> Option<(usize, usize)> {
    if y >= GRID_HEIGHT {
        return None;
    }
    let min = if y == 0 { START_X } else { bounds(y - 1).1 };
    Some((min, bounds(y).0))
}

/// Whether cell `(x, y)` is part of the sensor's active area.
pub fn is_active(x: usize, y: usize) -> bool {
    row_span(y).is_some_and(|(min, max)| (min..=max).contains(&x))
}

/// Decoder position. `y` may run past the grid while a report is still
/// being consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub x: usize,
    pub y: usize,
    pub pending_skip: bool,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            x: START_X,
            y: 0,
            pending_skip: false,
        }
    }
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// One step to the right, wrapping to the next row past its last column.
    #[must_use]
    pub fn advance(self) -> Self {
        let (max_x, next_min_x) = bounds(self.y);
        let x = self.x + 1;
        if x > max_x {
            Self {
                x: next_min_x,
                y: self.y + 1,
                ..self
            }
        } else {
            Self { x, ..self }
        }
    }

    #[must_use]
    pub fn advance_by(self, steps: usize) -> Self {
        (0..steps).fold(self, |c, _| c.advance())
    }

    pub fn in_grid(&self) -> bool {
        self.y < GRID_HEIGHT
    }
}
