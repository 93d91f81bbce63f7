use super::walker::is_active;
use super::{GRID_HEIGHT, GRID_WIDTH};
use std::sync::{Arc, Mutex, PoisonError};

/// Per-cell intensities, indexed `[x][y]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: [[u8; GRID_HEIGHT]; GRID_WIDTH],
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cells: [[0; GRID_HEIGHT]; GRID_WIDTH],
        }
    }
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[x][y]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.cells[x][y] = value;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().flatten().all(|&v| v == 0)
    }

    pub fn max(&self) -> u8 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }
}

const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..GRID_HEIGHT {
            for x in 0..GRID_WIDTH {
                let c = if !is_active(x, y) {
                    ' '
                } else {
                    let idx = self.cells[x][y] as usize * (ASCII_RAMP.len() - 1) / 255;
                    ASCII_RAMP[idx] as char
                };
                write!(f, "{}{}", c, c)?;
            }
            writeln!(f, "|")?;
        }
        Ok(())
    }
}

/// Latest-value slot shared between the decoder thread and its readers.
/// Publishing replaces the value; readers get an immutable snapshot that
/// later publishes never touch. Nothing queues up when nobody reads.
#[derive(Debug, Default)]
pub struct Latest<T> {
    slot: Arc<Mutex<Arc<T>>>,
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Clone> Latest<T> {
    pub fn publish(&self, value: &T) {
        let snapshot = Arc::new(value.clone());
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    pub fn snapshot(&self) -> Arc<T> {
        Arc::clone(&self.slot.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// The most recently published grid.
pub type SharedGrid = Latest<Grid>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_blank() {
        let grid = Grid::new();
        assert!(grid.is_blank());
        assert_eq!(grid.max(), 0);
    }

    #[test]
    fn clear_resets_cells() {
        let mut grid = Grid::new();
        grid.set(14, 12, 238);
        assert_eq!(grid.get(14, 12), 238);
        assert_eq!(grid.max(), 238);
        grid.clear();
        assert!(grid.is_blank());
    }

    #[test]
    fn snapshot_is_detached_from_working_grid() {
        let shared = SharedGrid::default();
        let mut working = Grid::new();
        working.set(5, 0, 51);
        shared.publish(&working);

        let held = shared.snapshot();
        working.set(5, 0, 0);
        working.set(6, 0, 119);
        assert_eq!(held.get(5, 0), 51);
        assert_eq!(held.get(6, 0), 0);

        shared.publish(&working);
        assert_eq!(held.get(5, 0), 51);
        assert_eq!(shared.snapshot().get(6, 0), 119);
    }

    #[test]
    fn display_draws_the_diamond() {
        let mut grid = Grid::new();
        grid.set(3, 0, 255);
        let text = grid.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), GRID_HEIGHT);
        assert!(lines[0].starts_with("      @@"));
        assert!(lines.iter().all(|l| l.len() == GRID_WIDTH * 2 + 1));
    }
}
