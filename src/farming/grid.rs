//! The soil grid — per-cell cultivation flags and pixel hit-testing.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::shared::*;

/// Rectangular array of [`TileState`], dimensions fixed at construction.
///
/// Exclusively owns tile state. The only write path is [`FarmGrid::mutate`],
/// used by the soil orchestrator; everything else reads through queries.
#[derive(Debug, Clone)]
pub struct FarmGrid {
    cols: i32,
    rows: i32,
    tiles: Vec<TileState>,
}

impl FarmGrid {
    /// Build a `cols` x `rows` grid with all flags clear, then mark each
    /// given coordinate farmable. A coordinate outside the dimensions is a
    /// fatal configuration error, not a runtime one.
    pub fn new(cols: i32, rows: i32, farmable: &HashSet<GridPos>) -> Result<Self, ConfigError> {
        let mut grid = Self {
            cols,
            rows,
            tiles: vec![TileState::default(); (cols * rows) as usize],
        };
        for &(col, row) in farmable {
            let idx = grid
                .index((col, row))
                .ok_or(ConfigError::FarmableOutOfBounds { col, row, cols, rows })?;
            grid.tiles[idx].farmable = true;
        }
        Ok(grid)
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    fn index(&self, (col, row): GridPos) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols || row >= self.rows {
            return None;
        }
        Some((row * self.cols + col) as usize)
    }

    /// Resolve a world-space point to the farmable cell under it.
    /// Returns `None` for points over non-farmable ground, so player
    /// actions on scenery never touch state.
    pub fn cell_at(&self, point: Vec2) -> Option<GridPos> {
        let pos = (
            (point.x / TILE_SIZE).floor() as i32,
            (point.y / TILE_SIZE).floor() as i32,
        );
        let idx = self.index(pos)?;
        self.tiles[idx].farmable.then_some(pos)
    }

    /// Tile state at a cell; default (all flags clear) outside the grid.
    pub fn state(&self, pos: GridPos) -> TileState {
        self.index(pos)
            .map(|idx| self.tiles[idx])
            .unwrap_or_default()
    }

    /// Whether the cell is tilled. Out-of-bounds counts as not tilled,
    /// which is what the autotile resolver needs at grid edges.
    pub fn tilled(&self, pos: GridPos) -> bool {
        self.state(pos).tilled
    }

    /// The only write path. No-op outside the grid.
    pub fn mutate(&mut self, pos: GridPos, f: impl FnOnce(&mut TileState)) {
        if let Some(idx) = self.index(pos) {
            f(&mut self.tiles[idx]);
        }
    }

    /// World-space rectangle covered by a cell.
    pub fn cell_rect(&self, (col, row): GridPos) -> Rect {
        let min = Vec2::new(col as f32 * TILE_SIZE, row as f32 * TILE_SIZE);
        Rect::from_corners(min, min + Vec2::splat(TILE_SIZE))
    }

    /// All cells whose state matches the predicate.
    pub fn cells_where(&self, pred: impl Fn(TileState) -> bool) -> Vec<GridPos> {
        let mut out = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if pred(self.tiles[(row * self.cols + col) as usize]) {
                    out.push((col, row));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid() -> FarmGrid {
        let farmable: HashSet<GridPos> = [(0, 0), (1, 1), (2, 2)].into_iter().collect();
        FarmGrid::new(3, 3, &farmable).unwrap()
    }

    #[test]
    fn farmable_out_of_bounds_is_config_error() {
        let farmable: HashSet<GridPos> = [(3, 0)].into_iter().collect();
        let err = FarmGrid::new(3, 3, &farmable).unwrap_err();
        assert_eq!(
            err,
            ConfigError::FarmableOutOfBounds { col: 3, row: 0, cols: 3, rows: 3 }
        );
    }

    #[test]
    fn cell_at_hits_only_farmable_tiles() {
        let grid = small_grid();
        // Centre of (1, 1) — farmable.
        assert_eq!(grid.cell_at(Vec2::new(96.0, 96.0)), Some((1, 1)));
        // Centre of (0, 1) — inside the grid but not farmable.
        assert_eq!(grid.cell_at(Vec2::new(32.0, 96.0)), None);
        // Way outside the map.
        assert_eq!(grid.cell_at(Vec2::new(-10.0, 5000.0)), None);
    }

    #[test]
    fn state_out_of_bounds_is_all_clear() {
        let grid = small_grid();
        assert_eq!(grid.state((-1, 0)), TileState::default());
        assert!(!grid.tilled((0, 99)));
    }

    #[test]
    fn mutate_outside_grid_is_noop() {
        let mut grid = small_grid();
        grid.mutate((99, 99), |t| t.tilled = true);
        assert!(grid.cells_where(|t| t.tilled).is_empty());
    }
}
