//! The farm layout, standing in for the map loader.
//!
//! The map loader contract is a grid size plus the set of farmable tile
//! coordinates, consumed once at construction. Here that comes from an
//! ASCII layout: `F` marks a farmable tile, anything else is scenery.
//! Row 0 is the bottom row, matching world space.

use std::collections::HashSet;

use crate::shared::GridPos;

pub const FARM_MAP: &[&str] = &[
    "....................",
    "....................",
    "..FFFFFF...FFFFFF...",
    "..FFFFFF...FFFFFF...",
    "..FFFFFF...FFFFFF...",
    "..FFFFFF...FFFFFF...",
    "....................",
    "..FFFFFFFFFFFFFFF...",
    "..FFFFFFFFFFFFFFF...",
    "..FFFFFFFFFFFFFFF...",
    "....................",
    "....................",
];

/// Parse a layout into (cols, rows, farmable coordinates).
pub fn parse_farm_map(layout: &[&str]) -> (i32, i32, HashSet<GridPos>) {
    let rows = layout.len() as i32;
    let cols = layout.iter().map(|line| line.len()).max().unwrap_or(0) as i32;

    let mut farmable = HashSet::new();
    for (i, line) in layout.iter().enumerate() {
        // The last layout line is row 0 in grid space.
        let row = rows - 1 - i as i32;
        for (col, ch) in line.chars().enumerate() {
            if ch == 'F' {
                farmable.insert((col as i32, row));
            }
        }
    }
    (cols, rows, farmable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dimensions_and_farmable_set() {
        let (cols, rows, farmable) = parse_farm_map(&["..F", "F.."]);
        assert_eq!((cols, rows), (3, 2));
        assert_eq!(farmable, [(2, 1), (0, 0)].into_iter().collect());
    }

    #[test]
    fn bundled_map_is_in_bounds() {
        let (cols, rows, farmable) = parse_farm_map(FARM_MAP);
        assert!(!farmable.is_empty());
        for &(col, row) in &farmable {
            assert!(col >= 0 && col < cols);
            assert!(row >= 0 && row < rows);
        }
    }
}
