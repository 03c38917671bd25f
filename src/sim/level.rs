//! Static level data: tile grid, wall segments and the start point

use glam::Vec2;

use super::line::Line;
use super::tiles::{CellRect, TileGrid};
use crate::error::SimError;

/// Read-only world a session plays in
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub grid: TileGrid,
    /// Wall segments the rigid body collides with
    pub lines: Vec<Line>,
    /// Player spawn point (center)
    pub start: Vec2,
    targets: Vec<CellRect>,
}

impl Level {
    /// Level whose wall segments trace the grid's solid tiles
    pub fn new(grid: TileGrid, start: Vec2) -> Self {
        let lines = grid.boundary_lines();
        Self::with_lines(grid, lines, start)
    }

    /// Level with hand-placed wall segments
    pub fn with_lines(grid: TileGrid, lines: Vec<Line>, start: Vec2) -> Self {
        let targets = grid.targets().collect();
        Self {
            grid,
            lines,
            start,
            targets,
        }
    }

    /// Parse rows (top row first). `S` marks the start cell and reads as empty.
    pub fn from_rows(rows: &[&str]) -> Result<Self, SimError> {
        let height = rows.len();
        let mut start = Vec2::new(0.5, 0.5);
        let mut cleaned = Vec::with_capacity(height);
        for (i, row) in rows.iter().enumerate() {
            if let Some(col) = row.find('S') {
                let ty = height - 1 - i;
                start = Vec2::new(col as f32 + 0.5, ty as f32 + 0.5);
            }
            cleaned.push(row.replace('S', "."));
        }
        let cleaned: Vec<&str> = cleaned.iter().map(String::as_str).collect();
        let grid = TileGrid::from_rows(&cleaned)?;
        Ok(Self::new(grid, start))
    }

    /// Target cells, cached at load
    pub fn targets(&self) -> &[CellRect] {
        &self.targets
    }

    /// Whether a world point is inside the playable area
    pub fn contains(&self, p: Vec2) -> bool {
        self.grid.contains(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tiles::Tile;

    #[test]
    fn test_from_rows_finds_start_and_targets() {
        let level = Level::from_rows(&[
            "....T",
            ".S...",
            "#####",
        ])
        .unwrap();
        assert_eq!(level.start, Vec2::new(1.5, 1.5));
        assert_eq!(level.grid.get(1, 1), Tile::Empty);
        assert_eq!(level.targets(), &[CellRect::cell(4, 2)]);
        assert!(!level.lines.is_empty());
    }

    #[test]
    fn test_from_rows_rejects_bad_rows() {
        assert!(Level::from_rows(&["S..", "##"]).is_err());
        assert!(Level::from_rows(&["S.?"]).is_err());
    }

    #[test]
    fn test_with_lines_keeps_given_lines() {
        let grid = TileGrid::empty(4, 4);
        let lines = vec![Line::new(Vec2::ZERO, Vec2::new(4.0, 0.0))];
        let level = Level::with_lines(grid, lines.clone(), Vec2::new(2.0, 2.0));
        assert_eq!(level.lines, lines);
        assert!(level.contains(Vec2::new(2.0, 2.0)));
        assert!(!level.contains(Vec2::new(2.0, -0.1)));
    }
}
