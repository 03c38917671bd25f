//! Tile grid
//!
//! World units are tiles: tile (tx, ty) covers `[tx, tx+1) x [ty, ty+1)`.
//! Y grows upward and row 0 is the bottom row. The grid is read-only while a
//! session runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::line::Line;
use crate::error::SimError;

/// Tile codes as stored by the level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Solid,
    /// Goal cell; not solid
    Target,
}

impl Tile {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Tile::Empty),
            1 => Some(Tile::Solid),
            2 => Some(Tile::Target),
            _ => None,
        }
    }

    #[inline]
    pub fn is_solid(&self) -> bool {
        *self == Tile::Solid
    }
}

/// Integer rectangle in tile units (x, y is the bottom-left cell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl CellRect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// A single cell
    pub const fn cell(x: i32, y: i32) -> Self {
        Self::new(x, y, 1, 1)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new((self.x + self.w) as f32, (self.y + self.h) as f32)
    }

    pub fn contains(&self, tx: i32, ty: i32) -> bool {
        tx >= self.x && ty >= self.y && tx < self.x + self.w && ty < self.y + self.h
    }

    /// Every cell in the rectangle, row by row from the bottom
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> {
        let CellRect { x, y, w, h } = *self;
        (y..y + h).flat_map(move |ty| (x..x + w).map(move |tx| (tx, ty)))
    }
}

/// Fixed-size grid of tiles, row-major from the bottom row up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileGrid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl TileGrid {
    /// Build from raw level codes (row-major, row 0 at the bottom)
    pub fn new(width: usize, height: usize, codes: &[u8]) -> Result<Self, SimError> {
        if codes.len() != width * height {
            return Err(SimError::GridSize {
                width,
                height,
                len: codes.len(),
            });
        }
        let cells = codes
            .iter()
            .enumerate()
            .map(|(index, &code)| Tile::from_code(code).ok_or(SimError::UnknownTile { index, code }))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// An all-empty grid
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Tile::Empty; width * height],
        }
    }

    /// Build from text rows listed top row first: `#` solid, `T` target,
    /// `.` or space empty
    pub fn from_rows(rows: &[&str]) -> Result<Self, SimError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut cells = vec![Tile::Empty; width * height];
        for (row, text) in rows.iter().enumerate() {
            if text.len() != width {
                return Err(SimError::RaggedRow {
                    row,
                    expected: width,
                    found: text.len(),
                });
            }
            let ty = height - 1 - row;
            for (tx, ch) in text.bytes().enumerate() {
                let index = tx + ty * width;
                cells[index] = match ch {
                    b'#' => Tile::Solid,
                    b'T' => Tile::Target,
                    b'.' | b' ' => Tile::Empty,
                    code => return Err(SimError::UnknownTile { index, code }),
                };
            }
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, tx: i32, ty: i32) -> Option<usize> {
        let x = usize::try_from(tx).ok()?;
        let y = usize::try_from(ty).ok()?;
        (x < self.width && y < self.height).then(|| x + y * self.width)
    }

    /// Tile at (tx, ty); anything outside the grid reads as empty
    #[inline]
    pub fn get(&self, tx: i32, ty: i32) -> Tile {
        self.index(tx, ty)
            .map(|i| self.cells[i])
            .unwrap_or(Tile::Empty)
    }

    #[inline]
    pub fn is_solid(&self, tx: i32, ty: i32) -> bool {
        self.get(tx, ty).is_solid()
    }

    /// Overwrite one tile (level loading only, never during a step)
    pub fn set(&mut self, tx: i32, ty: i32, tile: Tile) {
        if let Some(i) = self.index(tx, ty) {
            self.cells[i] = tile;
        }
    }

    /// Whether a world point lies inside the grid's extent
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width as f32 && p.y < self.height as f32
    }

    /// All target cells, bottom row first
    pub fn targets(&self) -> impl Iterator<Item = CellRect> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Tile::Target)
            .map(|(i, _)| CellRect::cell((i % self.width) as i32, (i / self.width) as i32))
    }

    /// Wall segments along every solid edge that faces a non-solid cell.
    ///
    /// Collinear edges are merged into one segment so a body sliding along a
    /// floor never touches two segments at a seam. Each segment's normal
    /// points out of the solid.
    pub fn boundary_lines(&self) -> Vec<Line> {
        let w = self.width as i32;
        let h = self.height as i32;
        let mut lines = Vec::new();

        // Horizontal runs: bottom faces (normal -y) and top faces (normal +y)
        for ty in 0..h {
            let mut bottom: Option<i32> = None;
            let mut top: Option<i32> = None;
            for tx in 0..=w {
                let solid = tx < w && self.is_solid(tx, ty);
                let open_below = solid && !self.is_solid(tx, ty - 1);
                let open_above = solid && !self.is_solid(tx, ty + 1);

                match (bottom, open_below) {
                    (None, true) => bottom = Some(tx),
                    (Some(start), false) => {
                        lines.push(Line::new(
                            Vec2::new(tx as f32, ty as f32),
                            Vec2::new(start as f32, ty as f32),
                        ));
                        bottom = None;
                    }
                    _ => {}
                }
                match (top, open_above) {
                    (None, true) => top = Some(tx),
                    (Some(start), false) => {
                        lines.push(Line::new(
                            Vec2::new(start as f32, (ty + 1) as f32),
                            Vec2::new(tx as f32, (ty + 1) as f32),
                        ));
                        top = None;
                    }
                    _ => {}
                }
            }
        }

        // Vertical runs: left faces (normal -x) and right faces (normal +x)
        for tx in 0..w {
            let mut left: Option<i32> = None;
            let mut right: Option<i32> = None;
            for ty in 0..=h {
                let solid = ty < h && self.is_solid(tx, ty);
                let open_left = solid && !self.is_solid(tx - 1, ty);
                let open_right = solid && !self.is_solid(tx + 1, ty);

                match (left, open_left) {
                    (None, true) => left = Some(ty),
                    (Some(start), false) => {
                        lines.push(Line::new(
                            Vec2::new(tx as f32, start as f32),
                            Vec2::new(tx as f32, ty as f32),
                        ));
                        left = None;
                    }
                    _ => {}
                }
                match (right, open_right) {
                    (None, true) => right = Some(ty),
                    (Some(start), false) => {
                        lines.push(Line::new(
                            Vec2::new((tx + 1) as f32, ty as f32),
                            Vec2::new((tx + 1) as f32, start as f32),
                        ));
                        right = None;
                    }
                    _ => {}
                }
            }
        }

        lines
    }
}
