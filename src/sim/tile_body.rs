//! Tile-snapped platformer kinematics (the man form)
//!
//! The body is a 1x1 box whose bottom-left corner is `(x, y)`. Each step
//! integrates velocity, then resolves against the 2x2 tile neighbourhood at
//! `floor(position)` along the direction the box moved: vertical first, then
//! horizontal. Any motion that still ends in a new solid cell is undone. The axis-aligned
//! neighbour always wins; the diagonal cell only matters when the body is
//! already offset on the other axis, so it never catches on a corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tiles::{CellRect, TileGrid};
use crate::bound;
use crate::input::Controls;
use crate::tuning::TileTuning;

/// What the last resolution pass touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolved {
    pub landed: bool,
    pub ceiling: bool,
    pub wall: bool,
}

/// Axis-aligned tile-kinematics entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileBody {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub ddx: f32,
    pub ddy: f32,

    pub left: bool,
    pub right: bool,
    pub jump: bool,

    pub falling: bool,
    pub jumping: bool,

    pub tuning: TileTuning,
}

impl TileBody {
    pub fn new(tuning: TileTuning) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            dx: 0.0,
            dy: 0.0,
            ddx: 0.0,
            ddy: 0.0,
            left: false,
            right: false,
            jump: false,
            falling: false,
            jumping: false,
            tuning,
        }
    }

    /// Place the body at (x, y), at rest, with no keys held
    pub fn reset(&mut self, x: f32, y: f32) {
        *self = Self {
            x,
            y,
            ..Self::new(self.tuning)
        };
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.dx, self.dy)
    }

    pub fn set_controls(&mut self, controls: &Controls) {
        self.left = controls.left;
        self.right = controls.right;
        self.jump = controls.jump;
    }

    /// Cells the box currently covers (1x1 up to 2x2)
    pub fn covered_cells(&self) -> CellRect {
        cells_at(self.x, self.y)
    }

    /// Whether the box shares a cell with `rect`
    pub fn check_collides(&self, rect: &CellRect) -> bool {
        super::collision::rects_overlap(&self.covered_cells(), rect)
    }

    /// Whether any covered cell is solid
    pub fn overlaps_solid(&self, grid: &TileGrid) -> bool {
        self.covered_cells()
            .cells()
            .any(|(tx, ty)| grid.is_solid(tx, ty))
    }

    /// Covers a solid cell that `before` did not
    fn enters_solid(&self, before: &CellRect, grid: &TileGrid) -> bool {
        self.covered_cells()
            .cells()
            .any(|(tx, ty)| grid.is_solid(tx, ty) && !before.contains(tx, ty))
    }

    /// Advance one fixed step against `grid`
    pub fn update(&mut self, dt: f32, grid: &TileGrid) -> Resolved {
        let t = self.tuning;
        let was_left = self.dx < 0.0;
        let was_right = self.dx > 0.0;
        let falling = self.falling;
        let scale = if falling { 0.5 } else { 1.0 };
        let friction = t.friction * scale;
        let accel = t.accel * scale;
        let (x0, y0) = (self.x, self.y);

        self.ddx = 0.0;
        self.ddy = -t.gravity;

        if self.left {
            self.ddx -= accel;
        } else if was_left {
            self.ddx += friction;
        }

        if self.right {
            self.ddx += accel;
        } else if was_right {
            self.ddx -= friction;
        }

        if self.jump && !self.jumping && !falling {
            self.ddy += t.impulse;
            self.jumping = true;
        }

        self.x += dt * self.dx;
        self.y += dt * self.dy;
        self.dx = bound(self.dx + dt * self.ddx, -t.maxdx, t.maxdx);
        self.dy = bound(self.dy + dt * self.ddy, -t.maxdy, t.maxdy);

        // Friction must stop the body, not push it back the other way
        if (was_left && self.dx > 0.0) || (was_right && self.dx < 0.0) {
            self.dx = 0.0;
        }

        // Resolve along the way the box actually moved this step
        let moved = Vec2::new(
            travel(self.x - x0, self.dx),
            travel(self.y - y0, self.dy),
        );
        let mut resolved = self.resolve(grid, moved);

        let before = cells_at(x0, y0);
        if self.enters_solid(&before, grid) {
            resolved.wall |= self.roll_back(x0, y0, &before, grid);
        }

        self.falling = !self.supported(grid);
        resolved
    }

    fn resolve(&mut self, grid: &TileGrid, moved: Vec2) -> Resolved {
        let solid = |tx: i32, ty: i32| grid.is_solid(tx, ty);
        let mut resolved = Resolved::default();

        let (tx, ty, off_x, off_y) = self.cell();

        if moved.y > 0.0 {
            // Top edge reaches into row ty + 1
            if (solid(tx, ty + 1) && !solid(tx, ty))
                || (off_x && solid(tx + 1, ty + 1) && !solid(tx + 1, ty))
            {
                self.y = ty as f32;
                self.dy = 0.0;
                resolved.ceiling = true;
            }
        } else if moved.y < 0.0 {
            // Row holding (or just under) the bottom edge
            let below = if off_y { ty } else { ty - 1 };
            if (solid(tx, below) && !solid(tx, below + 1))
                || (off_x && solid(tx + 1, below) && !solid(tx + 1, below + 1))
            {
                self.y = (below + 1) as f32;
                self.dy = 0.0;
                self.falling = false;
                self.jumping = false;
                resolved.landed = true;
            }
        }

        let (tx, ty, off_x, off_y) = self.cell();

        if moved.x > 0.0 {
            if (solid(tx + 1, ty) && !solid(tx, ty))
                || (off_y && solid(tx + 1, ty + 1) && !solid(tx, ty + 1))
            {
                self.x = tx as f32;
                self.dx = 0.0;
                resolved.wall = true;
            }
        } else if moved.x < 0.0 {
            let beside = if off_x { tx } else { tx - 1 };
            if (solid(beside, ty) && !solid(beside + 1, ty))
                || (off_y && solid(beside, ty + 1) && !solid(beside + 1, ty + 1))
            {
                self.x = (beside + 1) as f32;
                self.dx = 0.0;
                resolved.wall = true;
            }
        }

        resolved
    }

    /// Undo this step's motion on as few axes as possible so no new solid
    /// cell is covered. Returns whether the horizontal motion was undone.
    fn roll_back(&mut self, x0: f32, y0: f32, before: &CellRect, grid: &TileGrid) -> bool {
        let (x, y) = (self.x, self.y);
        for (cx, cy) in [(x0, y), (x, y0), (x0, y0)] {
            self.x = cx;
            self.y = cy;
            if !self.enters_solid(before, grid) {
                break;
            }
        }
        log::trace!(
            "Tile body rolled back from ({:.3}, {:.3}) to ({:.3}, {:.3})",
            x,
            y,
            self.x,
            self.y
        );
        if self.y != y {
            self.dy = 0.0;
        }
        if self.x != x {
            self.dx = 0.0;
            return true;
        }
        false
    }

    /// Move a box that covers solid cells to the nearest spot that does not,
    /// snapping each axis to the cell grid where needed. Velocity on a moved
    /// axis is dropped. Returns whether the box moved.
    pub fn settle(&mut self, grid: &TileGrid) -> bool {
        if !self.overlaps_solid(grid) {
            return false;
        }
        let (fx, fy) = (self.x.floor(), self.y.floor());
        let xs = [self.x, fx, fx + 1.0, fx - 1.0, fx + 2.0];
        let ys = [self.y, fy, fy + 1.0, fy - 1.0, fy + 2.0];

        let here = self.position();
        let mut best: Option<(f32, Vec2)> = None;
        for &cy in &ys {
            for &cx in &xs {
                let spot = Vec2::new(cx, cy);
                let free = cells_at(cx, cy)
                    .cells()
                    .all(|(tx, ty)| !grid.is_solid(tx, ty));
                let distance = spot.distance_squared(here);
                if free && best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, spot));
                }
            }
        }

        let Some((_, spot)) = best else {
            log::warn!("Tile body at {:?} is boxed in by solid cells", here);
            return false;
        };
        if spot.x != self.x {
            self.dx = 0.0;
        }
        if spot.y != self.y {
            self.dy = 0.0;
        }
        self.x = spot.x;
        self.y = spot.y;
        log::debug!("Tile body pushed out of solid cells from {:?} to {:?}", here, spot);
        true
    }

    /// Resting flush on a solid cell (directly, or via the diagonal when offset)
    pub fn supported(&self, grid: &TileGrid) -> bool {
        let (tx, ty, off_x, off_y) = self.cell();
        !off_y && (grid.is_solid(tx, ty - 1) || (off_x && grid.is_solid(tx + 1, ty - 1)))
    }

    /// Cell of the bottom-left corner plus whether the box straddles the
    /// next column / row
    fn cell(&self) -> (i32, i32, bool, bool) {
        let fx = self.x.floor();
        let fy = self.y.floor();
        (fx as i32, fy as i32, self.x > fx, self.y > fy)
    }
}

/// Cells covered by a box with its bottom-left corner at (x, y)
fn cells_at(x: f32, y: f32) -> CellRect {
    let tx = x.floor();
    let ty = y.floor();
    CellRect::new(
        tx as i32,
        ty as i32,
        if x > tx { 2 } else { 1 },
        if y > ty { 2 } else { 1 },
    )
}

/// Direction of travel on one axis: the displacement, or the velocity when
/// the body did not move
fn travel(displacement: f32, velocity: f32) -> f32 {
    if displacement != 0.0 { displacement } else { velocity }
}
