//! The morphing hero
//!
//! A player owns both motion models and hands its state from one to the other
//! when the morph enters a new form. Only one model is live at a time:
//! the tile body for the man (unless tuned to run the man on the rigid body)
//! and the rigid body for the missile.

use glam::{Quat, Vec2, Vec3};

use super::collision::{CollisionPoint, circle_box};
use super::forms::{FormPhysics, ManPhysics, MissilePhysics};
use super::line::Line;
use super::math::heading;
use super::morph::{Form, Morph};
use super::rigid_body::{Contacts, RigidBody};
use super::tile_body::TileBody;
use super::tiles::{CellRect, TileGrid};
use crate::consts::{MISSILE_POINT_OFFSET, MISSILE_POINT_RADIUS, MORPH_ALIGN_TOLERANCE};
use crate::input::{Controls, InputSource, Replay};
use crate::transform::RenderTransform;
use crate::tuning::{ManModel, Tuning};
use crate::{bound, heading_of};

/// Offset from the player center to the tile body's bottom-left corner
const HALF_TILE: Vec2 = Vec2::splat(0.5);

pub struct Player {
    id: u32,
    tuning: Tuning,
    start: Vec2,

    tile: TileBody,
    rigid: RigidBody,
    morph: Morph,
    /// Form whose physics currently moves the player
    form: Form,

    controls: Controls,
    morph_held: bool,
    input: Box<dyn InputSource>,
    /// Controls used so far; `None` for ghosts
    recording: Option<Replay>,

    points: [CollisionPoint; 2],
    previous: (Vec3, Quat),
}

impl Player {
    /// New player centered on `start`, driven by `input`
    pub fn new(id: u32, start: Vec2, input: Box<dyn InputSource>, tuning: Tuning) -> Self {
        let recording = (!input.is_replay()).then(Replay::new);
        let mut player = Self {
            id,
            tuning,
            start,
            tile: TileBody::new(tuning.tile),
            rigid: RigidBody::new(),
            morph: Morph::default(),
            form: Form::Man,
            controls: Controls::IDLE,
            morph_held: false,
            input,
            recording,
            points: [
                CollisionPoint::new(Vec3::new(0.0, MISSILE_POINT_OFFSET, 0.0), MISSILE_POINT_RADIUS),
                CollisionPoint::new(Vec3::new(0.0, -MISSILE_POINT_OFFSET, 0.0), MISSILE_POINT_RADIUS),
            ],
            previous: (start.extend(0.0), Quat::IDENTITY),
        };
        player.reset(start.x, start.y);
        player
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Driven by recorded input: never recorded, never wins or loses
    pub fn is_ghost(&self) -> bool {
        self.input.is_replay()
    }

    pub fn form(&self) -> Form {
        self.form
    }

    pub fn morph(&self) -> &Morph {
        &self.morph
    }

    pub fn tile_body(&self) -> &TileBody {
        &self.tile
    }

    pub fn rigid_body(&self) -> &RigidBody {
        &self.rigid
    }

    /// Controls applied on the last step
    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Everything recorded since the last reset (live players only)
    pub fn replay(&self) -> Option<&Replay> {
        self.recording.as_ref()
    }

    /// Whether the man is currently simulated on the tile grid
    fn on_tiles(&self) -> bool {
        self.form == Form::Man && self.tuning.man_model == ManModel::Tile
    }

    /// Center of the player in world units
    pub fn position(&self) -> Vec3 {
        if self.on_tiles() {
            (self.tile.position() + HALF_TILE).extend(0.0)
        } else {
            self.rigid.position()
        }
    }

    pub fn orientation(&self) -> Quat {
        if self.on_tiles() {
            Quat::IDENTITY
        } else {
            self.rigid.orientation()
        }
    }

    /// Nose angle about +z; zero when upright
    pub fn heading(&self) -> f32 {
        heading(self.orientation())
    }

    pub fn velocity(&self) -> Vec3 {
        if self.on_tiles() {
            self.tile.velocity().extend(0.0)
        } else {
            self.rigid.velocity()
        }
    }

    pub fn scale(&self) -> Vec3 {
        self.morph.scale()
    }

    /// Center the player on (x, y) as a man at rest, dropping any recording
    pub fn reset(&mut self, x: f32, y: f32) {
        let center = Vec2::new(x, y);
        let corner = center - HALF_TILE;
        self.tile.reset(corner.x, corner.y);
        self.rigid.reset(x, y);
        self.morph.reset();
        self.form = Form::Man;
        self.controls = Controls::IDLE;
        self.morph_held = false;
        if let Some(recording) = &mut self.recording {
            recording.clear();
        }
        self.previous = (center.extend(0.0), Quat::IDENTITY);
    }

    /// Back to where the player started
    pub fn restart(&mut self) {
        self.reset(self.start.x, self.start.y);
    }

    /// Whether the player's collision shape touches the cells in `rect`
    pub fn check_collides(&self, rect: &CellRect) -> bool {
        if self.on_tiles() {
            return self.tile.check_collides(rect);
        }
        let state = self.rigid.state();
        self.points
            .iter()
            .any(|p| circle_box(p.to_world(state).truncate(), p.r, rect))
    }

    /// Switch to missile physics, nose along the current velocity when moving
    pub fn change_to_missile(&mut self) {
        if self.form == Form::Missile {
            return;
        }
        let center = self.position();
        let velocity = self.velocity();
        if self.tuning.man_model == ManModel::Tile {
            self.rigid.reset(center.x, center.y);
            self.rigid.set_velocity(velocity);
        }
        let heading = (velocity.length() >= MORPH_ALIGN_TOLERANCE)
            .then(|| heading_of(velocity.truncate()));
        self.rigid.set_rotation(heading);
        self.form = Form::Missile;
        log::debug!(
            "Player {} became a missile at ({:.2}, {:.2}), heading {:?}",
            self.id,
            center.x,
            center.y,
            heading
        );
    }

    /// Switch back to the man, upright, keeping position and velocity. The
    /// tile box is pushed clear of any solid cell it lands in.
    pub fn change_to_man(&mut self, grid: &TileGrid) {
        if self.form == Form::Man {
            return;
        }
        self.rigid.set_rotation(None);
        if self.tuning.man_model == ManModel::Tile {
            let t = self.tuning.tile;
            let corner = self.rigid.position().truncate() - HALF_TILE;
            let velocity = self.rigid.velocity();
            self.tile.reset(corner.x, corner.y);
            self.tile.dx = bound(velocity.x, -t.maxdx, t.maxdx);
            self.tile.dy = bound(velocity.y, -t.maxdy, t.maxdy);
            self.tile.falling = true;
            self.tile.settle(grid);
        }
        self.form = Form::Man;
        log::debug!("Player {} became a man at {:?}", self.id, self.position());
    }

    /// Run one fixed step: poll input, morph, then move the live body
    pub fn update(&mut self, tick: u64, dt: f32, grid: &TileGrid, lines: &[Line]) {
        self.previous = (self.position(), self.orientation());

        let controls = self.input.controls(tick);
        if let Some(recording) = &mut self.recording {
            recording.record(controls);
        }
        let pressed = controls.morph && !self.morph_held;
        self.morph_held = controls.morph;
        self.controls = controls;

        if pressed {
            self.morph.go();
        }
        match self.morph.update() {
            Some(Form::Missile) => self.change_to_missile(),
            Some(Form::Man) => self.change_to_man(grid),
            None => {}
        }

        if self.on_tiles() {
            self.tile.set_controls(&controls);
            self.tile.update(dt, grid);
            return;
        }

        let contacts = Contacts {
            points: &self.points,
            lines,
            tuning: &self.tuning.contact,
        };
        let man = ManPhysics::new(self.tuning.man);
        let missile = MissilePhysics::new(self.tuning.missile);
        let physics: &dyn FormPhysics = match self.form {
            Form::Man => &man,
            Form::Missile => &missile,
        };
        self.rigid.update(dt, physics, &controls, &contacts);
    }

    /// Where to draw the player, `alpha` of the way from the last step to this one
    pub fn transform(&self, alpha: f32) -> RenderTransform {
        RenderTransform::interpolate(
            self.previous,
            (self.position(), self.orientation()),
            self.scale(),
            alpha,
        )
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("form", &self.form)
            .field("position", &self.position())
            .field("ghost", &self.is_ghost())
            .finish()
    }
}
