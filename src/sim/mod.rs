//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Input arrives as one `Controls` snapshot per tick
//! - Stable iteration order (players in list order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod forms;
pub mod level;
pub mod line;
pub mod math;
pub mod morph;
pub mod player;
pub mod rigid_body;
pub mod session;
pub mod tile_body;
pub mod tiles;

pub use collision::{CollisionPoint, CollisionResult, circle_box, overlap, rects_overlap, vs_line};
pub use forms::{FormPhysics, ManPhysics, MissilePhysics};
pub use level::Level;
pub use line::Line;
pub use morph::{Form, Morph, MorphPhase};
pub use player::Player;
pub use rigid_body::{Contacts, Derivative, Forces, RigidBody, RigidBodyState};
pub use session::{Session, SessionEvent};
pub use tile_body::{Resolved, TileBody};
pub use tiles::{CellRect, Tile, TileGrid};
