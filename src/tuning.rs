//! Physics tuning
//!
//! Every constant the force models and kinematics read lives here so a level
//! pack (or a tester) can override them from JSON. Missing fields fall back to
//! the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Which motion model drives the man form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ManModel {
    /// Tile-snapped platformer kinematics against the tile grid
    #[default]
    Tile,
    /// Rigid body with run/jump/gravity forces against the line geometry
    Rigid,
}

impl ManModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManModel::Tile => "Tile",
            ManModel::Rigid => "Rigid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tile" => Some(ManModel::Tile),
            "rigid" => Some(ManModel::Rigid),
            _ => None,
        }
    }
}

/// Tile-kinematics constants (units: tiles, seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileTuning {
    /// Horizontal acceleration while a direction is held
    pub accel: f32,
    /// Horizontal deceleration once the direction is released
    pub friction: f32,
    /// Downward acceleration
    pub gravity: f32,
    pub maxdx: f32,
    /// Keep `maxdy * step < 1` or landings can tunnel through a tile
    pub maxdy: f32,
    /// One-step upward acceleration applied when a jump starts
    pub impulse: f32,
}

impl Default for TileTuning {
    fn default() -> Self {
        Self {
            accel: 50.0,
            friction: 60.0,
            gravity: 100.0,
            maxdx: 10.0,
            maxdy: 25.0,
            impulse: 1500.0,
        }
    }
}

/// Man form simulated as a rigid body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManTuning {
    pub run_force: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub max_xspeed: f32,
    pub max_yspeed: f32,
    /// Velocity multiplier per step with no direction held
    pub idle_damping: f32,
    /// Velocity multiplier per step when pushing against current motion
    pub reverse_damping: f32,
}

impl Default for ManTuning {
    fn default() -> Self {
        Self {
            run_force: 50.0,
            jump_force: 1500.0,
            gravity: 100.0,
            max_xspeed: 10.0,
            max_yspeed: 10.0,
            idle_damping: 0.8,
            reverse_damping: 0.75,
        }
    }
}

/// Missile form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissileTuning {
    /// Thrust along the body's +y axis
    pub thrust: f32,
    /// Steering torque about +z (radians)
    pub torque: f32,
    pub max_speed: f32,
    pub max_angular_momentum: f32,
}

impl Default for MissileTuning {
    fn default() -> Self {
        Self {
            thrust: 50.0,
            torque: 5.0_f32.to_radians(),
            max_speed: 10.0,
            max_angular_momentum: 1.0,
        }
    }
}

/// Penalty contact against line geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactTuning {
    /// Spring constant per unit of penetration
    pub stiffness: f32,
    /// Damping against the approach velocity
    pub damping: f32,
}

impl Default for ContactTuning {
    fn default() -> Self {
        Self {
            stiffness: 3000.0,
            damping: 60.0,
        }
    }
}

/// Complete physics tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Tuning {
    pub man_model: ManModel,
    pub tile: TileTuning,
    pub man: ManTuning,
    pub missile: MissileTuning,
    pub contact: ContactTuning,
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Largest per-step travel of the tile body, in tiles
    pub fn max_tile_travel(&self, step: f32) -> f32 {
        self.tile.maxdy.max(self.tile.maxdx) * step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STEP;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "tile": { "gravity": 42.0 }, "man_model": "Rigid" }"#)
            .unwrap();
        assert_eq!(tuning.tile.gravity, 42.0);
        assert_eq!(tuning.tile.maxdx, TileTuning::default().maxdx);
        assert_eq!(tuning.man_model, ManModel::Rigid);
        assert_eq!(tuning.missile, MissileTuning::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut tuning = Tuning::default();
        tuning.contact.stiffness = 123.0;
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(
            Tuning::from_json("{ tile: 3 }"),
            Err(SimError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            Tuning::load("/definitely/not/here.json"),
            Err(SimError::Io(_))
        ));
    }

    #[test]
    fn test_defaults_cannot_tunnel() {
        assert!(Tuning::default().max_tile_travel(STEP) < 1.0);
    }

    #[test]
    fn test_man_model_from_str() {
        assert_eq!(ManModel::from_str("TILE"), Some(ManModel::Tile));
        assert_eq!(ManModel::from_str("rigid"), Some(ManModel::Rigid));
        assert_eq!(ManModel::from_str("jetpack"), None);
        assert_eq!(ManModel::Rigid.as_str(), "Rigid");
    }
}
