//! Morph state machine
//!
//! Man -> ToMissile -> Missile -> ToMan -> Man. The physics form switches on
//! the first tick of a transition (that is when the entry event fires); the
//! transition ticks only drive the visual scale.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::MORPH_TICKS;

/// Physical form of the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Form {
    Man,
    Missile,
}

/// Where the morph currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MorphPhase {
    Man,
    /// Growing into the missile; `tick` counts up to the transition length
    ToMissile { tick: u32 },
    Missile,
    ToMan { tick: u32 },
}

/// Render scale of the man
pub const MAN_SCALE: Vec3 = Vec3::ONE;
/// Render scale of the missile (slim, slightly longer)
pub const MISSILE_SCALE: Vec3 = Vec3::new(0.5, 1.2, 0.5);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Morph {
    phase: MorphPhase,
    requested: bool,
    duration: u32,
}

impl Default for Morph {
    fn default() -> Self {
        Self::new(MORPH_TICKS)
    }
}

impl Morph {
    pub fn new(duration: u32) -> Self {
        Self {
            phase: MorphPhase::Man,
            requested: false,
            duration,
        }
    }

    pub fn phase(&self) -> MorphPhase {
        self.phase
    }

    /// Ask for a form change; ignored while a transition is running
    pub fn go(&mut self) {
        if matches!(self.phase, MorphPhase::Man | MorphPhase::Missile) {
            self.requested = true;
        }
    }

    /// Advance one tick. Returns the form entered on this tick, if any.
    pub fn update(&mut self) -> Option<Form> {
        match self.phase {
            MorphPhase::Man if self.requested => {
                self.requested = false;
                self.phase = MorphPhase::ToMissile { tick: 0 };
                Some(Form::Missile)
            }
            MorphPhase::Missile if self.requested => {
                self.requested = false;
                self.phase = MorphPhase::ToMan { tick: 0 };
                Some(Form::Man)
            }
            MorphPhase::ToMissile { tick } => {
                self.phase = if tick + 1 >= self.duration {
                    MorphPhase::Missile
                } else {
                    MorphPhase::ToMissile { tick: tick + 1 }
                };
                None
            }
            MorphPhase::ToMan { tick } => {
                self.phase = if tick + 1 >= self.duration {
                    MorphPhase::Man
                } else {
                    MorphPhase::ToMan { tick: tick + 1 }
                };
                None
            }
            MorphPhase::Man | MorphPhase::Missile => None,
        }
    }

    /// Physics form currently in charge
    pub fn form(&self) -> Form {
        match self.phase {
            MorphPhase::Man | MorphPhase::ToMan { .. } => Form::Man,
            MorphPhase::Missile | MorphPhase::ToMissile { .. } => Form::Missile,
        }
    }

    pub fn is_man(&self) -> bool {
        self.form() == Form::Man
    }

    /// Visual scale, eased between the two forms during a transition
    pub fn scale(&self) -> Vec3 {
        let progress = |tick: u32| {
            if self.duration == 0 {
                1.0
            } else {
                (tick + 1) as f32 / self.duration as f32
            }
        };
        match self.phase {
            MorphPhase::Man => MAN_SCALE,
            MorphPhase::Missile => MISSILE_SCALE,
            MorphPhase::ToMissile { tick } => MAN_SCALE.lerp(MISSILE_SCALE, progress(tick)),
            MorphPhase::ToMan { tick } => MISSILE_SCALE.lerp(MAN_SCALE, progress(tick)),
        }
    }

    /// Back to the man with nothing pending
    pub fn reset(&mut self) {
        self.phase = MorphPhase::Man;
        self.requested = false;
    }
}
