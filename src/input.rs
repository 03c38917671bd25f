//! Input snapshots and sources
//!
//! The simulation only ever sees a [`Controls`] value per tick. Where it came
//! from (keyboard, recorded replay, attract-mode driver) is hidden behind
//! [`InputSource`].

use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Control flags for a single tick (deterministic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Held morph key; the form toggles on the press edge
    pub morph: bool,
}

impl Controls {
    pub const IDLE: Controls = Controls {
        left: false,
        right: false,
        jump: false,
        morph: false,
    };
}

/// A recorded attempt: one [`Controls`] per tick, starting at tick 0
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Replay {
    pub ticks: Vec<Controls>,
}

impl Replay {
    pub fn new() -> Self {
        Self { ticks: Vec::new() }
    }

    /// Append the controls used on the next tick
    pub fn record(&mut self, controls: Controls) {
        self.ticks.push(controls);
    }

    /// Controls for `tick`, idle once the recording runs out
    pub fn at(&self, tick: u64) -> Controls {
        usize::try_from(tick)
            .ok()
            .and_then(|i| self.ticks.get(i))
            .copied()
            .unwrap_or(Controls::IDLE)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn clear(&mut self) {
        self.ticks.clear();
    }

    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Something that supplies controls once per tick
pub trait InputSource {
    /// Controls for the given tick. Called exactly once per tick, in order.
    fn controls(&mut self, tick: u64) -> Controls;

    /// Replayed input drives a ghost: it is never recorded and never wins or loses
    fn is_replay(&self) -> bool {
        false
    }
}

/// Host-driven input. The host keeps a [`LiveHandle`] and writes the current
/// key state into it between frames.
#[derive(Debug, Clone, Default)]
pub struct LiveInput {
    state: Rc<Cell<Controls>>,
}

/// Writer side of a [`LiveInput`]
#[derive(Debug, Clone)]
pub struct LiveHandle {
    state: Rc<Cell<Controls>>,
}

impl LiveHandle {
    pub fn set(&self, controls: Controls) {
        self.state.set(controls);
    }
}

impl LiveInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> LiveHandle {
        LiveHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl InputSource for LiveInput {
    fn controls(&mut self, _tick: u64) -> Controls {
        self.state.get()
    }
}

/// Plays back a recorded attempt
#[derive(Debug, Clone)]
pub struct ReplayInput {
    replay: Replay,
}

impl ReplayInput {
    pub fn new(replay: Replay) -> Self {
        Self { replay }
    }

    pub fn replay(&self) -> &Replay {
        &self.replay
    }
}

impl InputSource for ReplayInput {
    fn controls(&mut self, tick: u64) -> Controls {
        self.replay.at(tick)
    }

    fn is_replay(&self) -> bool {
        true
    }
}

/// Attract-mode driver: holds a random combination of keys for a random
/// number of ticks. Seeded, so two drivers with the same seed agree.
#[derive(Debug, Clone)]
pub struct DemoInput {
    rng: Pcg32,
    current: Controls,
    hold_ticks: u32,
}

impl DemoInput {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            current: Controls::IDLE,
            hold_ticks: 0,
        }
    }
}

impl InputSource for DemoInput {
    fn controls(&mut self, _tick: u64) -> Controls {
        if self.hold_ticks == 0 {
            let dir = self.rng.random_range(0..3u8);
            self.current = Controls {
                left: dir == 1,
                right: dir == 2,
                jump: self.rng.random_bool(0.3),
                morph: self.rng.random_bool(0.1),
            };
            self.hold_ticks = self.rng.random_range(5..40);
        } else if self.current.morph {
            // tap, don't hold
            self.current.morph = false;
        }
        self.hold_ticks -= 1;
        self.current
    }
}
