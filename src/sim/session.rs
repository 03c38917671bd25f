//! One attempt at a level
//!
//! A session owns the level, its players and the fixed-step loop. Each tick
//! moves every player in list order, then checks the live players for a win
//! (touching a target cell) or a loss (leaving the grid). The first outcome
//! stops the session.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::Level;
use super::player::Player;
use crate::clock::FixedStepLoop;
use crate::consts::STEP;
use crate::input::{InputSource, Replay};
use crate::transform::RenderTransform;
use crate::tuning::Tuning;

/// Outcome of an attempt, with the controls that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    Win { player: u32, tick: u64, replay: Replay },
    Lose { player: u32, tick: u64, replay: Replay },
}

impl SessionEvent {
    pub fn replay(&self) -> &Replay {
        match self {
            SessionEvent::Win { replay, .. } | SessionEvent::Lose { replay, .. } => replay,
        }
    }
}

pub struct Session {
    level: Level,
    players: Vec<Player>,
    clock: FixedStepLoop,
    events: Vec<SessionEvent>,
    running: bool,
}

impl Session {
    /// One player per input source, all spawned at the level start
    pub fn new(level: Level, inputs: Vec<Box<dyn InputSource>>, tuning: Tuning) -> Self {
        let players: Vec<Player> = inputs
            .into_iter()
            .enumerate()
            .map(|(id, input)| Player::new(id as u32, level.start, input, tuning))
            .collect();
        log::info!(
            "Session started: {}x{} grid, {} line(s), {} player(s)",
            level.grid.width(),
            level.grid.height(),
            level.lines.len(),
            players.len()
        );
        if tuning.max_tile_travel(STEP) >= 1.0 {
            log::warn!(
                "Tile body can move {:.2} tiles per step and may skip through walls",
                tuning.max_tile_travel(STEP)
            );
        }
        Self {
            level,
            players,
            clock: FixedStepLoop::default(),
            events: Vec::new(),
            running: true,
        }
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Steps run since the session started or was cleared
    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    /// Feed one frame of wall-clock time. Returns the leftover time for
    /// [`Session::transforms`].
    pub fn frame(&mut self, real_dt: f64) -> f32 {
        if !self.running {
            return self.clock.remainder();
        }
        let Self {
            level,
            players,
            clock,
            events,
            running,
        } = self;
        clock.advance(real_dt, |tick, dt| {
            *running = step_world(level, players, events, tick, dt);
            *running
        })
    }

    /// Run exactly one fixed step
    pub fn step(&mut self) {
        let step = self.clock.step() as f64;
        self.frame(step);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Stop, rewind the clock and put every player back at the start
    pub fn clear(&mut self) {
        self.running = false;
        self.clock.reset();
        self.events.clear();
        for player in &mut self.players {
            player.restart();
        }
        log::info!("Session cleared");
    }

    /// Resume stepping after [`Session::clear`]
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Render transforms for every player, `remainder` seconds past the last step
    pub fn transforms(&self, remainder: f32) -> Vec<RenderTransform> {
        let alpha = remainder / self.clock.step();
        self.players.iter().map(|p| p.transform(alpha)).collect()
    }
}

/// Advance every player one tick and look for an outcome. Returns whether the
/// session keeps running.
fn step_world(
    level: &Level,
    players: &mut [Player],
    events: &mut Vec<SessionEvent>,
    tick: u64,
    dt: f32,
) -> bool {
    for player in players.iter_mut() {
        player.update(tick, dt, &level.grid, &level.lines);
    }

    for player in players.iter().filter(|p| !p.is_ghost()) {
        let replay = || player.replay().cloned().unwrap_or_default();
        let center: Vec2 = player.position().truncate();
        let event = if level.targets().iter().any(|t| player.check_collides(t)) {
            log::info!("Player {} reached a target on tick {}", player.id(), tick);
            SessionEvent::Win {
                player: player.id(),
                tick,
                replay: replay(),
            }
        } else if !level.contains(center) {
            log::info!(
                "Player {} left the level at ({:.2}, {:.2}) on tick {}",
                player.id(),
                center.x,
                center.y,
                tick
            );
            SessionEvent::Lose {
                player: player.id(),
                tick,
                replay: replay(),
            }
        } else {
            continue;
        };
        events.push(event);
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Controls, DemoInput, LiveInput, ReplayInput};
    use glam::Vec3;

    const FRAME: f64 = 1.0 / 60.0;

    fn corridor() -> Level {
        Level::from_rows(&[
            "##########",
            "#........#",
            "#.S....T.#",
            "##########",
        ])
        .unwrap()
    }

    fn live_right() -> Box<dyn InputSource> {
        let input = LiveInput::new();
        input.handle().set(Controls {
            right: true,
            ..Default::default()
        });
        Box::new(input)
    }

    fn run_until_event(session: &mut Session, max_frames: usize) -> Option<SessionEvent> {
        for _ in 0..max_frames {
            session.frame(FRAME);
            if let Some(event) = session.drain_events().pop() {
                return Some(event);
            }
        }
        None
    }

    #[test]
    fn test_walking_into_target_wins() {
        let mut session = Session::new(corridor(), vec![live_right()], Tuning::default());
        let event = run_until_event(&mut session, 600).expect("no outcome");
        match &event {
            SessionEvent::Win { player, tick, replay } => {
                assert_eq!(*player, 0);
                assert_eq!(replay.len() as u64, tick + 1);
                assert!(replay.at(0).right);
            }
            other => panic!("expected a win, got {:?}", other),
        }
        assert!(!session.is_running());
    }

    #[test]
    fn test_falling_out_loses() {
        let level = Level::from_rows(&[
            "S....",
            ".....",
            ".....",
        ])
        .unwrap();
        let idle: Box<dyn InputSource> = Box::new(LiveInput::new());
        let mut session = Session::new(level, vec![idle], Tuning::default());
        let event = run_until_event(&mut session, 600).expect("no outcome");
        assert!(matches!(event, SessionEvent::Lose { player: 0, .. }));
    }

    #[test]
    fn test_stopped_session_does_not_step() {
        let mut session = Session::new(corridor(), vec![live_right()], Tuning::default());
        run_until_event(&mut session, 600).expect("no outcome");
        let ticks = session.ticks();
        let position = session.players()[0].position();
        for _ in 0..30 {
            session.frame(FRAME);
        }
        assert_eq!(session.ticks(), ticks);
        assert_eq!(session.players()[0].position(), position);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_ticks_stop_at_the_outcome() {
        let level = Level::from_rows(&[
            "#####",
            "#STT#",
            "#####",
        ])
        .unwrap();
        let mut session = Session::new(level, vec![live_right()], Tuning::default());
        // Half a second of frame time in one go; the target is one step away
        session.frame(0.5);
        let events = session.drain_events();
        assert_eq!(events.len(), 1);
        let tick = match &events[0] {
            SessionEvent::Win { tick, .. } => *tick,
            other => panic!("expected a win, got {:?}", other),
        };
        assert_eq!(session.ticks(), tick + 1);
        assert_eq!(session.players()[0].replay().map(Replay::len), Some(tick as usize + 1));
        assert!(tick < 5);
        assert!(!session.is_running());
    }

    #[test]
    fn test_replay_reproduces_attempt() {
        let mut session = Session::new(corridor(), vec![live_right()], Tuning::default());
        let event = run_until_event(&mut session, 600).expect("no outcome");
        let finish = session.players()[0].position();

        let json = event.replay().to_json().unwrap();
        let replay = Replay::from_json(&json).unwrap();
        let steps = replay.len();
        let ghost: Box<dyn InputSource> = Box::new(ReplayInput::new(replay));
        let mut rerun = Session::new(corridor(), vec![ghost], Tuning::default());
        for _ in 0..steps {
            rerun.step();
        }
        assert_eq!(rerun.ticks(), steps as u64);
        assert_eq!(rerun.players()[0].position(), finish);
    }

    #[test]
    fn test_ghosts_never_win_or_lose() {
        let mut replay = Replay::new();
        for _ in 0..300 {
            replay.record(Controls {
                right: true,
                ..Default::default()
            });
        }
        let ghost: Box<dyn InputSource> = Box::new(ReplayInput::new(replay));
        let mut session = Session::new(corridor(), vec![ghost], Tuning::default());
        assert!(run_until_event(&mut session, 400).is_none());
        assert!(session.is_running());
        assert!(session.players()[0].replay().is_none());
    }

    #[test]
    fn test_sessions_are_deterministic() {
        let level = Level::from_rows(&[
            "####################",
            "#..................#",
            "#..................#",
            "#......####........#",
            "#..S...............#",
            "####################",
        ])
        .unwrap();
        let inputs = || -> Vec<Box<dyn InputSource>> {
            vec![
                Box::new(DemoInput::new(7)) as Box<dyn InputSource>,
                Box::new(DemoInput::new(8)),
            ]
        };
        let mut a = Session::new(level.clone(), inputs(), Tuning::default());
        let mut b = Session::new(level, inputs(), Tuning::default());
        for _ in 0..600 {
            let ra = a.frame(FRAME);
            let rb = b.frame(FRAME);
            assert_eq!(ra.to_bits(), rb.to_bits());
            assert_eq!(a.transforms(ra), b.transforms(rb));
        }
        assert_eq!(a.ticks(), b.ticks());
        assert_eq!(a.drain_events(), b.drain_events());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut session = Session::new(corridor(), vec![live_right()], Tuning::default());
        for _ in 0..20 {
            session.frame(FRAME);
        }
        session.frame(FRAME * 0.5);
        session.clear();
        assert!(!session.is_running());
        assert_eq!(session.ticks(), 0);
        assert_eq!(session.transforms(0.0)[0].translation(), Vec3::new(2.5, 1.5, 0.0));
        assert_eq!(session.players()[0].replay().map(Replay::len), Some(0));
        assert!(session.drain_events().is_empty());

        session.start();
        session.step();
        assert_eq!(session.ticks(), 1);
    }

    #[test]
    fn test_frame_runs_whole_steps() {
        let mut session = Session::new(corridor(), vec![live_right()], Tuning::default());
        let remainder = session.frame(0.05);
        // 0.05 s is three steps of 1/60 with a sliver left over
        assert!(session.ticks() == 2 || session.ticks() == 3);
        assert!(remainder >= 0.0 && remainder < session.clock.step());
        assert_eq!(session.transforms(remainder).len(), 1);
    }
}
