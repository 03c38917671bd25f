//! Missileman headless runner
//!
//! Plays a built-in level with either the seeded demo driver or a recorded
//! replay, logs the outcome and prints the replay JSON.
//!
//! Usage: `missileman [--tuning FILE] [--man-model tile|rigid] [--replay FILE] [--seed N] [--seconds N]`

#[cfg(not(target_arch = "wasm32"))]
mod runner {
    use missileman::input::{DemoInput, ReplayInput};
    use missileman::sim::{Level, Session, SessionEvent};
    use missileman::tuning::ManModel;
    use missileman::{InputSource, Replay, SimError, Tuning};

    /// Built-in level: `S` start, `T` target, `#` solid
    const DEMO_LEVEL: &[&str] = &[
        "################################",
        "#..............................#",
        "#..............................#",
        "#.......................T......#",
        "#...................#######....#",
        "#..............................#",
        "#.........#####................#",
        "#..............................#",
        "#..S...........................#",
        "#######......###################",
    ];

    /// Frames per simulated second of wall-clock time
    const FRAME_RATE: f64 = 60.0;

    #[derive(Debug)]
    struct Options {
        tuning: Option<String>,
        man_model: Option<ManModel>,
        replay: Option<String>,
        seed: u64,
        seconds: f64,
    }

    fn parse_args() -> Result<Options, String> {
        let mut options = Options {
            tuning: None,
            man_model: None,
            replay: None,
            seed: 1,
            seconds: 30.0,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{} needs a value", arg));
            match arg.as_str() {
                "--tuning" => options.tuning = Some(value()?),
                "--man-model" => {
                    let v = value()?;
                    let model = ManModel::from_str(&v).ok_or_else(|| format!("bad man model: {}", v))?;
                    options.man_model = Some(model);
                }
                "--replay" => options.replay = Some(value()?),
                "--seed" => {
                    let v = value()?;
                    options.seed = v.parse().map_err(|_| format!("bad seed: {}", v))?;
                }
                "--seconds" => {
                    let v = value()?;
                    options.seconds = v.parse().map_err(|_| format!("bad duration: {}", v))?;
                }
                other => return Err(format!("unknown argument: {}", other)),
            }
        }
        Ok(options)
    }

    fn play(options: &Options) -> Result<Option<SessionEvent>, SimError> {
        let mut tuning = match &options.tuning {
            Some(path) => Tuning::load(path)?,
            None => Tuning::default(),
        };
        if let Some(model) = options.man_model {
            tuning.man_model = model;
        }
        log::info!("Man model: {}", tuning.man_model.as_str());

        let input: Box<dyn InputSource> = match &options.replay {
            Some(path) => {
                let replay = Replay::load(path)?;
                log::info!("Replaying {} tick(s) from {}", replay.len(), path);
                Box::new(ReplayInput::new(replay))
            }
            None => {
                log::info!("Demo input with seed {}", options.seed);
                Box::new(DemoInput::new(options.seed))
            }
        };

        let mut session = Session::new(Level::from_rows(DEMO_LEVEL)?, vec![input], tuning);
        let frames = (options.seconds * FRAME_RATE).max(0.0) as u64;
        for _ in 0..frames {
            session.frame(1.0 / FRAME_RATE);
            if let Some(event) = session.drain_events().pop() {
                return Ok(Some(event));
            }
            if !session.is_running() {
                break;
            }
        }

        if let Some(player) = session.players().first() {
            log::info!(
                "No outcome after {} tick(s); player at {:?}, heading {:.2}",
                session.ticks(),
                player.position(),
                player.heading()
            );
        }
        Ok(None)
    }

    pub fn run() -> Result<(), String> {
        let options = parse_args()?;
        match play(&options).map_err(|e| e.to_string())? {
            Some(event) => {
                match &event {
                    SessionEvent::Win { tick, .. } => log::info!("Won on tick {}", tick),
                    SessionEvent::Lose { tick, .. } => log::info!("Lost on tick {}", tick),
                }
                let json = event.replay().to_json().map_err(|e| e.to_string())?;
                println!("{}", json);
            }
            None => log::info!("Nothing to record"),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Missileman (headless) starting...");
    if let Err(e) = runner::run() {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on wasm; the host drives `Session` directly
}
