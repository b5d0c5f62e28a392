//! Sunlane headless driver
//!
//! Runs the simulation with a fixed-step accumulator and a simple autopilot,
//! logs run events and prints a JSON summary of every run.
//!
//! Usage: `sunlane [--seed N] [--seconds S] [--tuning path.json]`

use std::error::Error;

use serde::Serialize;

use sunlane::Settings;
use sunlane::Tuning;
use sunlane::consts::{MAX_SUBSTEPS, SIM_DT};
use sunlane::renderer::build_frame;
use sunlane::sim::{EndReason, GameState, Lane, RunEvent, TickInput, tick};

/// Command-line options
#[derive(Debug)]
struct Options {
    seed: u64,
    seconds: f32,
    tuning: Option<String>,
}

impl Options {
    fn parse() -> Result<Self, Box<dyn Error>> {
        let mut options = Options {
            seed: 0x5EED,
            seconds: 120.0,
            tuning: None,
        };
        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("missing value for {arg}"));
            match arg.as_str() {
                "--seed" => options.seed = value()?.parse()?,
                "--seconds" => options.seconds = value()?.parse()?,
                "--tuning" => options.tuning = Some(value()?),
                other => return Err(format!("unknown argument: {other}").into()),
            }
        }
        Ok(options)
    }
}

/// Outcome of one run
#[derive(Debug, Serialize)]
struct RunSummary {
    run: u32,
    reason: EndReason,
    score: u64,
    distance: f32,
    region: u32,
    pickups: u32,
    boosts: u32,
    seconds: f32,
}

/// Pick a lane shift that maximizes clearance ahead
fn autopilot(state: &GameState) -> Option<i8> {
    let tuning = &state.tuning;
    let ship_z = state.run.distance + tuning.player_collision_depth;
    let clearance = |lane: Lane| {
        state
            .entities
            .obstacles
            .iter()
            .filter(|o| o.lane == lane)
            .map(|o| o.z - ship_z)
            .filter(|gap| *gap > -tuning.collision_window)
            .fold(f32::INFINITY, f32::min)
    };
    let reward = |lane: Lane| {
        state
            .entities
            .pickups
            .iter()
            .filter(|p| p.lane == lane && p.z - ship_z > 0.0 && p.z - ship_z < 400.0)
            .count()
    };

    let lane = state.run.lane;
    let here = clearance(lane);
    let best = [-1i8, 1]
        .into_iter()
        .filter_map(|direction| lane.shifted(direction).map(|l| (direction, l)))
        .max_by(|a, b| clearance(a.1).total_cmp(&clearance(b.1)))?;

    let danger = here < tuning.collision_window * 3.0 + state.run.speed * 0.25;
    if danger && clearance(best.1) > here {
        return Some(best.0);
    }
    // Drift toward pickups when the neighbour is just as clear
    if !danger && reward(best.1) > reward(lane) && clearance(best.1) >= here {
        return Some(best.0);
    }
    None
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Options::parse()?;
    let tuning = match &options.tuning {
        Some(path) => Tuning::load_or_default(path),
        None => Tuning::default(),
    };
    let settings = Settings::default();

    log::info!("Sunlane starting (seed {}, {}s)", options.seed, options.seconds);

    let mut state = GameState::with_tuning(options.seed, tuning)?;
    let mut input = TickInput {
        begin_run: true,
        resize: Some((1280.0, 720.0)),
        ..Default::default()
    };

    let mut summaries = Vec::new();
    let mut accumulator = 0.0f32;
    let mut elapsed = 0.0f32;
    let mut frames = 0u64;
    let mut instances = 0usize;

    while elapsed < options.seconds {
        // Simulated frame pacing with a periodic hitch
        let frame_dt: f32 = if frames % 600 == 599 { 0.4 } else { 1.0 / 60.0 };
        let dt = frame_dt.min(0.1);
        accumulator += dt;
        elapsed += frame_dt;
        frames += 1;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if input.shift_lane.is_none() {
                input.shift_lane = autopilot(&state);
            }
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input = TickInput::default();
        }

        for event in state.drain_events() {
            match event {
                RunEvent::RunEnded { reason, final_score } => {
                    summaries.push(RunSummary {
                        run: state.run_index,
                        reason,
                        score: final_score,
                        distance: state.run.distance,
                        region: state.run.region,
                        pickups: state.run.pickups,
                        boosts: state.run.boosts,
                        seconds: state.run.elapsed,
                    });
                    input.begin_run = true;
                }
                other => log::debug!("{:?}", other),
            }
        }

        instances += build_frame(&state, &settings).instances.len();
    }

    log::info!(
        "Simulated {} frames, {} runs, {:.1} sprites/frame",
        frames,
        summaries.len(),
        instances as f64 / frames.max(1) as f64
    );
    println!("{}", serde_json::to_string_pretty(&summaries)?);
    Ok(())
}
