//! Run state and the run state machine
//!
//! `GameState` owns everything a run mutates. Commands (begin/pause/resume,
//! lane shifts, resize) are methods here; the per-frame integration lives in
//! `tick`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entities::EntityRegistry;
use super::events::{EndReason, RunEvent};
use super::feedback::FeedbackEmitter;
use super::spawn::SpawnScheduler;
use crate::consts::{LANE_COUNT, MAX_LANE, MIN_LANE};
use crate::renderer::Layout;
use crate::tuning::{Tuning, TuningError};

/// Default viewport used until the host reports a real size
pub const DEFAULT_VIEWPORT: (f32, f32) = (1280.0, 720.0);

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Title screen, nothing simulated yet
    Start,
    /// Active gameplay
    Playing,
    /// Suspended, no mutation
    Paused,
    /// Run ended; only `begin_run` leaves this phase
    GameOver,
}

/// One of the three track lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub struct Lane(i8);

impl Lane {
    pub const LEFT: Lane = Lane(-1);
    pub const CENTER: Lane = Lane(0);
    pub const RIGHT: Lane = Lane(1);
    pub const ALL: [Lane; LANE_COUNT] = [Lane::LEFT, Lane::CENTER, Lane::RIGHT];

    /// Lane for an index in [-1, 1]
    pub fn new(index: i8) -> Option<Self> {
        (MIN_LANE..=MAX_LANE).contains(&index).then_some(Lane(index))
    }

    #[inline]
    pub fn index(self) -> i8 {
        self.0
    }

    /// Horizontal offset in lane units
    #[inline]
    pub fn offset(self) -> f32 {
        self.0 as f32
    }

    /// Neighbouring lane in `direction`, if it exists
    pub fn shifted(self, direction: i8) -> Option<Self> {
        self.0.checked_add(direction).and_then(Lane::new)
    }
}

impl TryFrom<i8> for Lane {
    type Error = String;

    fn try_from(index: i8) -> Result<Self, Self::Error> {
        Lane::new(index).ok_or_else(|| format!("lane {index} outside [{MIN_LANE}, {MAX_LANE}]"))
    }
}

impl From<Lane> for i8 {
    fn from(lane: Lane) -> i8 {
        lane.0
    }
}

/// Mutable per-run progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Distance travelled along the track
    pub distance: f32,
    /// Base speed before the boost multiplier
    pub base_speed: f32,
    /// Effective speed used for the last integration step
    pub speed: f32,
    /// Seconds of boost remaining
    pub boost_timer: f32,
    pub score: u64,
    /// Energy fragments collected
    pub pickups: u32,
    /// Boost pickups collected
    pub boosts: u32,
    /// 1-based region index derived from distance
    pub region: u32,
    pub energy: f32,
    /// Discrete lane used for collisions
    pub lane: Lane,
    /// Smoothed lane offset, render only
    pub visual_lane: f32,
    /// Seconds spent in Playing
    pub elapsed: f32,
}

impl RunState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            distance: 0.0,
            base_speed: tuning.start_speed,
            speed: tuning.start_speed,
            boost_timer: 0.0,
            score: 0,
            pickups: 0,
            boosts: 0,
            region: 1,
            energy: tuning.energy_max,
            lane: Lane::CENTER,
            visual_lane: 0.0,
            elapsed: 0.0,
        }
    }

    #[inline]
    pub fn is_boosting(&self) -> bool {
        self.boost_timer > 0.0
    }

    /// Advance speed, distance, energy and derived values by `dt`
    pub fn integrate(&mut self, tuning: &Tuning, dt: f32) {
        self.elapsed += dt;
        self.base_speed = (self.base_speed + tuning.acceleration * dt).min(tuning.max_speed);

        let boosting = self.is_boosting();
        self.speed = if boosting {
            self.base_speed * tuning.boost_multiplier
        } else {
            self.base_speed
        };
        self.boost_timer = (self.boost_timer - dt).max(0.0);

        self.distance += self.speed * dt;

        let mut drain = tuning.base_drain + self.speed * tuning.drain_per_speed;
        if boosting {
            drain *= tuning.boost_drain_factor;
        }
        self.energy = (self.energy - drain * dt).clamp(0.0, tuning.energy_max);

        let target = self.lane.offset();
        self.visual_lane += (target - self.visual_lane) * crate::smoothing_factor(tuning.lane_smoothing, dt);

        self.region = (self.distance / tuning.region_span).floor() as u32 + 1;
        self.refresh_score(tuning);
    }

    /// Add energy, clamped to the maximum
    pub fn gain_energy(&mut self, amount: f32, tuning: &Tuning) {
        self.energy = (self.energy + amount).clamp(0.0, tuning.energy_max);
    }

    /// Recompute score; never lowers it
    pub fn refresh_score(&mut self, tuning: &Tuning) {
        let derived = (self.distance * tuning.score_per_distance).floor().max(0.0) as u64
            + self.pickups as u64 * tuning.score_per_pickup
            + self.boosts as u64 * tuning.score_per_boost;
        self.score = self.score.max(derived);
    }
}

/// Values the HUD shows each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub phase: RunPhase,
    pub score: u64,
    pub pickups: u32,
    pub boosts: u32,
    pub speed: u32,
    pub region: u32,
    pub energy_percent: u8,
    pub boosting: bool,
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    /// Session seed; each run reseeds from `seed + run_index`
    pub seed: u64,
    /// Number of runs begun this session
    pub run_index: u32,
    pub(crate) rng: Pcg32,
    pub phase: RunPhase,
    pub run: RunState,
    pub entities: EntityRegistry,
    pub spawner: SpawnScheduler,
    pub feedback: FeedbackEmitter,
    pub layout: Layout,
    events: Vec<RunEvent>,
}

impl GameState {
    /// Create an idle session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::from_tuning(seed, Tuning::default())
    }

    /// Create an idle session with custom tuning
    ///
    /// Rejects tunings that fail `Tuning::validate`, since spawning and
    /// collision rely on its ranges.
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self::from_tuning(seed, tuning))
    }

    fn from_tuning(seed: u64, tuning: Tuning) -> Self {
        let layout = Layout::new(DEFAULT_VIEWPORT.0, DEFAULT_VIEWPORT.1, &tuning);
        Self {
            seed,
            run_index: 0,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Start,
            run: RunState::new(&tuning),
            entities: EntityRegistry::new(),
            spawner: SpawnScheduler::new(&tuning),
            feedback: FeedbackEmitter::new(),
            layout,
            events: Vec::new(),
            tuning,
        }
    }

    /// Start a fresh run from any phase
    ///
    /// Replaces every collection and timer so nothing from a previous run
    /// survives into the new one.
    pub fn begin_run(&mut self) {
        self.run_index += 1;
        self.rng = Pcg32::seed_from_u64(self.seed.wrapping_add(self.run_index as u64));
        self.run = RunState::new(&self.tuning);
        self.entities = EntityRegistry::new();
        self.spawner = SpawnScheduler::new(&self.tuning);
        self.feedback = FeedbackEmitter::new();
        self.phase = RunPhase::Playing;

        self.spawner
            .fill(&mut self.entities, &self.run, &self.tuning, &mut self.rng);

        log::info!(
            "Run {} started (seed {}, {} obstacles queued)",
            self.run_index,
            self.seed,
            self.entities.obstacles.len()
        );
    }

    pub fn pause(&mut self) {
        if self.phase == RunPhase::Playing {
            self.phase = RunPhase::Paused;
            log::debug!("Paused at distance {:.0}", self.run.distance);
        }
    }

    pub fn resume(&mut self) {
        if self.phase == RunPhase::Paused {
            self.phase = RunPhase::Playing;
            log::debug!("Resumed");
        }
    }

    /// Move one lane left (-1) or right (+1)
    ///
    /// Returns false without side effects when not playing, when the target
    /// lane is off the track or equals the current lane.
    pub fn shift_lane(&mut self, direction: i8) -> bool {
        if self.phase != RunPhase::Playing {
            return false;
        }
        match self.run.lane.shifted(direction) {
            Some(lane) if lane != self.run.lane => {
                self.run.lane = lane;
                true
            }
            _ => false,
        }
    }

    /// Recompute the projection layout for a new viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.layout = Layout::new(width, height, &self.tuning);
        log::debug!("Layout resized to {}x{}", self.layout.width, self.layout.height);
    }

    /// End the current run
    ///
    /// Idempotent: only the first call while playing has any effect, so
    /// energy exhaustion and a crash in the same tick end the run once.
    pub fn end_run(&mut self, reason: EndReason) -> bool {
        if self.phase != RunPhase::Playing {
            return false;
        }
        self.run.refresh_score(&self.tuning);
        self.phase = RunPhase::GameOver;
        self.events.push(RunEvent::RunEnded {
            reason,
            final_score: self.run.score,
        });
        log::info!(
            "Run {} ended: {} (score {}, distance {:.0}, region {})",
            self.run_index,
            reason.as_str(),
            self.run.score,
            self.run.distance,
            self.run.region
        );
        true
    }

    pub(crate) fn emit(&mut self, event: RunEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<RunEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events queued but not yet drained
    pub fn pending_events(&self) -> &[RunEvent] {
        &self.events
    }

    pub fn hud(&self) -> Hud {
        Hud {
            phase: self.phase,
            score: self.run.score,
            pickups: self.run.pickups,
            boosts: self.run.boosts,
            speed: self.run.speed.round().max(0.0) as u32,
            region: self.run.region,
            energy_percent: (self.run.energy / self.tuning.energy_max * 100.0)
                .round()
                .clamp(0.0, 100.0) as u8,
            boosting: self.run.is_boosting(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_bounds() {
        assert_eq!(Lane::new(-1), Some(Lane::LEFT));
        assert_eq!(Lane::new(2), None);
        assert_eq!(Lane::LEFT.shifted(-1), None);
        assert_eq!(Lane::RIGHT.shifted(1), None);
        assert_eq!(Lane::CENTER.shifted(1), Some(Lane::RIGHT));
        assert_eq!(Lane::CENTER.shifted(i8::MAX), None);
    }

    #[test]
    fn test_lane_serde_rejects_out_of_range() {
        assert_eq!(serde_json::to_string(&Lane::LEFT).unwrap(), "-1");
        assert_eq!(serde_json::from_str::<Lane>("1").unwrap(), Lane::RIGHT);
        assert!(serde_json::from_str::<Lane>("3").is_err());
    }

    #[test]
    fn test_begin_run_resets_everything() {
        let mut state = GameState::new(7);
        assert_eq!(state.phase, RunPhase::Start);

        state.begin_run();
        assert_eq!(state.phase, RunPhase::Playing);
        assert!(!state.entities.obstacles.is_empty());

        state.run.distance = 5000.0;
        state.run.energy = 3.0;
        state.run.lane = Lane::LEFT;
        state.run.boost_timer = 2.0;

        state.begin_run();
        assert_eq!(state.run.distance, 0.0);
        assert_eq!(state.run.energy, state.tuning.energy_max);
        assert_eq!(state.run.lane, Lane::CENTER);
        assert_eq!(state.run.boost_timer, 0.0);
        assert_eq!(state.run_index, 2);
        assert!(state.entities.obstacles.iter().all(|o| o.z >= state.tuning.initial_spawn_depth));
    }

    #[test]
    fn test_shift_lane_guards() {
        let mut state = GameState::new(1);
        // Not playing yet
        assert!(!state.shift_lane(1));

        state.begin_run();
        assert!(state.shift_lane(1));
        assert_eq!(state.run.lane, Lane::RIGHT);
        assert!(!state.shift_lane(1));
        assert_eq!(state.run.lane, Lane::RIGHT);
        assert!(!state.shift_lane(0));
        assert!(state.shift_lane(-1));
        assert!(state.shift_lane(-1));
        assert!(!state.shift_lane(-1));
        assert_eq!(state.run.lane, Lane::LEFT);
    }

    #[test]
    fn test_pause_resume_only_from_matching_phase() {
        let mut state = GameState::new(1);
        state.pause();
        assert_eq!(state.phase, RunPhase::Start);

        state.begin_run();
        state.resume();
        assert_eq!(state.phase, RunPhase::Playing);
        state.pause();
        assert_eq!(state.phase, RunPhase::Paused);
        assert!(!state.shift_lane(1));
        state.resume();
        assert_eq!(state.phase, RunPhase::Playing);
    }

    #[test]
    fn test_end_run_is_idempotent() {
        let mut state = GameState::new(3);
        state.begin_run();
        state.run.distance = 1234.0;

        assert!(state.end_run(EndReason::CollisionDetected));
        let score = state.run.score;
        assert!(!state.end_run(EndReason::SunlightDepleted));
        assert_eq!(state.run.score, score);

        let ended: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, RunEvent::RunEnded { .. }))
            .collect();
        assert_eq!(
            ended,
            vec![RunEvent::RunEnded {
                reason: EndReason::CollisionDetected,
                final_score: score
            }]
        );
        assert_eq!(state.phase, RunPhase::GameOver);
        state.resume();
        assert_eq!(state.phase, RunPhase::GameOver);
    }

    #[test]
    fn test_integrate_clamps_energy_and_caps_speed() {
        let tuning = Tuning::default();
        let mut run = RunState::new(&tuning);
        run.base_speed = tuning.max_speed;
        run.energy = 0.01;
        run.integrate(&tuning, 0.1);
        assert_eq!(run.energy, 0.0);
        assert_eq!(run.base_speed, tuning.max_speed);
    }

    #[test]
    fn test_boost_multiplies_speed_and_reduces_drain() {
        let tuning = Tuning::default();
        let mut plain = RunState::new(&tuning);
        let mut boosted = RunState::new(&tuning);
        boosted.boost_timer = 1.0;

        plain.integrate(&tuning, 0.05);
        boosted.integrate(&tuning, 0.05);

        assert!((boosted.speed - plain.speed * tuning.boost_multiplier).abs() < 1e-3);
        assert!(boosted.distance > plain.distance);
        assert!(boosted.energy > plain.energy);
        assert!((boosted.boost_timer - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_visual_lane_approaches_lane() {
        let tuning = Tuning::default();
        let mut run = RunState::new(&tuning);
        run.lane = Lane::RIGHT;
        let mut last = run.visual_lane;
        for _ in 0..30 {
            run.integrate(&tuning, 1.0 / 60.0);
            assert!(run.visual_lane > last && run.visual_lane <= 1.0);
            last = run.visual_lane;
        }
        assert!(run.visual_lane > 0.95);
    }

    #[test]
    fn test_region_derived_from_distance() {
        let tuning = Tuning::default();
        let mut run = RunState::new(&tuning);
        run.distance = tuning.region_span * 2.5;
        run.integrate(&tuning, 0.0);
        assert_eq!(run.region, 3);
    }

    #[test]
    fn test_with_tuning_validates() {
        let inverted = Tuning {
            min_spacing: 600.0,
            max_spacing: 300.0,
            ..Default::default()
        };
        assert!(matches!(
            GameState::with_tuning(3, inverted),
            Err(TuningError::InvertedRange { .. })
        ));

        let quick = Tuning {
            start_speed: 300.0,
            ..Default::default()
        };
        let mut state = GameState::with_tuning(3, quick).unwrap();
        state.begin_run();
        assert_eq!(state.run.base_speed, 300.0);
    }

    #[test]
    fn test_hud_snapshot() {
        let mut state = GameState::new(9);
        state.begin_run();
        state.run.energy = state.tuning.energy_max * 0.456;
        let hud = state.hud();
        assert_eq!(hud.energy_percent, 46);
        assert_eq!(hud.phase, RunPhase::Playing);
        assert_eq!(hud.speed, state.tuning.start_speed.round() as u32);
        assert!(serde_json::to_string(&hud).unwrap().contains("\"energy_percent\":46"));
    }
}
