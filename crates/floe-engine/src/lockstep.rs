//! Lockstep (synchronous) episode loop.
//!
//! [`LockstepEnv`] is the user-facing API for running penguin episodes.
//! [`reset()`](LockstepEnv::reset) starts an episode and returns the
//! first observation; each [`step()`](LockstepEnv::step) applies one
//! decision for `decision_period` substeps of `dt` seconds and returns
//! a [`StepResult`].
//!
//! # Ownership model
//!
//! `LockstepEnv` is [`Send`] but every mutating method takes `&mut self`,
//! and [`StepResult`] borrows the observation buffer from the
//! environment. The caller cannot step again while holding a result.
//!
//! # Determinism
//!
//! Placement and fish behaviour draw from a single `ChaCha8Rng` seeded
//! from [`EnvConfig::seed`]. Two environments built from the same config
//! and fed the same actions produce identical observations and rewards.

use std::fmt;
use std::time::Instant;

use floe_core::{EnvironmentParameters, SceneError, SensorError};
use floe_penguin::{PenguinAction, PenguinAgent, PenguinArea, PenguinError};
use floe_scene::Scene;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::{ConfigError, EnvConfig};
use crate::metrics::StepMetrics;

// Compile-time assertion: LockstepEnv is Send.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepEnv>();
    }
};

// ── EnvError ───────────────────────────────────────────────────────

/// Errors from [`LockstepEnv::reset()`] and [`LockstepEnv::step()`].
#[derive(Clone, Debug, PartialEq)]
pub enum EnvError {
    /// The episode has ended (or never started); call `reset()` first.
    EpisodeOver,
    /// The scenario failed while resetting, stepping, or observing.
    Scenario(PenguinError),
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EpisodeOver => write!(f, "episode is over; reset before stepping"),
            Self::Scenario(e) => write!(f, "scenario: {e}"),
        }
    }
}

impl std::error::Error for EnvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Scenario(e) => Some(e),
            Self::EpisodeOver => None,
        }
    }
}

impl From<PenguinError> for EnvError {
    fn from(e: PenguinError) -> Self {
        Self::Scenario(e)
    }
}

impl From<SceneError> for EnvError {
    fn from(e: SceneError) -> Self {
        Self::Scenario(PenguinError::Scene(e))
    }
}

impl From<SensorError> for EnvError {
    fn from(e: SensorError) -> Self {
        Self::Scenario(PenguinError::Sensor(e))
    }
}

// ── StepResult ─────────────────────────────────────────────────────

/// Result of a successful [`LockstepEnv::step()`] call.
#[derive(Debug)]
pub struct StepResult<'e> {
    /// Observation after the decision.
    pub observation: &'e [f32],
    /// Reward earned during the decision's substeps.
    pub reward: f32,
    /// Every fish was delivered.
    pub terminated: bool,
    /// The step limit was reached before the episode terminated.
    pub truncated: bool,
    /// Timing and bookkeeping for this decision.
    pub metrics: StepMetrics,
}

// ── LockstepEnv ────────────────────────────────────────────────────

/// Single-threaded penguin environment.
///
/// # Examples
///
/// ```
/// use floe_engine::{EnvConfig, LockstepEnv};
/// use floe_penguin::PenguinAction;
///
/// let mut env = LockstepEnv::new(EnvConfig::default()).unwrap();
/// let first = env.reset().unwrap().to_vec();
/// assert_eq!(first.len(), env.observation_size());
///
/// let action = PenguinAction::from_branches(1, 2).unwrap();
/// let result = env.step(action).unwrap();
/// assert_eq!(result.observation.len(), first.len());
/// assert!(result.reward.is_finite());
/// ```
pub struct LockstepEnv {
    scene: Scene,
    area: PenguinArea,
    agent: PenguinAgent,
    rng: ChaCha8Rng,
    seed: u64,
    dt: f32,
    decision_period: u32,
    parameters: EnvironmentParameters,
    observation: Vec<f32>,
    episode: u64,
    episode_over: bool,
    last_metrics: StepMetrics,
}

impl LockstepEnv {
    /// Validates `config` and builds the scene, area, and agent.
    ///
    /// The environment starts with no episode in progress; call
    /// [`reset()`](Self::reset) before stepping.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if validation or scenario construction fails.
    pub fn new(config: EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut scene = Scene::new();
        let area = PenguinArea::new(&mut scene, config.area)?;
        let agent = PenguinAgent::new(config.penguin, &area, &mut scene)?;
        let observation = vec![0.0; agent.observation_size()];
        debug!(
            seed = config.seed,
            observation = observation.len(),
            "lockstep env built"
        );
        Ok(Self {
            scene,
            area,
            agent,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            seed: config.seed,
            dt: config.dt,
            decision_period: config.decision_period,
            parameters: config.parameters,
            observation,
            episode: 0,
            episode_over: true,
            last_metrics: StepMetrics::default(),
        })
    }

    /// Starts a new episode and returns its first observation.
    ///
    /// The RNG is not reseeded, so successive episodes differ; use
    /// [`reset_with_seed()`](Self::reset_with_seed) to replay one.
    ///
    /// # Errors
    ///
    /// [`EnvError::Scenario`] if the area reset or observation fails.
    pub fn reset(&mut self) -> Result<&[f32], EnvError> {
        self.agent
            .on_episode_begin(&mut self.scene, &mut self.area, &mut self.rng, &self.parameters)?;
        self.agent
            .collect_observations(&self.scene, &self.area, &mut self.observation, 0)?;
        self.episode += 1;
        self.episode_over = false;
        self.last_metrics = StepMetrics::default();
        info!(
            episode = self.episode,
            fish = self.area.fish_remaining(),
            "episode started"
        );
        Ok(&self.observation)
    }

    /// Reseeds the RNG with `seed`, then [`reset()`](Self::reset)s.
    ///
    /// # Errors
    ///
    /// As for [`reset()`](Self::reset).
    pub fn reset_with_seed(&mut self, seed: u64) -> Result<&[f32], EnvError> {
        self.seed = seed;
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.reset()
    }

    /// Applies `action` for one decision.
    ///
    /// Each substep moves the agent, lets the fish swim, and resolves
    /// contacts. Substeps stop early once the episode terminates or hits
    /// the step limit.
    ///
    /// # Errors
    ///
    /// - [`EnvError::EpisodeOver`] if no episode is in progress.
    /// - [`EnvError::Scenario`] if an entity went missing or the
    ///   observation could not be written. The episode is then over.
    pub fn step(&mut self, action: PenguinAction) -> Result<StepResult<'_>, EnvError> {
        if self.episode_over {
            return Err(EnvError::EpisodeOver);
        }
        let result = self.run_decision(action);
        if result.is_err() {
            self.episode_over = true;
        }
        let metrics = result?;

        let terminated = self.agent.is_done();
        let truncated = !terminated && self.agent.max_step_reached();
        let reward = self.agent.take_reward();
        if terminated || truncated {
            self.episode_over = true;
            info!(
                episode = self.episode,
                steps = self.agent.step_count(),
                reward = self.agent.cumulative_reward(),
                terminated,
                "episode finished"
            );
        }
        self.last_metrics = metrics.clone();
        Ok(StepResult {
            observation: &self.observation,
            reward,
            terminated,
            truncated,
            metrics,
        })
    }

    fn run_decision(&mut self, action: PenguinAction) -> Result<StepMetrics, EnvError> {
        let start = Instant::now();
        let mut metrics = StepMetrics::default();
        let mut agent_us = 0u64;
        let mut fish_us = 0u64;

        for _ in 0..self.decision_period {
            let t = Instant::now();
            self.agent.act(&mut self.scene, action, self.dt)?;
            agent_us += t.elapsed().as_micros() as u64;

            let t = Instant::now();
            self.area.update_fish(&mut self.scene, &mut self.rng, self.dt)?;
            fish_us += t.elapsed().as_micros() as u64;

            let t = Instant::now();
            self.agent.resolve_contacts(&mut self.scene, &mut self.area)?;
            agent_us += t.elapsed().as_micros() as u64;

            metrics.substeps += 1;
            if self.agent.is_done() || self.agent.max_step_reached() {
                break;
            }
        }

        let t = Instant::now();
        self.agent
            .collect_observations(&self.scene, &self.area, &mut self.observation, 0)?;
        metrics.observation_us = t.elapsed().as_micros() as u64;

        metrics.agent_us = agent_us;
        metrics.fish_us = fish_us;
        metrics.rays_cast = self.agent.sensor().settings().num_rays();
        metrics.fish_remaining = self.area.fish_remaining();
        metrics.episode_steps = self.agent.step_count();
        metrics.total_us = start.elapsed().as_micros() as u64;
        Ok(metrics)
    }

    /// Observation from the most recent reset or step.
    pub fn observation(&self) -> &[f32] {
        &self.observation
    }

    /// Length of every observation.
    pub fn observation_size(&self) -> usize {
        self.observation.len()
    }

    /// The simulation context.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable simulation context, for scripted setups and tests.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// The penguin area.
    pub fn area(&self) -> &PenguinArea {
        &self.area
    }

    /// The agent.
    pub fn agent(&self) -> &PenguinAgent {
        &self.agent
    }

    /// Parameters read at the next episode start.
    pub fn parameters_mut(&mut self) -> &mut EnvironmentParameters {
        &mut self.parameters
    }

    /// The seed the RNG was last seeded with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Episodes started so far.
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Whether a reset is needed before the next step.
    pub fn is_episode_over(&self) -> bool {
        self.episode_over
    }

    /// Metrics from the most recent successful step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }
}

impl fmt::Debug for LockstepEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockstepEnv")
            .field("episode", &self.episode)
            .field("seed", &self.seed)
            .field("episode_over", &self.episode_over)
            .field("fish_remaining", &self.area.fish_remaining())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floe_core::Transform;
    use floe_penguin::Turn;
    use nalgebra::Point3;

    fn env() -> LockstepEnv {
        LockstepEnv::new(EnvConfig::default()).unwrap()
    }

    /// Moves the penguin beside the east wall, clear of the baby and fish.
    fn park_penguin(env: &mut LockstepEnv) {
        let penguin = env.area().penguin();
        env.scene_mut()
            .set_transform(penguin, Transform::from_position(Point3::new(12.0, 0.5, 0.0)))
            .unwrap();
    }

    #[test]
    fn step_before_reset_is_rejected() {
        let mut env = env();
        assert!(env.is_episode_over());
        assert!(matches!(
            env.step(PenguinAction::default()),
            Err(EnvError::EpisodeOver)
        ));
    }

    #[test]
    fn reset_starts_an_episode() {
        let mut env = env();
        let size = env.observation_size();
        assert_eq!(env.reset().unwrap().len(), size);
        assert_eq!(env.episode(), 1);
        assert!(!env.is_episode_over());
        assert_eq!(env.area().fish_remaining(), 4);
    }

    #[test]
    fn idle_step_runs_full_period_and_charges_penalty() {
        let mut env = env();
        env.parameters_mut().set("fish_speed", 0.0);
        env.reset().unwrap();
        park_penguin(&mut env);
        let result = env.step(PenguinAction::default()).unwrap();
        assert_eq!(result.metrics.substeps, 5);
        assert_eq!(result.metrics.episode_steps, 5);
        assert_eq!(result.metrics.rays_cast, 7);
        assert!((result.reward + 5.0 / 5000.0).abs() < 1e-6);
        assert!(!result.terminated);
        assert!(!result.truncated);
        assert_eq!(env.last_metrics().substeps, 5);
    }

    #[test]
    fn turning_in_place_keeps_position() {
        let mut env = env();
        env.reset().unwrap();
        let penguin = env.area().penguin();
        let before = env.scene().transform(penguin).unwrap().position;
        let action = PenguinAction {
            forward: false,
            turn: Turn::Left,
        };
        env.step(action).unwrap();
        let after = env.scene().transform(penguin).unwrap().position;
        assert_eq!(before, after);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            EnvError::EpisodeOver.to_string(),
            "episode is over; reset before stepping"
        );
        let e: EnvError = SensorError::BufferTooSmall {
            required: 2,
            available: 1,
        }
        .into();
        assert!(e.to_string().starts_with("scenario: sensor: "));
    }
}
