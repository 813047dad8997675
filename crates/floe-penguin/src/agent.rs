//! The penguin agent.
//!
//! Two discrete action branches drive it: swim forward or not, and turn
//! left, right, or not at all. It eats the first fish it touches while
//! its belly is empty and feeds its baby when it comes back full. The
//! episode is complete once the last fish has been delivered.
//!
//! # Rewards
//!
//! | Event | Reward |
//! |-------|--------|
//! | Every step (when `max_step > 0`) | `-1 / max_step` |
//! | Eating a fish while empty | `+1` |
//! | Feeding the baby while full | `+1` |
//!
//! # Observation
//!
//! Eight vector values followed by the ray sensor's output:
//! `[is_full, distance_to_baby, dir_to_baby.xyz, forward.xyz, rays...]`.

use floe_core::{
    CastQuery, EntityId, EnvironmentParameters, LayerMask, PhysicsQuery, SceneError, SensorError,
    Transform,
};
use floe_perception::{RayPerceptionConfig, RayPerceptionSensor};
use floe_scene::Scene;
use rand::Rng;
use smallvec::SmallVec;
use tracing::{debug, info, trace};

use crate::area::PenguinArea;
use crate::error::PenguinError;
use crate::tags;

/// Environment parameter holding the feeding radius.
pub const FEED_RADIUS_PARAM: &str = "feed_radius";

/// Number of vector observations written before the ray sensor output.
pub const VECTOR_OBSERVATIONS: usize = 8;

/// Size of each discrete action branch: forward, then turn.
pub const ACTION_BRANCHES: [u32; 2] = [2, 3];

/// Gap kept between the penguin and a wall after a blocked move.
const WALL_SKIN: f32 = 0.01;

// ── Actions ────────────────────────────────────────────────────────

/// Turn branch of the action space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum Turn {
    /// Keep heading.
    #[default]
    None = 0,
    /// Turn counter-clockwise seen from above.
    Left = 1,
    /// Turn clockwise seen from above.
    Right = 2,
}

impl Turn {
    /// Signed yaw multiplier: `-1`, `0`, or `+1`.
    pub fn amount(self) -> f32 {
        match self {
            Turn::None => 0.0,
            Turn::Left => -1.0,
            Turn::Right => 1.0,
        }
    }
}

/// One decision: both action branches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PenguinAction {
    /// Swim forward this step.
    pub forward: bool,
    /// Turn direction this step.
    pub turn: Turn,
}

impl PenguinAction {
    /// Decodes raw branch values: forward `{0, 1}`, turn `{0, 1, 2}`.
    ///
    /// Returns `None` for out-of-range values.
    pub fn from_branches(forward: u32, turn: u32) -> Option<Self> {
        let forward = match forward {
            0 => false,
            1 => true,
            _ => return None,
        };
        let turn = match turn {
            0 => Turn::None,
            1 => Turn::Left,
            2 => Turn::Right,
            _ => return None,
        };
        Some(Self { forward, turn })
    }
}

// ── PenguinConfig ──────────────────────────────────────────────────

/// Agent tuning and sensor layout.
#[derive(Clone, Debug, PartialEq)]
pub struct PenguinConfig {
    /// Forward speed in units per second. Default: 5.
    pub move_speed: f32,
    /// Turn rate in degrees per second. Default: 180.
    pub turn_speed: f32,
    /// Steps per episode before truncation; `0` means unlimited. Default: 5000.
    pub max_step: u32,
    /// Ray sensor layout. Default: 3 rays per side over 60 degrees,
    /// length 20, radius 0.5, detecting baby, fish, and wall.
    pub sensor: RayPerceptionConfig,
}

impl Default for PenguinConfig {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            turn_speed: 180.0,
            max_step: 5000,
            sensor: RayPerceptionConfig {
                rays_per_direction: 3,
                max_ray_degrees: 60.0,
                ray_length: 20.0,
                sphere_cast_radius: 0.5,
                detectable_tags: vec![tags::BABY.into(), tags::FISH.into(), tags::WALL.into()],
                ..Default::default()
            },
        }
    }
}

impl PenguinConfig {
    /// Checks speeds are finite and non-negative and validates the sensor.
    ///
    /// # Errors
    ///
    /// [`PenguinError::InvalidConfig`] or [`PenguinError::Sensor`].
    pub fn validate(&self) -> Result<(), PenguinError> {
        for (name, value) in [("move_speed", self.move_speed), ("turn_speed", self.turn_speed)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PenguinError::InvalidConfig {
                    reason: format!("{name} must be finite and non-negative, got {value}"),
                });
            }
        }
        self.sensor.validate()?;
        Ok(())
    }
}

// ── PenguinAgent ───────────────────────────────────────────────────

/// Learning agent bound to the penguin entity of one [`PenguinArea`].
#[derive(Clone, Debug)]
pub struct PenguinAgent {
    config: PenguinConfig,
    entity: EntityId,
    radius: f32,
    sensor: RayPerceptionSensor,
    is_full: bool,
    feed_radius: f32,
    step_count: u32,
    pending_reward: f32,
    cumulative_reward: f32,
    done: bool,
}

impl PenguinAgent {
    /// Binds an agent to `area`'s penguin and resolves its sensor tags
    /// against `scene`.
    ///
    /// # Errors
    ///
    /// Whatever [`PenguinConfig::validate`] or sensor construction reports.
    pub fn new(
        config: PenguinConfig,
        area: &PenguinArea,
        scene: &mut Scene,
    ) -> Result<Self, PenguinError> {
        config.validate()?;
        let sensor = RayPerceptionSensor::new("penguin_eyes", &config.sensor, scene.tags_mut())?;
        Ok(Self {
            entity: area.penguin(),
            radius: area.config().penguin_radius,
            sensor,
            config,
            is_full: false,
            feed_radius: 0.0,
            step_count: 0,
            pending_reward: 0.0,
            cumulative_reward: 0.0,
            done: false,
        })
    }

    /// The penguin entity this agent drives.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Agent configuration.
    pub fn config(&self) -> &PenguinConfig {
        &self.config
    }

    /// The agent's ray sensor.
    pub fn sensor(&self) -> &RayPerceptionSensor {
        &self.sensor
    }

    /// Whether the penguin is carrying a fish.
    pub fn is_full(&self) -> bool {
        self.is_full
    }

    /// Steps taken this episode.
    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Reward accumulated over the current episode.
    pub fn cumulative_reward(&self) -> f32 {
        self.cumulative_reward
    }

    /// Feeding radius for the current episode.
    pub fn feed_radius(&self) -> f32 {
        self.feed_radius
    }

    /// Whether the episode ended because every fish was delivered.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Whether the step limit has been reached.
    pub fn max_step_reached(&self) -> bool {
        self.config.max_step > 0 && self.step_count >= self.config.max_step
    }

    /// Total observation length: vector values plus ray sensor output.
    pub fn observation_size(&self) -> usize {
        VECTOR_OBSERVATIONS + self.sensor.observation_shape()[0]
    }

    /// Adds `reward` to both the pending and the episode total.
    pub fn add_reward(&mut self, reward: f32) {
        self.pending_reward += reward;
        self.cumulative_reward += reward;
    }

    /// Returns the reward accumulated since the last call and clears it.
    pub fn take_reward(&mut self) -> f32 {
        std::mem::take(&mut self.pending_reward)
    }

    /// Starts a new episode: clears agent state, resets the area, and
    /// reads the feeding radius from `params`.
    ///
    /// # Errors
    ///
    /// Whatever [`PenguinArea::reset_area`] reports.
    pub fn on_episode_begin<R: Rng>(
        &mut self,
        scene: &mut Scene,
        area: &mut PenguinArea,
        rng: &mut R,
        params: &EnvironmentParameters,
    ) -> Result<(), PenguinError> {
        self.is_full = false;
        self.done = false;
        self.step_count = 0;
        self.pending_reward = 0.0;
        self.cumulative_reward = 0.0;
        self.sensor.reset();
        area.reset_area(scene, rng, params)?;
        self.feed_radius = params.get_with_default(FEED_RADIUS_PARAM, 0.0);
        Ok(())
    }

    /// Applies one step of `action` over `dt` seconds.
    ///
    /// Turning rotates about the up axis; swimming moves along the
    /// heading and stops short of walls. Charges the per-step penalty
    /// and counts the step.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if the penguin was despawned.
    pub fn act(
        &mut self,
        scene: &mut Scene,
        action: PenguinAction,
        dt: f32,
    ) -> Result<(), PenguinError> {
        let mut transform = *scene
            .transform(self.entity)
            .ok_or(SceneError::UnknownEntity(self.entity))?;

        let distance = if action.forward {
            self.config.move_speed * dt
        } else {
            0.0
        };
        if distance > 0.0 {
            let heading = transform.forward();
            let allowed = self.clear_distance(scene, &transform, distance);
            transform.position += heading * allowed;
        }
        transform.rotate_yaw(action.turn.amount() * self.config.turn_speed * dt);
        scene.set_transform(self.entity, transform)?;

        if self.config.max_step > 0 {
            self.add_reward(-1.0 / self.config.max_step as f32);
        }
        self.step_count += 1;
        Ok(())
    }

    /// How far the penguin can swim along its heading before touching a
    /// wall, capped at `distance`.
    fn clear_distance(&self, scene: &Scene, transform: &Transform, distance: f32) -> f32 {
        let reach = distance + WALL_SKIN;
        let Some(query) = CastQuery::ray(transform.position, transform.forward(), reach) else {
            return 0.0;
        };
        let query = query
            .with_radius(self.radius)
            .with_layer_mask(LayerMask::NONE.with(tags::WALL_LAYER))
            .excluding(self.entity);
        match scene.cast(&query) {
            Some(hit) => (hit.distance - WALL_SKIN).clamp(0.0, distance),
            None => distance,
        }
    }

    /// Handles everything the penguin touches after a move: fish are
    /// eaten, the baby is fed. Also feeds the baby when it is within the
    /// feeding radius.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if the penguin or baby was despawned.
    pub fn resolve_contacts(
        &mut self,
        scene: &mut Scene,
        area: &mut PenguinArea,
    ) -> Result<(), PenguinError> {
        let position = scene
            .transform(self.entity)
            .ok_or(SceneError::UnknownEntity(self.entity))?
            .position;
        let touching: SmallVec<[EntityId; 8]> =
            scene.overlap_sphere(&position, self.radius, LayerMask::ALL);
        for id in touching {
            if id == self.entity {
                continue;
            }
            if area.is_fish(id) {
                self.eat_fish(scene, area, id);
            } else if id == area.baby() {
                self.regurgitate_fish(area);
            }
        }

        if self.feed_radius > 0.0 {
            let baby = scene
                .transform(area.baby())
                .ok_or(SceneError::UnknownEntity(area.baby()))?;
            if (baby.position - position).norm() < self.feed_radius {
                self.regurgitate_fish(area);
            }
        }
        Ok(())
    }

    /// Eats `fish` if the penguin is empty. Returns whether it ate.
    pub fn eat_fish(&mut self, scene: &mut Scene, area: &mut PenguinArea, fish: EntityId) -> bool {
        if self.is_full || !area.remove_specific_fish(scene, fish) {
            return false;
        }
        self.is_full = true;
        self.add_reward(1.0);
        debug!(%fish, remaining = area.fish_remaining(), "fish eaten");
        true
    }

    /// Feeds the baby if the penguin is full. Returns whether it fed.
    ///
    /// Completes the episode when no fish remain.
    pub fn regurgitate_fish(&mut self, area: &PenguinArea) -> bool {
        if !self.is_full {
            return false;
        }
        self.is_full = false;
        self.add_reward(1.0);
        debug!(remaining = area.fish_remaining(), "baby fed");
        if area.fish_remaining() == 0 {
            self.done = true;
            info!(
                steps = self.step_count,
                reward = self.cumulative_reward,
                "all fish delivered"
            );
        }
        true
    }

    /// Writes the vector observations and the ray sensor output into
    /// `buffer[offset..]`. Returns the number of values written.
    ///
    /// # Errors
    ///
    /// - [`PenguinError::Sensor`] with [`SensorError::BufferTooSmall`] if
    ///   the observation does not fit.
    /// - [`PenguinError::Scene`] if the penguin or baby was despawned.
    pub fn collect_observations(
        &mut self,
        scene: &Scene,
        area: &PenguinArea,
        buffer: &mut [f32],
        offset: usize,
    ) -> Result<usize, PenguinError> {
        let required = offset + self.observation_size();
        if buffer.len() < required {
            return Err(SensorError::BufferTooSmall {
                required,
                available: buffer.len(),
            }
            .into());
        }
        let transform = *scene
            .transform(self.entity)
            .ok_or(SceneError::UnknownEntity(self.entity))?;
        let baby = scene
            .transform(area.baby())
            .ok_or(SceneError::UnknownEntity(area.baby()))?;

        let to_baby = baby.position - transform.position;
        let distance = to_baby.norm();
        let direction = if distance > f32::EPSILON {
            to_baby / distance
        } else {
            to_baby
        };
        let forward = transform.forward();
        buffer[offset..offset + VECTOR_OBSERVATIONS].copy_from_slice(&[
            if self.is_full { 1.0 } else { 0.0 },
            distance,
            direction.x,
            direction.y,
            direction.z,
            forward.x,
            forward.y,
            forward.z,
        ]);

        let rays = self.sensor.write(
            scene,
            &transform,
            Some(self.entity),
            buffer,
            offset + VECTOR_OBSERVATIONS,
        )?;
        trace!(step = self.step_count, "observations collected");
        Ok(VECTOR_OBSERVATIONS + rays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaConfig;
    use nalgebra::{Point3, Vector3};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn setup() -> (Scene, PenguinArea, PenguinAgent) {
        let mut scene = Scene::new();
        let area = PenguinArea::new(&mut scene, AreaConfig::default()).unwrap();
        let agent = PenguinAgent::new(PenguinConfig::default(), &area, &mut scene).unwrap();
        (scene, area, agent)
    }

    fn put(scene: &mut Scene, id: EntityId, x: f32, z: f32, yaw: f32) {
        scene
            .set_transform(id, Transform::from_yaw(Point3::new(x, 0.5, z), yaw))
            .unwrap();
    }

    #[test]
    fn branches_decode() {
        assert_eq!(
            PenguinAction::from_branches(1, 2),
            Some(PenguinAction {
                forward: true,
                turn: Turn::Right
            })
        );
        assert_eq!(PenguinAction::from_branches(0, 1).unwrap().turn.amount(), -1.0);
        assert!(PenguinAction::from_branches(2, 0).is_none());
        assert!(PenguinAction::from_branches(0, 3).is_none());
    }

    #[test]
    fn default_config_validates() {
        assert!(PenguinConfig::default().validate().is_ok());
        let bad = PenguinConfig {
            move_speed: -1.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(PenguinError::InvalidConfig { .. })));
    }

    #[test]
    fn forward_moves_along_heading_and_charges_penalty() {
        let (mut scene, _area, mut agent) = setup();
        put(&mut scene, agent.entity(), 0.0, 0.0, 90.0);
        agent
            .act(&mut scene, PenguinAction::from_branches(1, 0).unwrap(), 0.1)
            .unwrap();
        let p = scene.transform(agent.entity()).unwrap().position;
        assert!((p - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-4);
        assert_eq!(agent.step_count(), 1);
        assert!((agent.take_reward() + 1.0 / 5000.0).abs() < 1e-9);
        assert_eq!(agent.take_reward(), 0.0);
    }

    #[test]
    fn turning_changes_heading_only() {
        let (mut scene, _area, mut agent) = setup();
        put(&mut scene, agent.entity(), 1.0, 1.0, 0.0);
        agent
            .act(&mut scene, PenguinAction::from_branches(0, 2).unwrap(), 0.25)
            .unwrap();
        let t = scene.transform(agent.entity()).unwrap();
        assert!((t.yaw_degrees() - 45.0).abs() < 1e-3);
        assert!((t.position - Point3::new(1.0, 0.5, 1.0)).norm() < 1e-6);

        agent
            .act(&mut scene, PenguinAction::from_branches(0, 1).unwrap(), 0.5)
            .unwrap();
        let t = scene.transform(agent.entity()).unwrap();
        assert!((t.yaw_degrees() + 45.0).abs() < 1e-3);
    }

    #[test]
    fn walls_block_movement() {
        let (mut scene, _area, mut agent) = setup();
        put(&mut scene, agent.entity(), 0.0, 13.0, 0.0);
        for _ in 0..20 {
            agent
                .act(&mut scene, PenguinAction::from_branches(1, 0).unwrap(), 0.1)
                .unwrap();
        }
        let z = scene.transform(agent.entity()).unwrap().position.z;
        assert!(z <= 15.0 - 0.5, "penguin passed through the wall: z = {z}");
        assert!(z > 14.0);
    }

    #[test]
    fn eating_and_feeding_reward_and_finish() {
        let (mut scene, mut area, mut agent) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        area.spawn_fish(&mut scene, &mut rng, 1, 0.0).unwrap();
        let fish = area.fish()[0].entity();
        put(&mut scene, area.baby(), 0.0, 8.0, 180.0);

        // Move onto the fish.
        let fish_pos = scene.transform(fish).unwrap().position;
        put(&mut scene, agent.entity(), fish_pos.x, fish_pos.z, 0.0);
        agent.resolve_contacts(&mut scene, &mut area).unwrap();
        assert!(agent.is_full());
        assert_eq!(area.fish_remaining(), 0);
        assert!(!scene.contains(fish));
        assert_eq!(agent.take_reward(), 1.0);
        assert!(!agent.is_done());

        // Move onto the baby.
        put(&mut scene, agent.entity(), 0.0, 7.5, 0.0);
        agent.resolve_contacts(&mut scene, &mut area).unwrap();
        assert!(!agent.is_full());
        assert_eq!(agent.take_reward(), 1.0);
        assert!(agent.is_done());
        assert_eq!(agent.cumulative_reward(), 2.0);
    }

    #[test]
    fn full_penguin_ignores_other_fish() {
        let (mut scene, mut area, mut agent) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        area.spawn_fish(&mut scene, &mut rng, 2, 0.0).unwrap();
        let first = area.fish()[0].entity();
        let second = area.fish()[1].entity();
        assert!(agent.eat_fish(&mut scene, &mut area, first));
        assert!(!agent.eat_fish(&mut scene, &mut area, second));
        assert_eq!(area.fish_remaining(), 1);
        assert!(agent.regurgitate_fish(&area));
        assert!(!agent.is_done());
        assert!(!agent.regurgitate_fish(&area));
    }

    #[test]
    fn feed_radius_feeds_at_a_distance() {
        let (mut scene, mut area, mut agent) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut params = EnvironmentParameters::new();
        params.set(FEED_RADIUS_PARAM, 3.0);
        agent
            .on_episode_begin(&mut scene, &mut area, &mut rng, &params)
            .unwrap();
        assert_eq!(agent.feed_radius(), 3.0);

        let fish = area.fish()[0].entity();
        assert!(agent.eat_fish(&mut scene, &mut area, fish));
        put(&mut scene, area.baby(), 0.0, 8.0, 180.0);
        put(&mut scene, agent.entity(), 0.0, 6.0, 0.0);
        agent.resolve_contacts(&mut scene, &mut area).unwrap();
        assert!(!agent.is_full());
        assert!(!agent.is_done());
    }

    #[test]
    fn observation_layout() {
        let (mut scene, area, mut agent) = setup();
        put(&mut scene, area.baby(), 0.0, 8.0, 180.0);
        put(&mut scene, agent.entity(), 0.0, 4.0, 90.0);
        let size = agent.observation_size();
        assert_eq!(size, 8 + 7 * (3 + 2));

        let mut obs = vec![f32::NAN; size];
        assert_eq!(
            agent.collect_observations(&scene, &area, &mut obs, 0).unwrap(),
            size
        );
        assert_eq!(obs[0], 0.0);
        assert!((obs[1] - 4.0).abs() < 1e-5);
        assert!((Vector3::new(obs[2], obs[3], obs[4]) - Vector3::z()).norm() < 1e-5);
        assert!((Vector3::new(obs[5], obs[6], obs[7]) - Vector3::x()).norm() < 1e-5);
        assert!(obs.iter().all(|v| v.is_finite()));

        let mut short = vec![0.0; size - 1];
        assert!(matches!(
            agent.collect_observations(&scene, &area, &mut short, 0),
            Err(PenguinError::Sensor(SensorError::BufferTooSmall { .. }))
        ));
    }

    #[test]
    fn episode_begin_clears_state() {
        let (mut scene, mut area, mut agent) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        agent.add_reward(3.0);
        agent
            .act(&mut scene, PenguinAction::default(), 0.1)
            .unwrap();
        agent
            .on_episode_begin(&mut scene, &mut area, &mut rng, &EnvironmentParameters::new())
            .unwrap();
        assert_eq!(agent.step_count(), 0);
        assert_eq!(agent.cumulative_reward(), 0.0);
        assert_eq!(agent.take_reward(), 0.0);
        assert_eq!(area.fish_remaining(), 4);
        assert!(!agent.max_step_reached());
    }

    #[test]
    fn step_limit_is_reported() {
        let mut scene = Scene::new();
        let area = PenguinArea::new(&mut scene, AreaConfig::default()).unwrap();
        let config = PenguinConfig {
            max_step: 3,
            ..Default::default()
        };
        let mut agent = PenguinAgent::new(config, &area, &mut scene).unwrap();
        for _ in 0..3 {
            assert!(!agent.max_step_reached());
            agent
                .act(&mut scene, PenguinAction::default(), 0.1)
                .unwrap();
        }
        assert!(agent.max_step_reached());
        assert!((agent.cumulative_reward() + 1.0).abs() < 1e-6);
    }
}
