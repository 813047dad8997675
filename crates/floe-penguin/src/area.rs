//! The walled area a penguin, its baby, and the fish share.
//!
//! [`PenguinArea`] spawns the static entities once (walls, penguin,
//! baby) and, on every [`reset_area`](PenguinArea::reset_area), clears
//! the fish, scatters the penguin and baby, and spawns a fresh school.
//! Placement samples donut wedges around the area centre with
//! [`choose_random_position`].

use floe_core::transform::yaw_rotation;
use floe_core::{EntityId, EnvironmentParameters, SceneError, Transform};
use floe_scene::{Collider, EntityDesc, Scene};
use nalgebra::{Point3, Vector3};
use rand::Rng;
use tracing::{debug, warn};

use crate::error::PenguinError;
use crate::fish::Fish;
use crate::tags;

/// Environment parameter holding the base fish speed.
pub const FISH_SPEED_PARAM: &str = "fish_speed";
/// Fish speed used when [`FISH_SPEED_PARAM`] is unset.
pub const DEFAULT_FISH_SPEED: f32 = 0.5;

// ── Placement ──────────────────────────────────────────────────────

/// Picks a point on the ground plane around `center`.
///
/// The angle is measured in degrees from `+Z` toward `+X`. Radius and
/// angle are drawn uniformly from `[min, max)`; a range whose maximum does
/// not exceed its minimum collapses to the minimum and draws nothing.
///
/// # Examples
///
/// ```
/// use floe_penguin::choose_random_position;
/// use nalgebra::Point3;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(0);
/// let p = choose_random_position(&mut rng, &Point3::origin(), 90.0, 90.0, 2.0, 2.0);
/// assert!((p - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-5);
/// ```
pub fn choose_random_position<R: Rng>(
    rng: &mut R,
    center: &Point3<f32>,
    min_angle: f32,
    max_angle: f32,
    min_radius: f32,
    max_radius: f32,
) -> Point3<f32> {
    let radius = if max_radius > min_radius {
        rng.random_range(min_radius..max_radius)
    } else {
        min_radius
    };
    let angle = if max_angle > min_angle {
        rng.random_range(min_angle..max_angle)
    } else {
        min_angle
    };
    center + yaw_rotation(angle) * Vector3::z() * radius
}

/// A donut wedge around a centre: angles in degrees from `+Z` toward `+X`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wedge {
    /// Lower angle bound.
    pub min_angle: f32,
    /// Upper angle bound.
    pub max_angle: f32,
    /// Inner radius.
    pub min_radius: f32,
    /// Outer radius.
    pub max_radius: f32,
}

impl Wedge {
    /// Anywhere within 9 units.
    pub const PENGUIN: Self = Self::new(0.0, 360.0, 0.0, 9.0);
    /// In front of the centre, 4 to 9 units out.
    pub const BABY: Self = Self::new(-45.0, 45.0, 4.0, 9.0);
    /// Behind the centre, 2 to 13 units out.
    pub const FISH: Self = Self::new(100.0, 260.0, 2.0, 13.0);

    /// Wedge from its bounds.
    pub const fn new(min_angle: f32, max_angle: f32, min_radius: f32, max_radius: f32) -> Self {
        Self {
            min_angle,
            max_angle,
            min_radius,
            max_radius,
        }
    }

    /// Samples a point of the wedge with [`choose_random_position`].
    pub fn sample<R: Rng>(&self, rng: &mut R, center: &Point3<f32>) -> Point3<f32> {
        choose_random_position(
            rng,
            center,
            self.min_angle,
            self.max_angle,
            self.min_radius,
            self.max_radius,
        )
    }

    /// Returns `true` if `point`, projected onto the ground plane, lies
    /// inside the wedge (with a small tolerance).
    pub fn contains(&self, center: &Point3<f32>, point: &Point3<f32>) -> bool {
        const EPS: f32 = 1e-3;
        const ANGLE_EPS: f32 = 1e-2;
        let dx = point.x - center.x;
        let dz = point.z - center.z;
        let radius = (dx * dx + dz * dz).sqrt();
        if radius < self.min_radius - EPS || radius > self.max_radius + EPS {
            return false;
        }
        // Heading is meaningless this close to the centre.
        if radius <= 1e-2 || self.max_angle - self.min_angle >= 360.0 {
            return true;
        }
        let angle = dx.atan2(dz).to_degrees();
        let unwrapped = self.min_angle + (angle - self.min_angle).rem_euclid(360.0);
        unwrapped <= self.max_angle + ANGLE_EPS || unwrapped >= self.min_angle + 360.0 - ANGLE_EPS
    }

    fn reach(&self) -> f32 {
        self.max_radius.max(self.min_radius)
    }
}

// ── AreaConfig ─────────────────────────────────────────────────────

/// Layout of one penguin area.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaConfig {
    /// Ground-level centre of the area.
    pub center: Point3<f32>,
    /// Distance from the centre to the inner face of each wall. Default: 15.
    pub half_extent: f32,
    /// Wall height. Default: 2.
    pub wall_height: f32,
    /// Wall thickness. Default: 0.5.
    pub wall_thickness: f32,
    /// Fish spawned per reset. Default: 4.
    pub fish_count: usize,
    /// Penguin collider radius. Default: 0.5.
    pub penguin_radius: f32,
    /// Baby collider radius. Default: 0.5.
    pub baby_radius: f32,
    /// Fish collider radius. Default: 0.3.
    pub fish_radius: f32,
    /// Height above the ground every placed entity is lifted by. Default: 0.5.
    pub spawn_height: f32,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            center: Point3::origin(),
            half_extent: 15.0,
            wall_height: 2.0,
            wall_thickness: 0.5,
            fish_count: 4,
            penguin_radius: 0.5,
            baby_radius: 0.5,
            fish_radius: 0.3,
            spawn_height: 0.5,
        }
    }
}

impl AreaConfig {
    /// Checks sizes are finite and positive and that every placement
    /// wedge fits inside the walls.
    ///
    /// # Errors
    ///
    /// [`PenguinError::InvalidConfig`] naming the first failing field.
    pub fn validate(&self) -> Result<(), PenguinError> {
        let invalid = |reason: String| Err(PenguinError::InvalidConfig { reason });
        if !self.center.coords.iter().all(|c| c.is_finite()) {
            return invalid("center must be finite".into());
        }
        for (name, value) in [
            ("half_extent", self.half_extent),
            ("wall_height", self.wall_height),
            ("wall_thickness", self.wall_thickness),
            ("penguin_radius", self.penguin_radius),
            ("baby_radius", self.baby_radius),
            ("fish_radius", self.fish_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{name} must be finite and positive, got {value}"));
            }
        }
        if !self.spawn_height.is_finite() || self.spawn_height < 0.0 {
            return invalid(format!(
                "spawn_height must be finite and non-negative, got {}",
                self.spawn_height
            ));
        }
        for (name, wedge, radius) in [
            ("penguin", Wedge::PENGUIN, self.penguin_radius),
            ("baby", Wedge::BABY, self.baby_radius),
            ("fish", Wedge::FISH, self.fish_radius),
        ] {
            if wedge.reach() + radius >= self.half_extent {
                return invalid(format!(
                    "half_extent {} too small for {name} placement reaching {}",
                    self.half_extent,
                    wedge.reach() + radius
                ));
            }
        }
        Ok(())
    }
}

// ── PenguinArea ────────────────────────────────────────────────────

/// One walled area and the entities that belong to it.
#[derive(Clone, Debug)]
pub struct PenguinArea {
    config: AreaConfig,
    penguin: EntityId,
    baby: EntityId,
    walls: [EntityId; 4],
    fish: Vec<Fish>,
    clock: f32,
}

impl PenguinArea {
    /// Validates `config` and spawns the walls, the penguin, and the baby.
    ///
    /// No fish exist until the first [`reset_area`](Self::reset_area).
    ///
    /// # Errors
    ///
    /// [`PenguinError::InvalidConfig`] from validation, or
    /// [`PenguinError::Scene`] if spawning fails.
    pub fn new(scene: &mut Scene, config: AreaConfig) -> Result<Self, PenguinError> {
        config.validate()?;
        let walls = spawn_walls(scene, &config)?;
        let home = Transform::from_position(config.center + Vector3::y() * config.spawn_height);
        let penguin = scene.spawn(
            EntityDesc::new(tags::PENGUIN)
                .with_transform(home)
                .with_collider(Collider::sphere(config.penguin_radius))
                .with_tag(tags::PENGUIN),
        )?;
        let baby = scene.spawn(
            EntityDesc::new(tags::BABY)
                .with_transform(home)
                .with_collider(Collider::sphere(config.baby_radius))
                .with_tag(tags::BABY),
        )?;
        scene.intern_tag(tags::FISH)?;
        debug!(%penguin, %baby, half_extent = config.half_extent, "penguin area built");
        Ok(Self {
            config,
            penguin,
            baby,
            walls,
            fish: Vec::new(),
            clock: 0.0,
        })
    }

    /// The area's layout.
    pub fn config(&self) -> &AreaConfig {
        &self.config
    }

    /// The penguin's entity.
    pub fn penguin(&self) -> EntityId {
        self.penguin
    }

    /// The baby's entity.
    pub fn baby(&self) -> EntityId {
        self.baby
    }

    /// The four wall entities: north, south, east, west.
    pub fn walls(&self) -> [EntityId; 4] {
        self.walls
    }

    /// Live fish, in spawn order.
    pub fn fish(&self) -> &[Fish] {
        &self.fish
    }

    /// Number of fish still in the area.
    pub fn fish_remaining(&self) -> usize {
        self.fish.len()
    }

    /// Returns `true` if `id` is one of this area's live fish.
    pub fn is_fish(&self, id: EntityId) -> bool {
        self.fish.iter().any(|f| f.entity() == id)
    }

    /// Centre lifted to spawn height; every placement is relative to it.
    fn spawn_center(&self) -> Point3<f32> {
        self.config.center + Vector3::y() * self.config.spawn_height
    }

    /// Starts a new episode: removes every fish, places the penguin and
    /// the baby, and spawns `fish_count` fish whose base speed is read
    /// from `params` under [`FISH_SPEED_PARAM`].
    ///
    /// # Errors
    ///
    /// [`PenguinError::Scene`] if an area entity is missing or a spawn fails.
    pub fn reset_area<R: Rng>(
        &mut self,
        scene: &mut Scene,
        rng: &mut R,
        params: &EnvironmentParameters,
    ) -> Result<(), PenguinError> {
        self.remove_all_fish(scene);
        self.place_penguin(scene, rng)?;
        self.place_baby(scene, rng)?;
        let fish_speed = params.get_with_default(FISH_SPEED_PARAM, DEFAULT_FISH_SPEED);
        self.spawn_fish(scene, rng, self.config.fish_count, fish_speed)?;
        debug!(fish = self.fish.len(), fish_speed, "area reset");
        Ok(())
    }

    /// Moves the penguin to a random point within [`Wedge::PENGUIN`]
    /// facing a random heading.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if the penguin was despawned.
    pub fn place_penguin<R: Rng>(&self, scene: &mut Scene, rng: &mut R) -> Result<(), SceneError> {
        let position = Wedge::PENGUIN.sample(rng, &self.spawn_center());
        let heading = rng.random_range(0.0..360.0);
        self.place(scene, self.penguin, Transform::from_yaw(position, heading))
    }

    /// Moves the baby to a random point within [`Wedge::BABY`], facing
    /// back toward the centre.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if the baby was despawned.
    pub fn place_baby<R: Rng>(&self, scene: &mut Scene, rng: &mut R) -> Result<(), SceneError> {
        let position = Wedge::BABY.sample(rng, &self.spawn_center());
        self.place(scene, self.baby, Transform::from_yaw(position, 180.0))
    }

    fn place(&self, scene: &mut Scene, id: EntityId, transform: Transform) -> Result<(), SceneError> {
        let scale = scene
            .transform(id)
            .ok_or(SceneError::UnknownEntity(id))?
            .scale;
        scene.set_transform(id, transform.with_scale(scale))
    }

    /// Spawns `count` fish within [`Wedge::FISH`], each with a random
    /// heading and base speed `fish_speed`.
    ///
    /// # Errors
    ///
    /// [`SceneError`] if a spawn fails; fish spawned before the failure
    /// remain.
    pub fn spawn_fish<R: Rng>(
        &mut self,
        scene: &mut Scene,
        rng: &mut R,
        count: usize,
        fish_speed: f32,
    ) -> Result<(), SceneError> {
        let center = self.spawn_center();
        for _ in 0..count {
            let position = Wedge::FISH.sample(rng, &center);
            let heading = rng.random_range(0.0..360.0);
            let id = scene.spawn(
                EntityDesc::new(tags::FISH)
                    .with_transform(Transform::from_yaw(position, heading))
                    .with_collider(Collider::sphere(self.config.fish_radius))
                    .with_tag(tags::FISH),
            )?;
            self.fish.push(Fish::new(id, fish_speed));
        }
        Ok(())
    }

    /// Removes one fish from the area and the scene.
    ///
    /// Returns `false` if `id` is not one of this area's fish.
    pub fn remove_specific_fish(&mut self, scene: &mut Scene, id: EntityId) -> bool {
        let Some(index) = self.fish.iter().position(|f| f.entity() == id) else {
            return false;
        };
        self.fish.remove(index);
        if scene.despawn(id).is_err() {
            warn!(fish = %id, "fish already missing from scene");
        }
        true
    }

    /// Removes every fish from the area and the scene.
    pub fn remove_all_fish(&mut self, scene: &mut Scene) {
        for fish in self.fish.drain(..) {
            if scene.despawn(fish.entity()).is_err() {
                warn!(fish = %fish.entity(), "fish already missing from scene");
            }
        }
    }

    /// Advances the area clock by `dt` and lets every fish swim.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if a fish entity was despawned
    /// behind the area's back.
    pub fn update_fish<R: Rng>(
        &mut self,
        scene: &mut Scene,
        rng: &mut R,
        dt: f32,
    ) -> Result<(), SceneError> {
        self.clock += dt;
        let center = self.spawn_center();
        for fish in &mut self.fish {
            fish.swim(scene, rng, &Wedge::FISH, &center, self.clock, dt)?;
        }
        Ok(())
    }
}

fn spawn_walls(scene: &mut Scene, config: &AreaConfig) -> Result<[EntityId; 4], SceneError> {
    let half_height = config.wall_height * 0.5;
    let half_thickness = config.wall_thickness * 0.5;
    let offset = config.half_extent + half_thickness;
    let span = config.half_extent + config.wall_thickness;
    let base = config.center + Vector3::y() * half_height;

    let along_x = Collider::cuboid(span, half_height, half_thickness);
    let along_z = Collider::cuboid(half_thickness, half_height, span);
    let layout = [
        ("north_wall", Vector3::new(0.0, 0.0, offset), along_x),
        ("south_wall", Vector3::new(0.0, 0.0, -offset), along_x),
        ("east_wall", Vector3::new(offset, 0.0, 0.0), along_z),
        ("west_wall", Vector3::new(-offset, 0.0, 0.0), along_z),
    ];
    let mut walls = [EntityId(0); 4];
    for (slot, (name, offset, collider)) in walls.iter_mut().zip(layout) {
        *slot = scene.spawn(
            EntityDesc::new(name)
                .with_transform(Transform::from_position(base + offset))
                .with_collider(collider)
                .with_layer(tags::WALL_LAYER)
                .with_tag(tags::WALL),
        )?;
    }
    Ok(walls)
}
