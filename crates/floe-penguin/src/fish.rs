//! Wandering fish.
//!
//! A fish picks a random target inside its swim region, turns toward it,
//! and swims there at a randomized fraction of its base speed. On arrival
//! it picks a new target. A fish with zero speed stays put.

use floe_core::{EntityId, SceneError};
use floe_scene::Scene;
use nalgebra::Point3;
use rand::Rng;

use crate::area::Wedge;

/// Per-fish swimming state. The entity itself lives in the [`Scene`].
#[derive(Clone, Debug, PartialEq)]
pub struct Fish {
    entity: EntityId,
    speed: f32,
    randomized_speed: f32,
    target: Point3<f32>,
    next_action_time: f32,
}

impl Fish {
    /// Swimming state for `entity` with base `speed` (units per second).
    ///
    /// The first call to [`swim`](Self::swim) picks a target.
    pub fn new(entity: EntityId, speed: f32) -> Self {
        Self {
            entity,
            speed,
            randomized_speed: 0.0,
            target: Point3::origin(),
            next_action_time: 0.0,
        }
    }

    /// The fish's entity.
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Base swim speed.
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current swim target.
    pub fn target(&self) -> Point3<f32> {
        self.target
    }

    /// Advances the fish by `dt` seconds at area time `now`.
    ///
    /// When it is time to act the fish draws a speed in
    /// `[0.5, 1.5) * speed`, samples a target from `region` around
    /// `center`, and faces it. Otherwise it moves forward, snapping onto
    /// the target instead of overshooting it.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if the fish's entity is gone.
    pub fn swim<R: Rng>(
        &mut self,
        scene: &mut Scene,
        rng: &mut R,
        region: &Wedge,
        center: &Point3<f32>,
        now: f32,
        dt: f32,
    ) -> Result<(), SceneError> {
        if self.speed <= 0.0 {
            return Ok(());
        }
        let transform = scene
            .transform_mut(self.entity)
            .ok_or(SceneError::UnknownEntity(self.entity))?;

        if now >= self.next_action_time {
            self.randomized_speed = self.speed * rng.random_range(0.5..1.5);
            self.target = region.sample(rng, center);
            transform.look_at(&self.target);
            let distance = (self.target - transform.position).norm();
            self.next_action_time = now + distance / self.randomized_speed;
        } else {
            let step = self.randomized_speed * dt;
            let remaining = (self.target - transform.position).norm();
            if step <= remaining {
                transform.position += transform.forward() * step;
            } else {
                transform.position = self.target;
                self.next_action_time = now;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floe_core::Transform;
    use floe_scene::{Collider, EntityDesc};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn spawn_fish(scene: &mut Scene) -> EntityId {
        scene
            .spawn(
                EntityDesc::new("fish")
                    .with_transform(Transform::from_position(Point3::new(0.0, 0.5, -5.0)))
                    .with_collider(Collider::sphere(0.3)),
            )
            .unwrap()
    }

    #[test]
    fn static_fish_never_moves() {
        let mut scene = Scene::new();
        let id = spawn_fish(&mut scene);
        let before = *scene.transform(id).unwrap();
        let mut fish = Fish::new(id, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let center = Point3::new(0.0, 0.5, 0.0);
        for i in 0..50 {
            fish.swim(&mut scene, &mut rng, &Wedge::FISH, &center, i as f32 * 0.1, 0.1)
                .unwrap();
        }
        assert_eq!(*scene.transform(id).unwrap(), before);
    }

    #[test]
    fn swimming_fish_approaches_and_reaches_target() {
        let mut scene = Scene::new();
        let id = spawn_fish(&mut scene);
        let mut fish = Fish::new(id, 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let center = Point3::new(0.0, 0.5, 0.0);

        fish.swim(&mut scene, &mut rng, &Wedge::FISH, &center, 0.0, 0.1)
            .unwrap();
        let target = fish.target();
        assert!(Wedge::FISH.contains(&center, &target));
        let start = (target - scene.transform(id).unwrap().position).norm();

        fish.swim(&mut scene, &mut rng, &Wedge::FISH, &center, 0.0, 0.1)
            .unwrap();
        let after = (target - scene.transform(id).unwrap().position).norm();
        assert!(after < start || start == 0.0);

        // Far more time than the slowest speed needs to cover 26 units.
        let mut now = 0.0;
        while now < 40.0 && fish.target() == target {
            now += 0.1;
            fish.swim(&mut scene, &mut rng, &Wedge::FISH, &center, now, 0.1)
                .unwrap();
            if (scene.transform(id).unwrap().position - target).norm() < 1e-4 {
                break;
            }
        }
        assert!((scene.transform(id).unwrap().position - target).norm() < 1e-3);
    }

    #[test]
    fn missing_entity_is_reported() {
        let mut scene = Scene::new();
        let mut fish = Fish::new(EntityId(99), 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(
            fish.swim(
                &mut scene,
                &mut rng,
                &Wedge::FISH,
                &Point3::origin(),
                0.0,
                0.1
            ),
            Err(SceneError::UnknownEntity(EntityId(99)))
        );
    }
}
