//! Benchmark profiles and utilities for the Floe perception simulation.
//!
//! Provides pre-built configurations and scenes for benchmarks and examples:
//!
//! - [`reference_profile`]: the default penguin environment
//! - [`wide_sensor_profile`]: 41 rays with three stacked frames
//! - [`cluttered_scene`]: many tagged spheres around an observer
//! - [`scripted_action`]: deterministic action sequence

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use floe_core::Transform;
use floe_engine::EnvConfig;
use floe_penguin::{PenguinAction, Turn};
use floe_scene::{Collider, EntityDesc, Scene};
use nalgebra::Point3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Tags cycled through by [`cluttered_scene`].
pub const CLUTTER_TAGS: [&str; 3] = ["fish", "baby", "wall"];

/// The default penguin environment with `seed`.
pub fn reference_profile(seed: u64) -> EnvConfig {
    EnvConfig {
        seed,
        ..Default::default()
    }
}

/// Same scenario with a dense sensor: 20 rays per side over 90 degrees
/// and three stacked observations.
pub fn wide_sensor_profile(seed: u64) -> EnvConfig {
    let mut config = reference_profile(seed);
    config.penguin.sensor.rays_per_direction = 20;
    config.penguin.sensor.max_ray_degrees = 90.0;
    config.penguin.sensor.observation_stacks = 3;
    config
}

/// Builds a scene with `n` spheres scattered within 20 units of the
/// origin, tags cycling through [`CLUTTER_TAGS`], and returns it with an
/// observer transform at the origin.
///
pub fn cluttered_scene(seed: u64, n: usize) -> (Scene, Transform) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut scene = Scene::new();
    for i in 0..n {
        let position = Point3::new(
            rng.random_range(-20.0..20.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-20.0..20.0),
        );
        let radius = rng.random_range(0.2..1.0);
        let tag = CLUTTER_TAGS[i % CLUTTER_TAGS.len()];
        scene
            .spawn(
                EntityDesc::new(tag)
                    .with_transform(Transform::from_position(position))
                    .with_collider(Collider::sphere(radius))
                    .with_tag(tag),
            )
            .expect("benchmark sphere is valid");
    }
    (scene, Transform::identity())
}

/// Deterministic action for decision `step`: mostly forward, turning in
/// bursts so the penguin sweeps the area.
pub fn scripted_action(step: usize) -> PenguinAction {
    let turn = match step % 12 {
        0..=2 => Turn::Left,
        6 | 7 => Turn::Right,
        _ => Turn::None,
    };
    PenguinAction {
        forward: step % 5 != 4,
        turn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        reference_profile(42).validate().unwrap();
        wide_sensor_profile(42).validate().unwrap();
    }

    #[test]
    fn cluttered_scene_has_requested_entities() {
        let (scene, _) = cluttered_scene(1, 30);
        assert_eq!(scene.len(), 30);
        assert_eq!(scene.tags().len(), 3);
    }

    #[test]
    fn scripted_actions_cover_every_turn() {
        let actions: Vec<_> = (0..12).map(scripted_action).collect();
        assert!(actions.iter().any(|a| a.turn == Turn::Left));
        assert!(actions.iter().any(|a| a.turn == Turn::Right));
        assert!(actions.iter().any(|a| !a.forward));
    }
}
