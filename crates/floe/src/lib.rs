//! Floe: a headless penguin-feeding scenario for reinforcement learning,
//! built around a ray perception sensor.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Floe sub-crates. For most users, adding `floe` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use floe::prelude::*;
//!
//! let config = EnvConfig {
//!     seed: 42,
//!     ..Default::default()
//! };
//! let mut env = LockstepEnv::new(config).unwrap();
//! env.reset().unwrap();
//!
//! let swim = PenguinAction { forward: true, turn: Turn::None };
//! let result = env.step(swim).unwrap();
//! assert_eq!(result.observation.len(), env.observation_size());
//! ```
//!
//! The sensor works on any [`PhysicsQuery`](prelude::PhysicsQuery), not
//! just the penguin scene:
//!
//! ```rust
//! use floe::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut scene = Scene::new();
//! scene
//!     .spawn(
//!         EntityDesc::new("rock")
//!             .with_transform(Transform::from_position(Point3::new(0.0, 0.0, 5.0)))
//!             .with_collider(Collider::sphere(1.0))
//!             .with_tag("rock"),
//!     )
//!     .unwrap();
//!
//! let config = RayPerceptionConfig {
//!     rays_per_direction: 0,
//!     ray_length: 10.0,
//!     sphere_cast_radius: 0.0,
//!     detectable_tags: vec!["rock".into()],
//!     ..Default::default()
//! };
//! let mut sensor = RayPerceptionSensor::new("eyes", &config, scene.tags_mut()).unwrap();
//! let mut obs = [0.0; 3];
//! sensor.write(&scene, &Transform::identity(), None, &mut obs, 0).unwrap();
//! assert_eq!(obs[..2], [1.0, 0.0]);
//! assert!((obs[2] - 0.4).abs() < 1e-4);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `floe-core` | IDs, transforms, the physics query seam, errors, parameters |
//! | [`scene`] | `floe-scene` | Entity store, colliders, ray and sphere casts |
//! | [`perception`] | `floe-perception` | Ray angles, caster, encoder, stacking, sensor |
//! | [`penguin`] | `floe-penguin` | Area reset, fish, the penguin agent |
//! | [`engine`] | `floe-engine` | Lockstep episode loop |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`floe-core`).
pub use floe_core as types;

/// Entity store and spatial queries (`floe-scene`).
pub use floe_scene as scene;

/// Ray perception sensors (`floe-perception`).
///
/// [`perception::RayPerceptionSensor`] is the usual entry point;
/// [`perception::perceive`] and [`perception::encode`] expose the
/// underlying steps.
pub use floe_perception as perception;

/// The penguin feeding scenario (`floe-penguin`).
pub use floe_penguin as penguin;

/// Episode loop (`floe-engine`).
pub use floe_engine as engine;

/// Common imports for typical Floe usage.
///
/// ```rust
/// use floe::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use floe_core::{
        CastHit, CastQuery, EntityId, EnvironmentParameters, LayerMask, PhysicsQuery, TagId,
        Transform,
    };

    // Errors
    pub use floe_core::{SceneError, SensorError};

    // Scene
    pub use floe_scene::{Collider, EntityDesc, Scene, TagRegistry};

    // Perception
    pub use floe_perception::{
        CastType, RayPerceptionConfig, RayPerceptionOutput, RayPerceptionSensor,
    };

    // Scenario
    pub use floe_penguin::{
        AreaConfig, PenguinAction, PenguinAgent, PenguinArea, PenguinConfig, PenguinError, Turn,
    };

    // Engine
    pub use floe_engine::{ConfigError, EnvConfig, EnvError, LockstepEnv, StepMetrics, StepResult};
}
