//! Core types and traits for the Floe perception simulation.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the abstractions shared across the workspace: entity and tag IDs,
//! layer masks, transforms, the physics query trait, error types, and
//! environment parameters.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod params;
pub mod physics;
pub mod transform;

pub use error::{SceneError, SensorError};
pub use id::{EntityId, LayerMask, TagId};
pub use params::EnvironmentParameters;
pub use physics::{CastHit, CastQuery, PhysicsQuery};
pub use transform::Transform;
