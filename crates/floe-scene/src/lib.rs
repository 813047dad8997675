//! Entity store, colliders, and spatial queries for Floe simulations.
//!
//! [`Scene`] is the explicit simulation context that stands in for a
//! host engine's scene graph and physics world. It owns entities
//! (transform, optional collider, layer, tag), interns tag names into
//! [`TagId`](floe_core::TagId)s, and answers the nearest-hit casts and
//! overlap tests of [`PhysicsQuery`](floe_core::PhysicsQuery).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod collider;
pub mod scene;
pub mod tags;

pub use collider::Collider;
pub use scene::{EntityDesc, Scene};
pub use tags::TagRegistry;
