//! Ray perception sensors and observation encoding for Floe agents.
//!
//! A ray perception sensor casts a symmetric fan of rays (or swept
//! spheres) from an agent, classifies each nearest hit against an
//! ordered list of detectable tags, and encodes the results into a flat
//! `f32` observation buffer.
//!
//! # Observation layout
//!
//! Rays are written in [`ray_angles`] order. Each ray contributes
//! `num_tags + 2` values:
//!
//! | Slots | Meaning |
//! |-------|---------|
//! | `0..num_tags` | one-hot tag of the hit object (all zero on a miss or an untagged hit) |
//! | `num_tags` | `1.0` if the ray hit nothing, else `0.0` |
//! | `num_tags + 1` | hit fraction: distance / ray length, `1.0` on a miss |
//!
//! With observation stacking, the most recent `stacks` frames are
//! concatenated oldest first.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod angles;
pub mod caster;
pub mod config;
pub mod output;
pub mod sensor;
pub mod stacking;

pub use angles::ray_angles;
pub use caster::{perceive, perceive_ray};
pub use config::{CastType, RayPerceptionConfig, RayPerceptionSettings, MAX_RAYS_PER_DIRECTION};
pub use output::{encode, RayOutput, RayPerceptionOutput};
pub use sensor::RayPerceptionSensor;
pub use stacking::StackedObservations;
