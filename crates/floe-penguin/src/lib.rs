//! The penguin feeding scenario.
//!
//! A penguin swims around a walled area catching fish and carrying them
//! back to its baby. This crate holds the pieces that live inside one
//! area:
//!
//! - [`PenguinArea`]: owns the area's entities and resets them between
//!   episodes (penguin and baby placement, fish spawning in a
//!   donut-wedge behind the baby).
//! - [`Fish`]: a fish that wanders between random targets.
//! - [`PenguinAgent`]: turns discrete actions into movement, eats and
//!   feeds on contact, accumulates reward, and writes its observation.
//!
//! The episode loop that drives these lives in `floe-engine`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod area;
pub mod error;
pub mod fish;
pub mod tags;

pub use agent::{
    PenguinAction, PenguinAgent, PenguinConfig, Turn, ACTION_BRANCHES, FEED_RADIUS_PARAM,
    VECTOR_OBSERVATIONS,
};
pub use area::{
    choose_random_position, AreaConfig, PenguinArea, Wedge, DEFAULT_FISH_SPEED, FISH_SPEED_PARAM,
};
pub use error::PenguinError;
pub use fish::Fish;
