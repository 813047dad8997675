//! Episode loop for the Floe penguin scenario.
//!
//! [`LockstepEnv`] owns one scene with one penguin area and its agent,
//! and exposes the reset/step interface a trainer drives: each
//! [`step`](LockstepEnv::step) repeats one decision over a fixed number
//! of physics substeps and returns the new observation, the reward, and
//! whether the episode terminated or was truncated.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod lockstep;
pub mod metrics;

pub use config::{ConfigError, EnvConfig};
pub use lockstep::{EnvError, LockstepEnv, StepResult};
pub use metrics::StepMetrics;
