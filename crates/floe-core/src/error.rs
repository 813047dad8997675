//! Error types shared across the Floe workspace.
//!
//! Organized by subsystem: perception (sensor configuration and
//! observation writing) and scene (entity bookkeeping).

use std::error::Error;
use std::fmt;

use crate::id::EntityId;

/// Errors from ray perception configuration and observation writing.
///
/// Degenerate but well-defined configurations (zero rays per direction,
/// zero ray length) are not errors. Only malformed configurations and
/// buffer contract violations are reported here.
#[derive(Clone, Debug, PartialEq)]
pub enum SensorError {
    /// The target buffer cannot hold the observation at the requested offset.
    BufferTooSmall {
        /// Elements the write needs, counted from the buffer start.
        required: usize,
        /// Actual buffer length.
        available: usize,
    },
    /// A write produced a different number of elements than the
    /// sensor's declared observation shape.
    ShapeMismatch {
        /// Elements the declared shape promises.
        expected: usize,
        /// Elements actually written.
        written: usize,
    },
    /// Malformed sensor configuration.
    InvalidConfig {
        /// Description of the configuration issue.
        reason: String,
    },
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall {
                required,
                available,
            } => write!(f, "observation buffer too small: {available} < {required}"),
            Self::ShapeMismatch { expected, written } => write!(
                f,
                "observation shape mismatch: declared {expected}, wrote {written}"
            ),
            Self::InvalidConfig { reason } => write!(f, "invalid sensor config: {reason}"),
        }
    }
}

impl Error for SensorError {}

/// Errors from scene bookkeeping: spawning, despawning, tagging.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneError {
    /// The entity does not exist (never spawned, or already despawned).
    UnknownEntity(EntityId),
    /// A collider has a negative, NaN, or infinite dimension.
    InvalidCollider {
        /// Description of the offending dimension.
        reason: String,
    },
    /// A layer index outside `0..32`.
    InvalidLayer(u8),
    /// More distinct tag names than `TagId` can represent.
    TagRegistryFull,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity(id) => write!(f, "unknown entity {id}"),
            Self::InvalidCollider { reason } => write!(f, "invalid collider: {reason}"),
            Self::InvalidLayer(layer) => write!(f, "layer {layer} out of range 0..32"),
            Self::TagRegistryFull => write!(f, "tag registry is full"),
        }
    }
}

impl Error for SceneError {}
