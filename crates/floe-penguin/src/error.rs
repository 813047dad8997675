//! Errors raised while building or running a penguin area.

use std::error::Error;
use std::fmt;

use floe_core::{SceneError, SensorError};

/// Errors from area construction, resets, and agent updates.
#[derive(Clone, Debug, PartialEq)]
pub enum PenguinError {
    /// An area or agent configuration failed validation.
    InvalidConfig {
        /// Description of the configuration issue.
        reason: String,
    },
    /// A scene operation failed.
    Scene(SceneError),
    /// The agent's sensor failed to build or write.
    Sensor(SensorError),
}

impl fmt::Display for PenguinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid penguin config: {reason}"),
            Self::Scene(e) => write!(f, "scene: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
        }
    }
}

impl Error for PenguinError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Scene(e) => Some(e),
            Self::Sensor(e) => Some(e),
            Self::InvalidConfig { .. } => None,
        }
    }
}

impl From<SceneError> for PenguinError {
    fn from(e: SceneError) -> Self {
        Self::Scene(e)
    }
}

impl From<SensorError> for PenguinError {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}
