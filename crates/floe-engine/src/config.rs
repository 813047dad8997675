//! Environment configuration and validation.

use std::error::Error;
use std::fmt;

use floe_core::EnvironmentParameters;
use floe_penguin::{AreaConfig, PenguinConfig, PenguinError};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EnvConfig::validate()`] or while building
/// the environment.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// `dt` is NaN, infinite, zero, or negative.
    InvalidDt {
        /// The invalid value.
        value: f32,
    },
    /// `decision_period` is zero.
    DecisionPeriodZero,
    /// An environment parameter is not finite.
    InvalidParameter {
        /// Parameter name.
        key: String,
        /// The invalid value.
        value: f32,
    },
    /// The area or agent configuration is invalid, or building them failed.
    Scenario(PenguinError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDt { value } => {
                write!(f, "dt must be finite and positive, got {value}")
            }
            Self::DecisionPeriodZero => write!(f, "decision_period must be at least 1"),
            Self::InvalidParameter { key, value } => {
                write!(f, "parameter {key:?} must be finite, got {value}")
            }
            Self::Scenario(e) => write!(f, "scenario: {e}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Scenario(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PenguinError> for ConfigError {
    fn from(e: PenguinError) -> Self {
        Self::Scenario(e)
    }
}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Complete configuration for a [`LockstepEnv`](crate::LockstepEnv).
///
/// # Examples
///
/// ```
/// use floe_engine::EnvConfig;
///
/// let config = EnvConfig {
///     seed: 7,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EnvConfig {
    /// RNG seed for placement and fish behaviour.
    pub seed: u64,
    /// Fixed substep length in seconds. Default: 0.02.
    pub dt: f32,
    /// Substeps each decision is repeated for. Default: 5.
    pub decision_period: u32,
    /// Area layout.
    pub area: AreaConfig,
    /// Agent tuning and sensor layout.
    pub penguin: PenguinConfig,
    /// Parameters read at every episode start (`fish_speed`,
    /// `feed_radius`).
    pub parameters: EnvironmentParameters,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            dt: 0.02,
            decision_period: 5,
            area: AreaConfig::default(),
            penguin: PenguinConfig::default(),
            parameters: EnvironmentParameters::new(),
        }
    }
}

impl EnvConfig {
    /// Validate all structural invariants.
    ///
    /// # Errors
    ///
    /// The first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidDt { value: self.dt });
        }
        if self.decision_period == 0 {
            return Err(ConfigError::DecisionPeriodZero);
        }
        for key in self.parameters.keys() {
            let value = self.parameters.get_with_default(key, 0.0);
            if !value.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    key: key.to_string(),
                    value,
                });
            }
        }
        self.area.validate()?;
        self.penguin.validate()?;
        Ok(())
    }
}
