//! The ray perception sensor.
//!
//! Ties resolved settings, the caster, the encoder, and stacking
//! together behind the per-step `write` an agent calls while collecting
//! observations.

use floe_core::{EntityId, PhysicsQuery, SensorError, Transform};
use floe_scene::TagRegistry;

use crate::caster::perceive;
use crate::config::{RayPerceptionConfig, RayPerceptionSettings};
use crate::output::RayPerceptionOutput;
use crate::stacking::StackedObservations;

/// A ray perception sensor attached to one agent.
///
/// # Examples
///
/// ```
/// use floe_core::Transform;
/// use floe_perception::{RayPerceptionConfig, RayPerceptionSensor};
/// use floe_scene::Scene;
///
/// let mut scene = Scene::new();
/// let config = RayPerceptionConfig {
///     rays_per_direction: 3,
///     detectable_tags: vec!["fish".into(), "wall".into()],
///     ..Default::default()
/// };
/// let mut sensor = RayPerceptionSensor::new("eyes", &config, scene.tags_mut()).unwrap();
/// assert_eq!(sensor.observation_shape(), [7 * 4]);
///
/// let mut obs = vec![0.0; 28];
/// let written = sensor.write(&scene, &Transform::identity(), None, &mut obs, 0).unwrap();
/// assert_eq!(written, 28);
/// ```
#[derive(Clone, Debug)]
pub struct RayPerceptionSensor {
    name: String,
    settings: RayPerceptionSettings,
    frame: Vec<f32>,
    stack: StackedObservations,
    last_output: Option<RayPerceptionOutput>,
}

impl RayPerceptionSensor {
    /// Builds a sensor, resolving `config`'s tags against `tags`.
    ///
    /// # Errors
    ///
    /// Whatever [`RayPerceptionConfig::resolve`] reports.
    pub fn new(
        name: impl Into<String>,
        config: &RayPerceptionConfig,
        tags: &mut TagRegistry,
    ) -> Result<Self, SensorError> {
        Ok(Self::from_settings(name, config.resolve(tags)?))
    }

    /// Builds a sensor from already-resolved settings.
    pub fn from_settings(name: impl Into<String>, settings: RayPerceptionSettings) -> Self {
        let frame_len = settings.frame_size();
        Self {
            name: name.into(),
            stack: StackedObservations::new(frame_len, settings.stacks()),
            frame: vec![0.0; frame_len],
            settings,
            last_output: None,
        }
    }

    /// Sensor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved settings.
    pub fn settings(&self) -> &RayPerceptionSettings {
        &self.settings
    }

    /// Declared observation shape: `[num_rays * (num_tags + 2) * stacks]`.
    pub fn observation_shape(&self) -> [usize; 1] {
        [self.settings.observation_size()]
    }

    /// Casts the fan from `transform` and returns the raw results
    /// without touching the observation history.
    pub fn perceive(
        &self,
        physics: &dyn PhysicsQuery,
        transform: &Transform,
        exclude: Option<EntityId>,
    ) -> RayPerceptionOutput {
        perceive(&self.settings, transform, exclude, physics)
    }

    /// Casts the fan, pushes the encoded frame onto the stack, and writes
    /// the stacked observation into `buffer[offset..]`.
    ///
    /// Returns the number of values written, which always equals
    /// `observation_shape()[0]`.
    ///
    /// # Errors
    ///
    /// - [`SensorError::BufferTooSmall`] if the observation does not fit.
    /// - [`SensorError::ShapeMismatch`] if the written length disagrees
    ///   with the declared shape.
    pub fn write(
        &mut self,
        physics: &dyn PhysicsQuery,
        transform: &Transform,
        exclude: Option<EntityId>,
        buffer: &mut [f32],
        offset: usize,
    ) -> Result<usize, SensorError> {
        let expected = self.observation_shape()[0];
        let required = offset + expected;
        if buffer.len() < required {
            return Err(SensorError::BufferTooSmall {
                required,
                available: buffer.len(),
            });
        }

        let output = perceive(&self.settings, transform, exclude, physics);
        let frame_written = output.write_to(&mut self.frame, 0)?;
        if frame_written != self.frame.len() {
            return Err(SensorError::ShapeMismatch {
                expected: self.frame.len(),
                written: frame_written,
            });
        }
        self.stack.push(&self.frame)?;
        let written = self.stack.write_to(buffer, offset)?;
        if written != expected {
            return Err(SensorError::ShapeMismatch { expected, written });
        }
        self.last_output = Some(output);
        Ok(written)
    }

    /// Results of the most recent [`write`](Self::write), for debug drawing.
    pub fn last_output(&self) -> Option<&RayPerceptionOutput> {
        self.last_output.as_ref()
    }

    /// Clears stacked history and the cached output. Call at episode start.
    pub fn reset(&mut self) {
        self.stack.reset();
        self.frame.fill(0.0);
        self.last_output = None;
    }
}
