//! Ray perception configuration and its resolved form.
//!
//! [`RayPerceptionConfig`] is what a designer writes: tag names, angles,
//! lengths. [`RayPerceptionConfig::resolve`] validates it once and
//! produces [`RayPerceptionSettings`], which holds the precomputed
//! angle list and the detectable tags as [`TagId`]s.

use std::collections::HashSet;

use floe_core::{LayerMask, SensorError, TagId};
use floe_scene::TagRegistry;
use tracing::debug;

use crate::angles::ray_angles;

/// Plane the ray fan lies in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CastType {
    /// Fan in the agent's local XZ plane (ground plane), with optional
    /// vertical offsets at the start and end of each ray.
    #[default]
    Cast3D,
    /// Fan in the agent's local XY plane. Vertical offsets are ignored.
    Cast2D,
}

/// Designer-facing ray perception configuration.
///
/// # Examples
///
/// ```
/// use floe_perception::RayPerceptionConfig;
/// use floe_scene::TagRegistry;
///
/// let config = RayPerceptionConfig {
///     rays_per_direction: 3,
///     max_ray_degrees: 90.0,
///     detectable_tags: vec!["fish".into(), "baby".into(), "wall".into()],
///     ..Default::default()
/// };
/// let mut tags = TagRegistry::new();
/// let settings = config.resolve(&mut tags).unwrap();
/// assert_eq!(settings.num_rays(), 7);
/// assert_eq!(settings.observation_size(), 7 * (3 + 2));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RayPerceptionConfig {
    /// Rays on each side of the centre ray. Default: 3.
    pub rays_per_direction: u32,
    /// Angle between the centre ray and the outermost rays, in
    /// `[0, 180]` degrees. Default: 70.
    pub max_ray_degrees: f32,
    /// Unscaled ray length. Default: 20.
    pub ray_length: f32,
    /// Unscaled sphere-cast radius; `0` casts plain rays. Default: 0.5.
    pub sphere_cast_radius: f32,
    /// Ordered tag names; position `i` owns one-hot slot `i`.
    pub detectable_tags: Vec<String>,
    /// Layers the rays can hit. Default: [`LayerMask::DEFAULT`].
    pub layer_mask: LayerMask,
    /// Number of consecutive observations stacked together. Default: 1.
    pub observation_stacks: u32,
    /// Plane of the fan. Default: [`CastType::Cast3D`].
    pub cast_type: CastType,
    /// Local height of each ray's start (3D only). Default: 0.
    pub start_vertical_offset: f32,
    /// Local height of each ray's end (3D only). Default: 0.
    pub end_vertical_offset: f32,
}

impl Default for RayPerceptionConfig {
    fn default() -> Self {
        Self {
            rays_per_direction: 3,
            max_ray_degrees: 70.0,
            ray_length: 20.0,
            sphere_cast_radius: 0.5,
            detectable_tags: Vec::new(),
            layer_mask: LayerMask::DEFAULT,
            observation_stacks: 1,
            cast_type: CastType::Cast3D,
            start_vertical_offset: 0.0,
            end_vertical_offset: 0.0,
        }
    }
}

/// Largest accepted [`RayPerceptionConfig::rays_per_direction`].
pub const MAX_RAYS_PER_DIRECTION: u32 = 1024;

fn invalid(reason: String) -> SensorError {
    SensorError::InvalidConfig { reason }
}

impl RayPerceptionConfig {
    /// Checks structural invariants.
    ///
    /// Zero rays per direction and zero ray length are valid degenerate
    /// configurations.
    ///
    /// # Errors
    ///
    /// [`SensorError::InvalidConfig`] if `rays_per_direction` exceeds
    /// [`MAX_RAYS_PER_DIRECTION`], if an angle, length, radius, or
    /// offset is out of range or non-finite, if `observation_stacks` is
    /// zero, or if a tag name is empty or repeated.
    pub fn validate(&self) -> Result<(), SensorError> {
        if self.rays_per_direction > MAX_RAYS_PER_DIRECTION {
            return Err(invalid(format!(
                "rays_per_direction must be <= {MAX_RAYS_PER_DIRECTION}, got {}",
                self.rays_per_direction
            )));
        }
        if !self.max_ray_degrees.is_finite() || !(0.0..=180.0).contains(&self.max_ray_degrees) {
            return Err(invalid(format!(
                "max_ray_degrees must be in [0, 180], got {}",
                self.max_ray_degrees
            )));
        }
        if !self.ray_length.is_finite() || self.ray_length < 0.0 {
            return Err(invalid(format!(
                "ray_length must be finite and >= 0, got {}",
                self.ray_length
            )));
        }
        if !self.sphere_cast_radius.is_finite() || self.sphere_cast_radius < 0.0 {
            return Err(invalid(format!(
                "sphere_cast_radius must be finite and >= 0, got {}",
                self.sphere_cast_radius
            )));
        }
        if !self.start_vertical_offset.is_finite() || !self.end_vertical_offset.is_finite() {
            return Err(invalid("vertical offsets must be finite".into()));
        }
        if self.observation_stacks == 0 {
            return Err(invalid("observation_stacks must be >= 1".into()));
        }
        let mut seen = HashSet::with_capacity(self.detectable_tags.len());
        for tag in &self.detectable_tags {
            if tag.is_empty() {
                return Err(invalid("detectable tag names must be non-empty".into()));
            }
            if !seen.insert(tag.as_str()) {
                return Err(invalid(format!("duplicate detectable tag '{tag}'")));
            }
        }
        Ok(())
    }

    /// Validates and resolves tag names against `tags`, registering
    /// names the registry has not seen yet.
    ///
    /// # Errors
    ///
    /// Everything [`validate`](Self::validate) reports, plus
    /// [`SensorError::InvalidConfig`] if the registry is full.
    pub fn resolve(&self, tags: &mut TagRegistry) -> Result<RayPerceptionSettings, SensorError> {
        self.validate()?;
        let detectable_tags = self
            .detectable_tags
            .iter()
            .map(|name| {
                tags.intern(name)
                    .map_err(|e| invalid(format!("cannot register tag '{name}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let angles = ray_angles(self.rays_per_direction, self.max_ray_degrees);
        debug!(
            rays = angles.len(),
            tags = detectable_tags.len(),
            stacks = self.observation_stacks,
            "resolved ray perception config"
        );
        Ok(RayPerceptionSettings {
            angles,
            detectable_tags,
            ray_length: self.ray_length,
            cast_radius: self.sphere_cast_radius,
            layer_mask: self.layer_mask,
            stacks: self.observation_stacks as usize,
            cast_type: self.cast_type,
            start_offset: self.start_vertical_offset,
            end_offset: self.end_vertical_offset,
        })
    }
}

/// Validated, tag-resolved ray perception settings.
///
/// Immutable once built; every perception step reads from it.
#[derive(Clone, Debug, PartialEq)]
pub struct RayPerceptionSettings {
    pub(crate) angles: Vec<f32>,
    pub(crate) detectable_tags: Vec<TagId>,
    pub(crate) ray_length: f32,
    pub(crate) cast_radius: f32,
    pub(crate) layer_mask: LayerMask,
    pub(crate) stacks: usize,
    pub(crate) cast_type: CastType,
    pub(crate) start_offset: f32,
    pub(crate) end_offset: f32,
}

impl RayPerceptionSettings {
    /// Ray angles in degrees, in cast order.
    pub fn angles(&self) -> &[f32] {
        &self.angles
    }

    /// Detectable tags in slot order.
    pub fn detectable_tags(&self) -> &[TagId] {
        &self.detectable_tags
    }

    /// One-hot slot of `tag`, if detectable.
    pub fn tag_slot(&self, tag: TagId) -> Option<usize> {
        self.detectable_tags.iter().position(|&t| t == tag)
    }

    /// Number of rays in the fan.
    pub fn num_rays(&self) -> usize {
        self.angles.len()
    }

    /// Number of detectable tags.
    pub fn num_tags(&self) -> usize {
        self.detectable_tags.len()
    }

    /// Unscaled ray length.
    pub fn ray_length(&self) -> f32 {
        self.ray_length
    }

    /// Unscaled cast radius.
    pub fn cast_radius(&self) -> f32 {
        self.cast_radius
    }

    /// Layer mask applied to every ray.
    pub fn layer_mask(&self) -> LayerMask {
        self.layer_mask
    }

    /// Plane of the fan.
    pub fn cast_type(&self) -> CastType {
        self.cast_type
    }

    /// Number of stacked observations.
    pub fn stacks(&self) -> usize {
        self.stacks
    }

    /// Values written per ray: one per tag, the miss flag, the fraction.
    pub fn values_per_ray(&self) -> usize {
        self.num_tags() + 2
    }

    /// Length of one unstacked observation frame.
    pub fn frame_size(&self) -> usize {
        self.num_rays() * self.values_per_ray()
    }

    /// Length of the full (stacked) observation.
    pub fn observation_size(&self) -> usize {
        self.frame_size() * self.stacks
    }
}
