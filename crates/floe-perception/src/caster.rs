//! Casting the ray fan and classifying hits.
//!
//! Each ray is built in the agent's local frame and mapped into the
//! world through its [`Transform`], so scaling the agent scales the
//! effective ray length and cast radius with it. The nearest unfiltered
//! hit governs each ray's result.

use floe_core::{CastQuery, EntityId, PhysicsQuery, Transform};
use nalgebra::{Point3, Vector3};

use crate::config::{CastType, RayPerceptionSettings};
use crate::output::{RayOutput, RayPerceptionOutput};

/// Local-frame point at `radius` along `angle_degrees` in the ground
/// plane; 90 degrees is `+Z`.
fn polar_3d(radius: f32, angle_degrees: f32) -> Vector3<f32> {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    Vector3::new(radius * cos, 0.0, radius * sin)
}

/// Local-frame point at `radius` along `angle_degrees` in the XY plane;
/// 90 degrees is `+Y`.
fn polar_2d(radius: f32, angle_degrees: f32) -> Vector3<f32> {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    Vector3::new(radius * cos, radius * sin, 0.0)
}

/// Casts a single ray at `angle_degrees` and classifies the result.
///
/// `exclude` is typically the agent's own entity, whose collider would
/// otherwise shadow every ray. A ray whose effective length is zero
/// reports a miss.
pub fn perceive_ray(
    settings: &RayPerceptionSettings,
    angle_degrees: f32,
    transform: &Transform,
    exclude: Option<EntityId>,
    physics: &dyn PhysicsQuery,
) -> RayOutput {
    let (start_local, end_local) = match settings.cast_type {
        CastType::Cast3D => (
            Point3::new(0.0, settings.start_offset, 0.0),
            Point3::from(
                polar_3d(settings.ray_length, angle_degrees)
                    + Vector3::new(0.0, settings.end_offset, 0.0),
            ),
        ),
        CastType::Cast2D => (
            Point3::origin(),
            Point3::from(polar_2d(settings.ray_length, angle_degrees)),
        ),
    };
    let start = transform.transform_point(&start_local);
    let end = transform.transform_point(&end_local);
    let delta = end - start;
    let scaled_length = delta.norm();
    // The radius scales with the transform only, so divide by the local
    // length, which includes any vertical offsets.
    let unscaled_length = (end_local - start_local).norm();
    let scaled_radius = if unscaled_length > 0.0 {
        settings.cast_radius * scaled_length / unscaled_length
    } else {
        settings.cast_radius * transform.max_scale()
    };

    let Some(mut query) = CastQuery::ray(start, delta, scaled_length) else {
        return RayOutput::miss(start, end, scaled_length, scaled_radius);
    };
    query = query
        .with_radius(scaled_radius)
        .with_layer_mask(settings.layer_mask);
    if let Some(id) = exclude {
        query = query.excluding(id);
    }

    match physics.cast(&query) {
        None => RayOutput::miss(start, end, scaled_length, scaled_radius),
        Some(hit) => RayOutput {
            has_hit: true,
            hit_tag_index: hit.tag.and_then(|t| settings.tag_slot(t)),
            hit_fraction: (hit.distance / scaled_length).clamp(0.0, 1.0),
            hit_entity: Some(hit.entity),
            start,
            end,
            scaled_ray_length: scaled_length,
            scaled_cast_radius: scaled_radius,
        },
    }
}

/// Casts the whole fan described by `settings` from `transform`.
///
/// # Examples
///
/// ```
/// use floe_core::Transform;
/// use floe_perception::{perceive, RayPerceptionConfig};
/// use floe_scene::Scene;
///
/// let mut scene = Scene::new();
/// let settings = RayPerceptionConfig {
///     rays_per_direction: 1,
///     detectable_tags: vec!["fish".into()],
///     ..Default::default()
/// }
/// .resolve(scene.tags_mut())
/// .unwrap();
///
/// let out = perceive(&settings, &Transform::identity(), None, &scene);
/// assert_eq!(out.rays.len(), 3);
/// assert!(out.rays.iter().all(|r| !r.has_hit && r.hit_fraction == 1.0));
/// ```
pub fn perceive(
    settings: &RayPerceptionSettings,
    transform: &Transform,
    exclude: Option<EntityId>,
    physics: &dyn PhysicsQuery,
) -> RayPerceptionOutput {
    let rays = settings
        .angles
        .iter()
        .map(|&angle| perceive_ray(settings, angle, transform, exclude, physics))
        .collect();
    RayPerceptionOutput {
        rays,
        num_tags: settings.num_tags(),
    }
}
