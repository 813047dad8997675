//! Reusable scene fixtures.
//!
//! Helpers that spawn common targets into a [`Scene`] with one call:
//!
//! - [`sphere_at`]: tagged or untagged sphere collider.
//! - [`cube_at`]: axis-aligned cube collider.
//! - [`agent_at`]: collider-less observer transform.

use floe_core::{EntityId, Transform};
use floe_scene::{Collider, EntityDesc, Scene};
use nalgebra::Point3;

/// Spawns a sphere of `radius` at `position` on `layer`, optionally tagged.
///
/// # Panics
///
/// If the scene rejects the entity (invalid radius or layer).
pub fn sphere_at(
    scene: &mut Scene,
    position: Point3<f32>,
    radius: f32,
    layer: u8,
    tag: Option<&str>,
) -> EntityId {
    let mut desc = EntityDesc::new(tag.unwrap_or("sphere"))
        .with_transform(Transform::from_position(position))
        .with_collider(Collider::sphere(radius))
        .with_layer(layer);
    if let Some(tag) = tag {
        desc = desc.with_tag(tag);
    }
    scene.spawn(desc).expect("fixture sphere must be valid")
}

/// Spawns an axis-aligned cube with half size `half` at `position`.
///
/// # Panics
///
/// If the scene rejects the entity.
pub fn cube_at(scene: &mut Scene, position: Point3<f32>, half: f32, tag: Option<&str>) -> EntityId {
    let mut desc = EntityDesc::new(tag.unwrap_or("cube"))
        .with_transform(Transform::from_position(position))
        .with_collider(Collider::cuboid(half, half, half));
    if let Some(tag) = tag {
        desc = desc.with_tag(tag);
    }
    scene.spawn(desc).expect("fixture cube must be valid")
}

/// Spawns a collider-less entity carrying `transform`, standing in for
/// an observing agent.
///
/// # Panics
///
/// If the scene rejects the entity.
pub fn agent_at(scene: &mut Scene, transform: Transform) -> EntityId {
    scene
        .spawn(EntityDesc::new("agent").with_transform(transform))
        .expect("fixture agent must be valid")
}
