//! Collider shapes and their cast/overlap tests.
//!
//! Shapes are defined in the entity's local frame and placed in the
//! world by its [`Transform`]. Spheres scale by the transform's largest
//! scale component; boxes scale per axis and rotate with the entity.
//!
//! Sphere casts against boxes test the ray against the box grown by the
//! cast radius on every face. This is exact on faces and edges-on, and
//! slightly conservative near corners.

use floe_core::{SceneError, Transform};
use nalgebra::{Point3, Vector3};

/// Collision shape attached to an entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    /// Sphere centred on the entity position.
    Sphere {
        /// Radius in local units.
        radius: f32,
    },
    /// Oriented box centred on the entity position.
    Box {
        /// Half size along each local axis.
        half_extents: Vector3<f32>,
    },
}

/// Contact found by [`Collider::cast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ShapeHit {
    pub distance: f32,
    pub point: Point3<f32>,
}

impl Collider {
    /// Sphere of `radius`.
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Box with the given half extents.
    pub fn cuboid(hx: f32, hy: f32, hz: f32) -> Self {
        Self::Box {
            half_extents: Vector3::new(hx, hy, hz),
        }
    }

    /// Checks that every dimension is finite and non-negative.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidCollider`] naming the offending dimension.
    pub fn validate(&self) -> Result<(), SceneError> {
        match self {
            Self::Sphere { radius } => {
                if !radius.is_finite() || *radius < 0.0 {
                    return Err(SceneError::InvalidCollider {
                        reason: format!("sphere radius must be finite and >= 0, got {radius}"),
                    });
                }
            }
            Self::Box { half_extents } => {
                if half_extents.iter().any(|h| !h.is_finite() || *h < 0.0) {
                    return Err(SceneError::InvalidCollider {
                        reason: format!(
                            "box half extents must be finite and >= 0, got {:?}",
                            half_extents.as_slice()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Sweeps a sphere of `radius` (zero for a ray) from `origin` along
    /// unit `dir` for up to `max_distance` and returns the first contact.
    ///
    /// Returns `None` if the shape already contains or overlaps the
    /// origin, lies behind it, or is out of reach.
    pub(crate) fn cast(
        &self,
        pose: &Transform,
        origin: &Point3<f32>,
        dir: &Vector3<f32>,
        max_distance: f32,
        radius: f32,
    ) -> Option<ShapeHit> {
        match self {
            Self::Sphere { radius: r } => {
                let world_r = r * pose.max_scale();
                let reach = world_r + radius;
                let oc = origin - pose.position;
                let b = oc.dot(dir);
                let c = oc.norm_squared() - reach * reach;
                if c <= 0.0 {
                    return None;
                }
                let disc = b * b - c;
                if disc < 0.0 {
                    return None;
                }
                let t = -b - disc.sqrt();
                if t < 0.0 || t > max_distance {
                    return None;
                }
                let centre = origin + dir * t;
                let point = if reach > 0.0 {
                    pose.position + (centre - pose.position) * (world_r / reach)
                } else {
                    centre
                };
                Some(ShapeHit { distance: t, point })
            }
            Self::Box { half_extents } => {
                let h = half_extents.component_mul(&pose.scale.abs());
                let grown = h.add_scalar(radius);
                let inv = pose.rotation.inverse();
                let lo = inv * (origin - pose.position);
                let ld = inv * dir;

                let mut t_enter = f32::NEG_INFINITY;
                let mut t_exit = f32::INFINITY;
                for axis in 0..3 {
                    if ld[axis].abs() <= f32::EPSILON {
                        if lo[axis].abs() > grown[axis] {
                            return None;
                        }
                        continue;
                    }
                    let inv_d = 1.0 / ld[axis];
                    let mut t1 = (-grown[axis] - lo[axis]) * inv_d;
                    let mut t2 = (grown[axis] - lo[axis]) * inv_d;
                    if t1 > t2 {
                        std::mem::swap(&mut t1, &mut t2);
                    }
                    t_enter = t_enter.max(t1);
                    t_exit = t_exit.min(t2);
                    if t_enter > t_exit {
                        return None;
                    }
                }
                // Origin inside the (grown) box, or box entirely behind.
                if t_enter <= 0.0 || t_enter > max_distance {
                    return None;
                }
                let local_centre = lo + ld * t_enter;
                let local_contact = Vector3::new(
                    local_centre.x.clamp(-h.x, h.x),
                    local_centre.y.clamp(-h.y, h.y),
                    local_centre.z.clamp(-h.z, h.z),
                );
                let point = pose.position + pose.rotation * local_contact;
                Some(ShapeHit {
                    distance: t_enter,
                    point,
                })
            }
        }
    }

    /// Returns `true` if the sphere at `centre` with `radius` touches the shape.
    pub(crate) fn overlaps_sphere(&self, pose: &Transform, centre: &Point3<f32>, radius: f32) -> bool {
        match self {
            Self::Sphere { radius: r } => {
                let reach = r * pose.max_scale() + radius;
                (centre - pose.position).norm_squared() <= reach * reach
            }
            Self::Box { half_extents } => {
                let h = half_extents.component_mul(&pose.scale.abs());
                let local = pose.rotation.inverse() * (centre - pose.position);
                let closest = Vector3::new(
                    local.x.clamp(-h.x, h.x),
                    local.y.clamp(-h.y, h.y),
                    local.z.clamp(-h.z, h.z),
                );
                (local - closest).norm_squared() <= radius * radius
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use floe_core::transform::yaw_rotation;
    use proptest::prelude::*;

    fn at(x: f32, y: f32, z: f32) -> Transform {
        Transform::from_position(Point3::new(x, y, z))
    }

    #[test]
    fn ray_hits_sphere_front_face() {
        let hit = Collider::sphere(1.0)
            .cast(&at(0.0, 0.0, 5.0), &Point3::origin(), &Vector3::z(), 10.0, 0.0)
            .unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.point - Point3::new(0.0, 0.0, 4.0)).norm() < 1e-5);
    }

    #[test]
    fn sphere_cast_reaches_further_than_ray() {
        let target = at(1.5, 0.0, 5.0);
        let s = Collider::sphere(1.0);
        assert!(s.cast(&target, &Point3::origin(), &Vector3::z(), 10.0, 0.0).is_none());
        let hit = s
            .cast(&target, &Point3::origin(), &Vector3::z(), 10.0, 1.0)
            .unwrap();
        assert!(hit.distance < 5.0);
        // Contact point lies on the target's surface.
        assert!(((hit.point - target.position).norm() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn ray_from_inside_sphere_is_ignored() {
        let s = Collider::sphere(2.0);
        assert!(s
            .cast(&at(0.0, 0.0, 0.5), &Point3::origin(), &Vector3::z(), 10.0, 0.0)
            .is_none());
    }

    #[test]
    fn out_of_reach_is_a_miss() {
        let s = Collider::sphere(1.0);
        assert!(s
            .cast(&at(0.0, 0.0, 5.0), &Point3::origin(), &Vector3::z(), 3.5, 0.0)
            .is_none());
        assert!(s
            .cast(&at(0.0, 0.0, -5.0), &Point3::origin(), &Vector3::z(), 10.0, 0.0)
            .is_none());
    }

    #[test]
    fn scaled_sphere_grows() {
        let pose = at(0.0, 0.0, 5.0).with_uniform_scale(2.0);
        let hit = Collider::sphere(1.0)
            .cast(&pose, &Point3::origin(), &Vector3::z(), 10.0, 0.0)
            .unwrap();
        assert!((hit.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn ray_hits_box_face() {
        let hit = Collider::cuboid(1.0, 1.0, 1.0)
            .cast(&at(0.0, 0.0, 5.0), &Point3::origin(), &Vector3::z(), 10.0, 0.0)
            .unwrap();
        assert!((hit.distance - 4.0).abs() < 1e-5);
        assert!((hit.point.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn rotated_box_is_hit_on_its_rotated_face() {
        // Thin slab rotated 90 degrees: its long axis now runs along Z.
        let pose = at(0.0, 0.0, 5.0).with_rotation(yaw_rotation(90.0));
        let slab = Collider::cuboid(3.0, 1.0, 0.1);
        let hit = slab
            .cast(&pose, &Point3::origin(), &Vector3::z(), 10.0, 0.0)
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-4);
    }

    #[test]
    fn sphere_cast_against_box_uses_grown_faces() {
        let pose = at(0.0, 0.0, 5.0);
        let hit = Collider::cuboid(1.0, 1.0, 1.0)
            .cast(&pose, &Point3::origin(), &Vector3::z(), 10.0, 0.5)
            .unwrap();
        assert!((hit.distance - 3.5).abs() < 1e-5);
        assert!((hit.point.z - 4.0).abs() < 1e-5);
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let pose = at(0.0, 5.0, 5.0);
        assert!(Collider::cuboid(1.0, 1.0, 1.0)
            .cast(&pose, &Point3::origin(), &Vector3::z(), 10.0, 0.0)
            .is_none());
    }

    #[test]
    fn overlap_tests() {
        let pose = at(0.0, 0.0, 0.0);
        assert!(Collider::sphere(1.0).overlaps_sphere(&pose, &Point3::new(1.4, 0.0, 0.0), 0.5));
        assert!(!Collider::sphere(1.0).overlaps_sphere(&pose, &Point3::new(1.6, 0.0, 0.0), 0.5));
        let b = Collider::cuboid(1.0, 1.0, 1.0);
        assert!(b.overlaps_sphere(&pose, &Point3::new(1.4, 0.0, 0.0), 0.5));
        assert!(!b.overlaps_sphere(&pose, &Point3::new(1.4, 1.4, 0.0), 0.5));
    }

    #[test]
    fn validate_rejects_bad_dimensions() {
        assert!(Collider::sphere(-1.0).validate().is_err());
        assert!(Collider::sphere(f32::NAN).validate().is_err());
        assert!(Collider::cuboid(1.0, f32::INFINITY, 1.0).validate().is_err());
        assert!(Collider::cuboid(0.0, 0.0, 0.0).validate().is_ok());
    }

    proptest! {
        #[test]
        fn head_on_sphere_cast_stops_at_combined_radius(
            d in 4.0f32..30.0,
            r in 0.1f32..2.0,
            c in 0.0f32..1.0,
        ) {
            let hit = Collider::sphere(r)
                .cast(&at(0.0, 0.0, d), &Point3::origin(), &Vector3::z(), 50.0, c);
            let hit = hit.expect("sphere straight ahead must be hit");
            prop_assert!((hit.distance - (d - r - c)).abs() < 1e-3);
            prop_assert!((hit.point.z - (d - r)).abs() < 1e-3);
        }

        #[test]
        fn ray_hits_lie_on_the_box_within_reach(
            x in -3.0f32..3.0,
            y in -3.0f32..3.0,
            z in 3.0f32..15.0,
            hx in 0.1f32..2.0,
            hy in 0.1f32..2.0,
            hz in 0.1f32..2.0,
            yaw in 0.0f32..360.0,
            max in 1.0f32..20.0,
        ) {
            let pose = at(x, y, z).with_rotation(yaw_rotation(yaw));
            let collider = Collider::cuboid(hx, hy, hz);
            if let Some(hit) = collider.cast(&pose, &Point3::origin(), &Vector3::z(), max, 0.0) {
                prop_assert!(hit.distance > 0.0 && hit.distance <= max);
                let along = Point3::new(0.0, 0.0, hit.distance);
                prop_assert!(collider.overlaps_sphere(&pose, &along, 1e-3));
                prop_assert!((hit.point - along).norm() < 1e-3);
            }
        }
    }
}
