//! Rigid transform with per-axis scale.
//!
//! Conventions: `+Y` is up, `+Z` is forward, `+X` is right. Positive yaw
//! turns the forward vector toward `+X` (clockwise seen from above).

use nalgebra::{Point3, UnitQuaternion, Vector3};

/// Position, orientation, and per-axis scale of an entity.
///
/// Local points map to world space as
/// `position + rotation * (scale ∘ local)`. Directions ignore scale.
///
/// # Examples
///
/// ```
/// use floe_core::Transform;
/// use nalgebra::{Point3, Vector3};
///
/// let t = Transform::from_yaw(Point3::new(1.0, 0.0, 0.0), 90.0);
/// let fwd = t.forward();
/// assert!((fwd - Vector3::x()).norm() < 1e-6);
///
/// let p = t.transform_point(&Point3::new(0.0, 0.0, 2.0));
/// assert!((p - Point3::new(3.0, 0.0, 0.0)).norm() < 1e-5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// World position.
    pub position: Point3<f32>,
    /// World orientation.
    pub rotation: UnitQuaternion<f32>,
    /// Per-axis scale applied to local points before rotation.
    pub scale: Vector3<f32>,
}

impl Transform {
    /// Identity transform at the origin.
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Unrotated, unscaled transform at `position`.
    pub fn from_position(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Transform at `position` yawed by `degrees` about the vertical axis.
    pub fn from_yaw(position: Point3<f32>, degrees: f32) -> Self {
        Self {
            position,
            rotation: yaw_rotation(degrees),
            scale: Vector3::repeat(1.0),
        }
    }

    /// Returns this transform with `rotation` replaced.
    #[must_use]
    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Returns this transform with `scale` replaced.
    #[must_use]
    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    /// Returns this transform with the same scale on every axis.
    #[must_use]
    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vector3::repeat(scale))
    }

    /// Maps a local-space point to world space (scale, rotate, translate).
    pub fn transform_point(&self, local: &Point3<f32>) -> Point3<f32> {
        self.position + self.rotation * local.coords.component_mul(&self.scale)
    }

    /// Rotates a local-space direction into world space. Scale is ignored.
    pub fn transform_direction(&self, local: &Vector3<f32>) -> Vector3<f32> {
        self.rotation * local
    }

    /// World-space `+Z`.
    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    /// World-space `+Y`.
    pub fn up(&self) -> Vector3<f32> {
        self.rotation * Vector3::y()
    }

    /// World-space `+X`.
    pub fn right(&self) -> Vector3<f32> {
        self.rotation * Vector3::x()
    }

    /// Yaws the transform by `degrees` about its own up axis.
    pub fn rotate_yaw(&mut self, degrees: f32) {
        self.rotation *= yaw_rotation(degrees);
    }

    /// Heading of the forward vector projected onto the ground plane,
    /// in degrees within `(-180, 180]`. `0` faces `+Z`, `90` faces `+X`.
    pub fn yaw_degrees(&self) -> f32 {
        let f = self.forward();
        f.x.atan2(f.z).to_degrees()
    }

    /// Largest absolute scale component.
    pub fn max_scale(&self) -> f32 {
        self.scale.abs().max()
    }

    /// Turns to face `target`, keeping `+Y` as the reference up.
    ///
    /// Does nothing when `target` coincides with the position.
    pub fn look_at(&mut self, target: &Point3<f32>) {
        let dir = target - self.position;
        if dir.norm_squared() <= f32::EPSILON {
            return;
        }
        self.rotation = UnitQuaternion::face_towards(&dir, &Vector3::y());
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Rotation of `degrees` about world `+Y`.
pub fn yaw_rotation(degrees: f32) -> UnitQuaternion<f32> {
    UnitQuaternion::from_axis_angle(&Vector3::y_axis(), degrees.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).norm() < 1e-5
    }

    #[test]
    fn identity_axes() {
        let t = Transform::identity();
        assert!(close(t.forward(), Vector3::z()));
        assert!(close(t.up(), Vector3::y()));
        assert!(close(t.right(), Vector3::x()));
        assert_eq!(t.max_scale(), 1.0);
    }

    #[test]
    fn positive_yaw_turns_toward_right() {
        let mut t = Transform::identity();
        t.rotate_yaw(90.0);
        assert!(close(t.forward(), Vector3::x()));
        t.rotate_yaw(90.0);
        assert!(close(t.forward(), -Vector3::z()));
    }

    #[test]
    fn scale_applies_to_points_not_directions() {
        let t = Transform::identity().with_scale(Vector3::new(2.0, 3.0, 4.0));
        let p = t.transform_point(&Point3::new(1.0, 1.0, 1.0));
        assert!(close(p.coords, Vector3::new(2.0, 3.0, 4.0)));
        assert!(close(t.transform_direction(&Vector3::z()), Vector3::z()));
        assert_eq!(t.max_scale(), 4.0);
    }

    #[test]
    fn look_at_faces_target() {
        let mut t = Transform::from_position(Point3::new(1.0, 0.5, 1.0));
        t.look_at(&Point3::new(1.0, 0.5, -4.0));
        assert!(close(t.forward(), -Vector3::z()));
        assert!((t.yaw_degrees().abs() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn look_at_self_is_noop() {
        let mut t = Transform::from_yaw(Point3::new(2.0, 0.0, 2.0), 30.0);
        let before = t.rotation;
        t.look_at(&Point3::new(2.0, 0.0, 2.0));
        assert_eq!(t.rotation, before);
    }

    proptest! {
        #[test]
        fn yaw_round_trips(deg in -179.0f32..179.0) {
            let t = Transform::from_yaw(Point3::origin(), deg);
            prop_assert!((t.yaw_degrees() - deg).abs() < 1e-2);
        }
    }
}
