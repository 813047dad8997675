//! Ray fan angle generation.

/// Angle of the centre ray. `90` degrees points straight ahead.
pub const CENTER_ANGLE: f32 = 90.0;

/// Returns the angles, in degrees, of a symmetric ray fan.
///
/// Produces `2 * rays_per_direction + 1` angles: the centre ray first,
/// then pairs stepping outward by `max_ray_degrees / rays_per_direction`,
/// each pair ordered "toward 0° first, toward 180° second". The last
/// pair is always `90 - max_ray_degrees`, `90 + max_ray_degrees`.
///
/// With `rays_per_direction == 0` the fan is the single centre ray.
///
/// # Examples
///
/// ```
/// use floe_perception::ray_angles;
///
/// assert_eq!(ray_angles(3, 90.0), vec![90.0, 60.0, 120.0, 30.0, 150.0, 0.0, 180.0]);
/// assert_eq!(ray_angles(0, 45.0), vec![90.0]);
/// ```
pub fn ray_angles(rays_per_direction: u32, max_ray_degrees: f32) -> Vec<f32> {
    let n = rays_per_direction as usize;
    let mut angles = Vec::with_capacity(2 * n + 1);
    angles.push(CENTER_ANGLE);
    if n == 0 {
        return angles;
    }
    let delta = max_ray_degrees / rays_per_direction as f32;
    for i in 1..=n {
        let offset = i as f32 * delta;
        angles.push(CENTER_ANGLE - offset);
        angles.push(CENTER_ANGLE + offset);
    }
    angles
}
