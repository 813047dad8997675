//! Per-ray results and their flat encoding.

use floe_core::{EntityId, SensorError};
use nalgebra::Point3;

/// Result of casting one ray.
///
/// `has_hit` and `hit_fraction` are kept separate so a genuine hit at
/// exactly the end of the ray (fraction `1.0`) is distinguishable from
/// a miss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayOutput {
    /// Whether anything unfiltered was hit.
    pub has_hit: bool,
    /// One-hot slot of the hit object's tag; `None` on a miss or when
    /// the object carries no detectable tag.
    pub hit_tag_index: Option<usize>,
    /// Distance to the hit divided by the effective ray length, in
    /// `[0, 1]`; `1.0` on a miss.
    pub hit_fraction: f32,
    /// The struck entity.
    pub hit_entity: Option<EntityId>,
    /// World-space start of the ray.
    pub start: Point3<f32>,
    /// World-space end of the ray at full length.
    pub end: Point3<f32>,
    /// Effective ray length after scaling.
    pub scaled_ray_length: f32,
    /// Effective cast radius after scaling.
    pub scaled_cast_radius: f32,
}

impl RayOutput {
    /// A miss spanning `start..end`.
    pub fn miss(start: Point3<f32>, end: Point3<f32>, length: f32, radius: f32) -> Self {
        Self {
            has_hit: false,
            hit_tag_index: None,
            hit_fraction: 1.0,
            hit_entity: None,
            start,
            end,
            scaled_ray_length: length,
            scaled_cast_radius: radius,
        }
    }

    /// Returns `true` if the ray hit an object with a detectable tag.
    pub fn hit_tagged_object(&self) -> bool {
        self.hit_tag_index.is_some()
    }

    /// Writes this ray's `num_tags + 2` values into `out`, which must be
    /// exactly that long.
    ///
    /// # Errors
    ///
    /// - [`SensorError::BufferTooSmall`] if `out` is shorter than `num_tags + 2`.
    /// - [`SensorError::InvalidConfig`] if the tag slot is out of range.
    pub fn write_to(&self, out: &mut [f32], num_tags: usize) -> Result<usize, SensorError> {
        let len = num_tags + 2;
        if out.len() < len {
            return Err(SensorError::BufferTooSmall {
                required: len,
                available: out.len(),
            });
        }
        let out = &mut out[..len];
        out[..num_tags].fill(0.0);
        if let Some(slot) = self.hit_tag_index {
            if slot >= num_tags {
                return Err(SensorError::InvalidConfig {
                    reason: format!("tag slot {slot} out of range for {num_tags} tags"),
                });
            }
            out[slot] = 1.0;
        }
        out[num_tags] = if self.has_hit { 0.0 } else { 1.0 };
        out[num_tags + 1] = self.hit_fraction;
        Ok(len)
    }
}

/// Results of one full fan, in angle order.
#[derive(Clone, Debug, PartialEq)]
pub struct RayPerceptionOutput {
    /// One entry per ray.
    pub rays: Vec<RayOutput>,
    /// Number of detectable tags the rays were classified against.
    pub num_tags: usize,
}

impl RayPerceptionOutput {
    /// Number of values [`write_to`](Self::write_to) produces.
    pub fn encoded_len(&self) -> usize {
        self.rays.len() * (self.num_tags + 2)
    }

    /// Encodes every ray into `buffer` starting at `offset`.
    ///
    /// # Errors
    ///
    /// See [`encode`].
    pub fn write_to(&self, buffer: &mut [f32], offset: usize) -> Result<usize, SensorError> {
        encode(&self.rays, self.num_tags, buffer, offset)
    }
}

/// Encodes `rays` into `buffer[offset..]` and returns the number of
/// values written, `rays.len() * (tag_count + 2)`.
///
/// A buffer that cannot hold the whole encoding is an error; nothing is
/// truncated.
///
/// # Errors
///
/// - [`SensorError::BufferTooSmall`] if `buffer.len() < offset + rays.len() * (tag_count + 2)`.
/// - [`SensorError::InvalidConfig`] if a ray's tag slot is `>= tag_count`.
///
/// # Examples
///
/// ```
/// use floe_perception::{encode, RayOutput};
/// use nalgebra::Point3;
///
/// let mut hit = RayOutput::miss(Point3::origin(), Point3::new(0.0, 0.0, 10.0), 10.0, 0.0);
/// hit.has_hit = true;
/// hit.hit_tag_index = Some(1);
/// hit.hit_fraction = 0.25;
///
/// let mut buf = vec![9.0; 1 + 4];
/// let written = encode(&[hit], 2, &mut buf, 1).unwrap();
/// assert_eq!(written, 4);
/// assert_eq!(buf, vec![9.0, 0.0, 1.0, 0.0, 0.25]);
/// ```
pub fn encode(
    rays: &[RayOutput],
    tag_count: usize,
    buffer: &mut [f32],
    offset: usize,
) -> Result<usize, SensorError> {
    let stride = tag_count + 2;
    let required = offset + rays.len() * stride;
    if buffer.len() < required {
        return Err(SensorError::BufferTooSmall {
            required,
            available: buffer.len(),
        });
    }
    let target = &mut buffer[offset..required];
    for (ray, chunk) in rays.iter().zip(target.chunks_exact_mut(stride)) {
        ray.write_to(chunk, tag_count)?;
    }
    Ok(rays.len() * stride)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ray(has_hit: bool, slot: Option<usize>, fraction: f32) -> RayOutput {
        RayOutput {
            has_hit,
            hit_tag_index: slot,
            hit_fraction: fraction,
            ..RayOutput::miss(Point3::origin(), Point3::origin(), 1.0, 0.0)
        }
    }

    #[test]
    fn tagged_hit_layout() {
        let mut out = [7.0; 5];
        ray(true, Some(2), 0.4).write_to(&mut out, 3).unwrap();
        assert_eq!(out, [0.0, 0.0, 1.0, 0.0, 0.4]);
    }

    #[test]
    fn untagged_hit_layout() {
        let mut out = [7.0; 5];
        ray(true, None, 0.4).write_to(&mut out, 3).unwrap();
        assert_eq!(out, [0.0, 0.0, 0.0, 0.0, 0.4]);
    }

    #[test]
    fn miss_layout() {
        let mut out = [7.0; 5];
        ray(false, None, 1.0).write_to(&mut out, 3).unwrap();
        assert_eq!(out, [0.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn hit_at_full_range_differs_from_miss() {
        let mut hit = [0.0; 3];
        let mut miss = [0.0; 3];
        ray(true, None, 1.0).write_to(&mut hit, 1).unwrap();
        ray(false, None, 1.0).write_to(&mut miss, 1).unwrap();
        assert_ne!(hit, miss);
    }

    #[test]
    fn short_buffer_is_an_error() {
        let rays = [ray(false, None, 1.0); 3];
        let mut buf = vec![0.0; 8];
        assert_eq!(
            encode(&rays, 1, &mut buf, 0),
            Err(SensorError::BufferTooSmall {
                required: 9,
                available: 8
            })
        );
        // Offset pushes it over too.
        let mut buf = vec![0.0; 9];
        assert!(encode(&rays, 1, &mut buf, 1).is_err());
    }

    #[test]
    fn out_of_range_slot_is_an_error() {
        let mut out = [0.0; 4];
        assert!(matches!(
            ray(true, Some(2), 0.5).write_to(&mut out, 2),
            Err(SensorError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn offset_leaves_prefix_untouched() {
        let output = RayPerceptionOutput {
            rays: vec![ray(true, Some(0), 0.5), ray(false, None, 1.0)],
            num_tags: 1,
        };
        let mut buf = vec![-1.0; 2 + output.encoded_len()];
        let n = output.write_to(&mut buf, 2).unwrap();
        assert_eq!(n, 6);
        assert_eq!(buf, vec![-1.0, -1.0, 1.0, 0.0, 0.5, 0.0, 1.0, 1.0]);
    }

    proptest! {
        #[test]
        fn encoding_length_and_one_hot(
            tags in 0usize..6,
            hits in proptest::collection::vec((any::<bool>(), 0usize..6, 0.0f32..=1.0), 0..20),
        ) {
            let rays: Vec<RayOutput> = hits
                .iter()
                .map(|&(h, slot, f)| {
                    let slot = if h && tags > 0 { Some(slot % tags) } else { None };
                    ray(h, slot, if h { f } else { 1.0 })
                })
                .collect();
            let mut buf = vec![0.5; rays.len() * (tags + 2)];
            let n = encode(&rays, tags, &mut buf, 0).unwrap();
            prop_assert_eq!(n, rays.len() * (tags + 2));
            for chunk in buf.chunks_exact(tags + 2) {
                let ones = chunk[..tags].iter().filter(|&&v| v == 1.0).count();
                let zeros = chunk[..tags].iter().filter(|&&v| v == 0.0).count();
                prop_assert!(ones <= 1);
                prop_assert_eq!(ones + zeros, tags);
                prop_assert!((0.0..=1.0).contains(&chunk[tags + 1]));
            }
        }
    }
}
