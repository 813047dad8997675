//! The physics query seam.
//!
//! Perception and gameplay code never reach into a global physics world.
//! They receive a `&dyn PhysicsQuery` (usually a `floe_scene::Scene`)
//! and issue nearest-hit casts and overlap tests against it.

use nalgebra::{Point3, Unit, Vector3};
use smallvec::SmallVec;

use crate::id::{EntityId, LayerMask, TagId};

/// A ray or swept-sphere query.
///
/// A `radius` of zero is a plain ray. Colliders that already contain
/// (or, for sphere casts, overlap) the query origin are not reported.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastQuery {
    /// Start of the cast in world space.
    pub origin: Point3<f32>,
    /// Unit direction of travel.
    pub direction: Unit<Vector3<f32>>,
    /// Maximum travel distance along `direction`.
    pub max_distance: f32,
    /// Swept sphere radius; `0.0` for a ray.
    pub radius: f32,
    /// Layers visible to this query.
    pub layer_mask: LayerMask,
    /// Entity the query must never report (typically the caster).
    pub exclude: Option<EntityId>,
}

impl CastQuery {
    /// Ray from `origin` along `direction` up to `max_distance`.
    ///
    /// Returns `None` if `direction` has zero length or is not finite.
    pub fn ray(origin: Point3<f32>, direction: Vector3<f32>, max_distance: f32) -> Option<Self> {
        let norm = direction.norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return None;
        }
        Some(Self {
            origin,
            direction: Unit::new_unchecked(direction / norm),
            max_distance,
            radius: 0.0,
            layer_mask: LayerMask::DEFAULT,
            exclude: None,
        })
    }

    /// Returns this query swept with a sphere of `radius`.
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    /// Returns this query filtered by `mask`.
    #[must_use]
    pub fn with_layer_mask(mut self, mask: LayerMask) -> Self {
        self.layer_mask = mask;
        self
    }

    /// Returns this query with `entity` excluded from results.
    #[must_use]
    pub fn excluding(mut self, entity: EntityId) -> Self {
        self.exclude = Some(entity);
        self
    }

    /// Point reached after travelling `distance` along the query.
    pub fn point_at(&self, distance: f32) -> Point3<f32> {
        self.origin + self.direction.into_inner() * distance
    }
}

/// Nearest hit reported by [`PhysicsQuery::cast`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastHit {
    /// The struck entity.
    pub entity: EntityId,
    /// Distance travelled along the query direction before contact.
    pub distance: f32,
    /// Contact point in world space.
    pub point: Point3<f32>,
    /// Classification tag of the struck entity, if it has one.
    pub tag: Option<TagId>,
}

/// Spatial queries against a simulation context.
pub trait PhysicsQuery {
    /// Returns the nearest hit along `query`, or `None` on a miss.
    ///
    /// Only colliders whose layer passes `query.layer_mask` are
    /// considered. Equidistant hits resolve to the lowest [`EntityId`].
    fn cast(&self, query: &CastQuery) -> Option<CastHit>;

    /// Entities whose colliders intersect the sphere at `center`.
    ///
    /// Results are ordered by ascending [`EntityId`].
    fn overlap_sphere(
        &self,
        center: &Point3<f32>,
        radius: f32,
        layer_mask: LayerMask,
    ) -> SmallVec<[EntityId; 8]>;
}
