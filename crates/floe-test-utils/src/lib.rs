//! Test utilities and mock types for Floe development.
//!
//! Provides a scripted [`PhysicsQuery`] implementation ([`MockPhysics`])
//! that records every query it receives, and [`fixtures`] for building
//! small scenes in a line or two.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::RefCell;

use floe_core::{CastHit, CastQuery, EntityId, LayerMask, PhysicsQuery};
use nalgebra::Point3;
use smallvec::SmallVec;

/// Scripted physics backend.
///
/// `cast` returns the nearest scripted hit whose distance fits within
/// the query's `max_distance` and whose entity is not excluded. Layer
/// masks are recorded but not interpreted. Every query is logged for
/// inspection with [`queries`](MockPhysics::queries).
#[derive(Default)]
pub struct MockPhysics {
    hits: Vec<CastHit>,
    overlaps: SmallVec<[EntityId; 8]>,
    queries: RefCell<Vec<CastQuery>>,
}

impl MockPhysics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a hit candidate returned by every cast that can reach it.
    pub fn with_hit(mut self, hit: CastHit) -> Self {
        self.hits.push(hit);
        self
    }

    /// Sets the entities every overlap query reports.
    pub fn with_overlaps(mut self, entities: &[EntityId]) -> Self {
        self.overlaps = entities.iter().copied().collect();
        self
    }

    /// Snapshot of every cast query received so far.
    pub fn queries(&self) -> Vec<CastQuery> {
        self.queries.borrow().clone()
    }
}

impl PhysicsQuery for MockPhysics {
    fn cast(&self, query: &CastQuery) -> Option<CastHit> {
        self.queries.borrow_mut().push(*query);
        self.hits
            .iter()
            .filter(|h| h.distance <= query.max_distance)
            .filter(|h| query.exclude != Some(h.entity))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .copied()
    }

    fn overlap_sphere(
        &self,
        _center: &Point3<f32>,
        _radius: f32,
        _layer_mask: LayerMask,
    ) -> SmallVec<[EntityId; 8]> {
        self.overlaps.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn hit(entity: u32, distance: f32) -> CastHit {
        CastHit {
            entity: EntityId(entity),
            distance,
            point: Point3::new(0.0, 0.0, distance),
            tag: None,
        }
    }

    #[test]
    fn returns_nearest_reachable_hit() {
        let mock = MockPhysics::new().with_hit(hit(1, 8.0)).with_hit(hit(2, 3.0));
        let q = CastQuery::ray(Point3::origin(), Vector3::z(), 10.0).unwrap();
        assert_eq!(mock.cast(&q).unwrap().entity, EntityId(2));
        let short = CastQuery::ray(Point3::origin(), Vector3::z(), 2.0).unwrap();
        assert!(mock.cast(&short).is_none());
        assert_eq!(mock.queries().len(), 2);
    }

    #[test]
    fn exclusion_is_honoured() {
        let mock = MockPhysics::new().with_hit(hit(1, 3.0));
        let q = CastQuery::ray(Point3::origin(), Vector3::z(), 10.0)
            .unwrap()
            .excluding(EntityId(1));
        assert!(mock.cast(&q).is_none());
    }
}
