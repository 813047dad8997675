//! The simulation context: entity storage and spatial queries.

use floe_core::{
    CastHit, CastQuery, EntityId, LayerMask, PhysicsQuery, SceneError, TagId, Transform,
};
use indexmap::IndexMap;
use nalgebra::Point3;
use smallvec::SmallVec;
use tracing::trace;

use crate::collider::Collider;
use crate::tags::TagRegistry;

/// Description of an entity to spawn.
///
/// # Examples
///
/// ```
/// use floe_scene::{Collider, EntityDesc, Scene};
/// use floe_core::Transform;
/// use nalgebra::Point3;
///
/// let mut scene = Scene::new();
/// let fish = scene
///     .spawn(
///         EntityDesc::new("fish")
///             .with_transform(Transform::from_position(Point3::new(0.0, 0.5, 4.0)))
///             .with_collider(Collider::sphere(0.5))
///             .with_tag("fish"),
///     )
///     .unwrap();
/// assert!(scene.contains(fish));
/// assert_eq!(scene.tag_name(fish), Some("fish"));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct EntityDesc {
    /// Display name; not required to be unique.
    pub name: String,
    /// Initial transform.
    pub transform: Transform,
    /// Optional collision shape. Entities without one are invisible to queries.
    pub collider: Option<Collider>,
    /// Collision layer in `0..32`.
    pub layer: u8,
    /// Optional classification tag name.
    pub tag: Option<String>,
}

impl EntityDesc {
    /// Untagged entity on layer 0 at the origin, with no collider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform::identity(),
            collider: None,
            layer: 0,
            tag: None,
        }
    }

    /// Sets the initial transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Attaches a collider.
    #[must_use]
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Sets the collision layer.
    #[must_use]
    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    /// Sets the classification tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

#[derive(Clone, Debug)]
struct Entity {
    name: String,
    transform: Transform,
    collider: Option<Collider>,
    layer: u8,
    tag: Option<TagId>,
}

/// Explicit simulation context.
///
/// Owns every entity and answers spatial queries over them. Entities are
/// kept in spawn order, which is also ascending [`EntityId`] order, so
/// iteration and tie-breaking are deterministic.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    entities: IndexMap<EntityId, Entity>,
    tags: TagRegistry,
    next_id: u32,
}

impl Scene {
    /// Empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an entity and returns its fresh ID.
    ///
    /// # Errors
    ///
    /// - [`SceneError::InvalidLayer`] if `desc.layer >= 32`.
    /// - [`SceneError::InvalidCollider`] if the collider fails validation.
    /// - [`SceneError::TagRegistryFull`] if the tag cannot be interned.
    pub fn spawn(&mut self, desc: EntityDesc) -> Result<EntityId, SceneError> {
        if desc.layer >= 32 {
            return Err(SceneError::InvalidLayer(desc.layer));
        }
        if let Some(collider) = &desc.collider {
            collider.validate()?;
        }
        let tag = desc
            .tag
            .as_deref()
            .map(|name| self.tags.intern(name))
            .transpose()?;

        let id = EntityId(self.next_id);
        self.next_id += 1;
        trace!(entity = %id, name = %desc.name, "spawn");
        self.entities.insert(
            id,
            Entity {
                name: desc.name,
                transform: desc.transform,
                collider: desc.collider,
                layer: desc.layer,
                tag,
            },
        );
        Ok(id)
    }

    /// Removes an entity.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if `id` is not alive.
    pub fn despawn(&mut self, id: EntityId) -> Result<(), SceneError> {
        self.entities
            .shift_remove(&id)
            .map(|e| trace!(entity = %id, name = %e.name, "despawn"))
            .ok_or(SceneError::UnknownEntity(id))
    }

    /// Returns `true` if `id` is alive.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if the scene has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Live entity IDs in ascending order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Live entities carrying `tag`, in ascending ID order.
    pub fn entities_with_tag(&self, tag: TagId) -> impl Iterator<Item = EntityId> + '_ {
        self.entities
            .iter()
            .filter(move |(_, e)| e.tag == Some(tag))
            .map(|(id, _)| *id)
    }

    /// Transform of `id`, if alive.
    pub fn transform(&self, id: EntityId) -> Option<&Transform> {
        self.entities.get(&id).map(|e| &e.transform)
    }

    /// Mutable transform of `id`, if alive.
    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform> {
        self.entities.get_mut(&id).map(|e| &mut e.transform)
    }

    /// Replaces the transform of `id`.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownEntity`] if `id` is not alive.
    pub fn set_transform(&mut self, id: EntityId, transform: Transform) -> Result<(), SceneError> {
        let slot = self
            .transform_mut(id)
            .ok_or(SceneError::UnknownEntity(id))?;
        *slot = transform;
        Ok(())
    }

    /// Display name of `id`, if alive.
    pub fn name(&self, id: EntityId) -> Option<&str> {
        self.entities.get(&id).map(|e| e.name.as_str())
    }

    /// Collider of `id`, if alive and it has one.
    pub fn collider(&self, id: EntityId) -> Option<&Collider> {
        self.entities.get(&id).and_then(|e| e.collider.as_ref())
    }

    /// Layer of `id`, if alive.
    pub fn layer(&self, id: EntityId) -> Option<u8> {
        self.entities.get(&id).map(|e| e.layer)
    }

    /// Tag of `id`, if alive and tagged.
    pub fn tag(&self, id: EntityId) -> Option<TagId> {
        self.entities.get(&id).and_then(|e| e.tag)
    }

    /// Tag name of `id`, if alive and tagged.
    pub fn tag_name(&self, id: EntityId) -> Option<&str> {
        self.tag(id).and_then(|t| self.tags.name(t))
    }

    /// Interns `name` into this scene's tag registry.
    ///
    /// # Errors
    ///
    /// [`SceneError::TagRegistryFull`] if no ID is left.
    pub fn intern_tag(&mut self, name: &str) -> Result<TagId, SceneError> {
        self.tags.intern(name)
    }

    /// The scene's tag registry.
    pub fn tags(&self) -> &TagRegistry {
        &self.tags
    }

    /// Mutable access to the tag registry, for resolving sensor tag
    /// lists before any tagged entity exists.
    pub fn tags_mut(&mut self) -> &mut TagRegistry {
        &mut self.tags
    }
}

impl PhysicsQuery for Scene {
    fn cast(&self, query: &CastQuery) -> Option<CastHit> {
        let dir = query.direction.into_inner();
        let mut best: Option<CastHit> = None;
        for (&id, entity) in &self.entities {
            if query.exclude == Some(id) || !query.layer_mask.contains(entity.layer) {
                continue;
            }
            let Some(collider) = &entity.collider else {
                continue;
            };
            let Some(hit) = collider.cast(
                &entity.transform,
                &query.origin,
                &dir,
                query.max_distance,
                query.radius,
            ) else {
                continue;
            };
            // Strict `<` keeps the lowest ID on ties (ascending iteration).
            if best.is_none_or(|b| hit.distance < b.distance) {
                best = Some(CastHit {
                    entity: id,
                    distance: hit.distance,
                    point: hit.point,
                    tag: entity.tag,
                });
            }
        }
        best
    }

    fn overlap_sphere(
        &self,
        center: &Point3<f32>,
        radius: f32,
        layer_mask: LayerMask,
    ) -> SmallVec<[EntityId; 8]> {
        self.entities
            .iter()
            .filter(|(_, e)| layer_mask.contains(e.layer))
            .filter(|(_, e)| {
                e.collider
                    .as_ref()
                    .is_some_and(|c| c.overlaps_sphere(&e.transform, center, radius))
            })
            .map(|(id, _)| *id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn ball(scene: &mut Scene, z: f32, layer: u8, tag: Option<&str>) -> EntityId {
        let mut desc = EntityDesc::new("ball")
            .with_transform(Transform::from_position(Point3::new(0.0, 0.0, z)))
            .with_collider(Collider::sphere(0.5))
            .with_layer(layer);
        if let Some(t) = tag {
            desc = desc.with_tag(t);
        }
        scene.spawn(desc).unwrap()
    }

    fn forward_ray(max: f32) -> CastQuery {
        CastQuery::ray(Point3::origin(), Vector3::z(), max).unwrap()
    }

    #[test]
    fn ids_are_sequential_and_never_reused() {
        let mut scene = Scene::new();
        let a = ball(&mut scene, 1.0, 0, None);
        let b = ball(&mut scene, 2.0, 0, None);
        scene.despawn(a).unwrap();
        let c = ball(&mut scene, 3.0, 0, None);
        assert_eq!((a, b, c), (EntityId(0), EntityId(1), EntityId(2)));
        assert_eq!(scene.entities().collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn despawn_unknown_errors() {
        let mut scene = Scene::new();
        assert_eq!(
            scene.despawn(EntityId(9)),
            Err(SceneError::UnknownEntity(EntityId(9)))
        );
    }

    #[test]
    fn spawn_rejects_bad_layer_and_collider() {
        let mut scene = Scene::new();
        assert_eq!(
            scene.spawn(EntityDesc::new("x").with_layer(32)),
            Err(SceneError::InvalidLayer(32))
        );
        assert!(matches!(
            scene.spawn(EntityDesc::new("x").with_collider(Collider::sphere(-1.0))),
            Err(SceneError::InvalidCollider { .. })
        ));
        assert!(scene.is_empty());
    }

    #[test]
    fn cast_returns_nearest_with_tag() {
        let mut scene = Scene::new();
        ball(&mut scene, 8.0, 0, Some("far"));
        let near = ball(&mut scene, 4.0, 0, Some("near"));
        let hit = scene.cast(&forward_ray(20.0)).unwrap();
        assert_eq!(hit.entity, near);
        assert!((hit.distance - 3.5).abs() < 1e-5);
        assert_eq!(hit.tag, scene.tags().lookup("near"));
    }

    #[test]
    fn layer_mask_skips_filtered_entity() {
        let mut scene = Scene::new();
        ball(&mut scene, 4.0, 3, None);
        let far = ball(&mut scene, 8.0, 0, None);
        let q = forward_ray(20.0).with_layer_mask(LayerMask::ALL.without(3));
        assert_eq!(scene.cast(&q).unwrap().entity, far);
    }

    #[test]
    fn default_mask_skips_ignore_raycast_layer() {
        let mut scene = Scene::new();
        ball(&mut scene, 4.0, LayerMask::IGNORE_RAYCAST_LAYER, None);
        assert!(scene.cast(&forward_ray(20.0)).is_none());
    }

    #[test]
    fn excluded_entity_is_skipped() {
        let mut scene = Scene::new();
        let near = ball(&mut scene, 4.0, 0, None);
        let far = ball(&mut scene, 8.0, 0, None);
        let q = forward_ray(20.0).excluding(near);
        assert_eq!(scene.cast(&q).unwrap().entity, far);
    }

    #[test]
    fn equidistant_hits_resolve_to_lowest_id() {
        let mut scene = Scene::new();
        let first = ball(&mut scene, 4.0, 0, None);
        ball(&mut scene, 4.0, 0, None);
        assert_eq!(scene.cast(&forward_ray(20.0)).unwrap().entity, first);
    }

    #[test]
    fn entities_without_colliders_are_invisible() {
        let mut scene = Scene::new();
        scene
            .spawn(
                EntityDesc::new("ghost")
                    .with_transform(Transform::from_position(Point3::new(0.0, 0.0, 2.0))),
            )
            .unwrap();
        assert!(scene.cast(&forward_ray(20.0)).is_none());
        assert!(scene
            .overlap_sphere(&Point3::new(0.0, 0.0, 2.0), 1.0, LayerMask::ALL)
            .is_empty());
    }

    #[test]
    fn overlap_sphere_filters_by_layer() {
        let mut scene = Scene::new();
        let a = ball(&mut scene, 1.0, 0, None);
        let b = ball(&mut scene, 1.5, 4, None);
        ball(&mut scene, 10.0, 0, None);
        let c = Point3::new(0.0, 0.0, 1.2);
        assert_eq!(scene.overlap_sphere(&c, 0.5, LayerMask::ALL).as_slice(), &[a, b]);
        assert_eq!(
            scene
                .overlap_sphere(&c, 0.5, LayerMask::from_layers(&[4]))
                .as_slice(),
            &[b]
        );
    }

    #[test]
    fn entities_with_tag_lists_matches() {
        let mut scene = Scene::new();
        let f1 = ball(&mut scene, 1.0, 0, Some("fish"));
        ball(&mut scene, 2.0, 0, Some("baby"));
        let f2 = ball(&mut scene, 3.0, 0, Some("fish"));
        let fish = scene.tags().lookup("fish").unwrap();
        assert_eq!(scene.entities_with_tag(fish).collect::<Vec<_>>(), vec![f1, f2]);
    }

    #[test]
    fn set_transform_moves_entity() {
        let mut scene = Scene::new();
        let a = ball(&mut scene, 4.0, 0, None);
        scene
            .set_transform(a, Transform::from_position(Point3::new(0.0, 0.0, 6.0)))
            .unwrap();
        let hit = scene.cast(&forward_ray(20.0)).unwrap();
        assert!((hit.distance - 5.5).abs() < 1e-5);
        assert!(scene.set_transform(EntityId(99), Transform::identity()).is_err());
    }
}
