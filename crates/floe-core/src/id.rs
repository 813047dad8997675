//! Strongly-typed identifiers and the [`LayerMask`] collision filter.

use std::fmt;

/// Identifies an entity within a scene.
///
/// IDs are allocated sequentially by the scene and never reused within
/// the lifetime of that scene, so a despawned entity's ID stays dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Interned classification tag.
///
/// Tag names are resolved to `TagId`s once, when an entity is spawned
/// or a sensor is configured. Per-hit classification is then an integer
/// comparison instead of a string comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagId(pub u16);

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for TagId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Bit mask over the 32 collision layers.
///
/// A collider on layer `n` is visible to a query iff bit `n` of the
/// query's mask is set.
///
/// # Examples
///
/// ```
/// use floe_core::LayerMask;
///
/// let mask = LayerMask::ALL.without(LayerMask::IGNORE_RAYCAST_LAYER);
/// assert!(mask.contains(0));
/// assert!(!mask.contains(2));
/// assert_eq!(mask, LayerMask::DEFAULT);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// No layer. Queries with this mask never hit anything.
    pub const NONE: Self = Self(0);
    /// Layer reserved for colliders that ray queries should skip.
    pub const IGNORE_RAYCAST_LAYER: u8 = 2;
    /// Every layer except [`IGNORE_RAYCAST_LAYER`](Self::IGNORE_RAYCAST_LAYER).
    pub const DEFAULT: Self = Self(!(1 << Self::IGNORE_RAYCAST_LAYER));

    /// Mask containing exactly the given layers.
    ///
    /// Layers `>= 32` are ignored.
    pub fn from_layers(layers: &[u8]) -> Self {
        layers
            .iter()
            .fold(Self::NONE, |mask, &layer| mask.with(layer))
    }

    /// Returns `true` if `layer` passes this mask.
    pub fn contains(self, layer: u8) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }

    /// Returns a copy of this mask with `layer` enabled.
    #[must_use]
    pub fn with(self, layer: u8) -> Self {
        if layer < 32 {
            Self(self.0 | (1 << layer))
        } else {
            self
        }
    }

    /// Returns a copy of this mask with `layer` disabled.
    #[must_use]
    pub fn without(self, layer: u8) -> Self {
        if layer < 32 {
            Self(self.0 & !(1 << layer))
        } else {
            self
        }
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for LayerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
