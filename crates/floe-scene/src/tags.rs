//! Tag name interning.

use floe_core::{SceneError, TagId};
use indexmap::IndexSet;

/// Interns tag names into dense [`TagId`]s.
///
/// IDs are assigned in first-seen order starting at zero and are never
/// reassigned, so a `TagId` resolved at configuration time stays valid
/// for the lifetime of the registry.
///
/// # Examples
///
/// ```
/// use floe_scene::TagRegistry;
///
/// let mut tags = TagRegistry::new();
/// let fish = tags.intern("fish").unwrap();
/// let baby = tags.intern("baby").unwrap();
/// assert_ne!(fish, baby);
/// assert_eq!(tags.intern("fish").unwrap(), fish);
/// assert_eq!(tags.name(baby), Some("baby"));
/// assert_eq!(tags.lookup("wall"), None);
/// ```
#[derive(Clone, Debug, Default)]
pub struct TagRegistry {
    names: IndexSet<String>,
}

impl TagRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the ID of `name`, registering it if unseen.
    ///
    /// # Errors
    ///
    /// [`SceneError::TagRegistryFull`] once `u16::MAX + 1` names exist.
    pub fn intern(&mut self, name: &str) -> Result<TagId, SceneError> {
        if let Some(idx) = self.names.get_index_of(name) {
            return Ok(TagId(idx as u16));
        }
        let idx = self.names.len();
        let id = u16::try_from(idx).map_err(|_| SceneError::TagRegistryFull)?;
        self.names.insert(name.to_owned());
        Ok(TagId(id))
    }

    /// Returns the ID of `name` without registering it.
    pub fn lookup(&self, name: &str) -> Option<TagId> {
        self.names.get_index_of(name).map(|idx| TagId(idx as u16))
    }

    /// Returns the name registered for `id`.
    pub fn name(&self, id: TagId) -> Option<&str> {
        self.names.get_index(id.0 as usize).map(String::as_str)
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no name is registered.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
