//! Named float parameters supplied by a training orchestrator.
//!
//! Curriculum and domain-randomization values (e.g. `fish_speed`) are
//! pushed in from outside the simulation. Consumers always read them
//! with a fallback so an environment runs unchanged when no trainer
//! has set anything.

use indexmap::IndexMap;

/// Ordered map of named float parameters.
///
/// # Examples
///
/// ```
/// use floe_core::EnvironmentParameters;
///
/// let mut params = EnvironmentParameters::new();
/// assert_eq!(params.get_with_default("fish_speed", 0.5), 0.5);
///
/// params.set("fish_speed", 2.0);
/// assert_eq!(params.get_with_default("fish_speed", 0.5), 2.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvironmentParameters {
    values: IndexMap<String, f32>,
}

impl EnvironmentParameters {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: f32) {
        self.values.insert(key.into(), value);
    }

    /// Returns the value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    /// Returns the value of `key`, or `default` when unset.
    pub fn get_with_default(&self, key: &str, default: f32) -> f32 {
        self.get(key).unwrap_or(default)
    }

    /// Removes `key`, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<f32> {
        self.values.shift_remove(key)
    }

    /// Parameter names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Number of parameters set.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no parameter is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for EnvironmentParameters {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(k, v);
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_keeps_insertion_order() {
        let mut p: EnvironmentParameters = [("a", 1.0), ("b", 2.0)].into_iter().collect();
        p.set("a", 3.0);
        assert_eq!(p.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(p.get("a"), Some(3.0));
        assert_eq!(p.len(), 2);
    }

    #[test]
    fn remove_falls_back_to_default() {
        let mut p = EnvironmentParameters::new();
        p.set("fish_speed", 1.5);
        assert_eq!(p.remove("fish_speed"), Some(1.5));
        assert!(p.is_empty());
        assert_eq!(p.get_with_default("fish_speed", 0.25), 0.25);
    }
}
