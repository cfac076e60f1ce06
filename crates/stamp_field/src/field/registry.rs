//! Registry of named hue and spread fields.
//!
//! Fields are large, so patterns never own them: they are registered once here and
//! handed out as [`Arc`]s to every pattern that references them by id.
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::field::{FieldId, HueField, SpreadField};

/// Registry for storing and sharing fields by unique string identifiers.
///
/// Hue and spread fields live in separate namespaces, so one id may name both.
#[non_exhaustive]
#[derive(Clone, Default)]
pub struct FieldRegistry {
    hue: HashMap<FieldId, Arc<HueField>>,
    spread: HashMap<FieldId, Arc<SpreadField>>,
}

impl FieldRegistry {
    /// Creates a new, empty [`FieldRegistry`].
    pub fn new() -> Self {
        Self {
            hue: HashMap::new(),
            spread: HashMap::new(),
        }
    }

    /// Returns the total number of registered fields.
    pub fn len(&self) -> usize {
        self.hue.len() + self.spread.len()
    }

    /// Returns `true` if there are no registered fields.
    pub fn is_empty(&self) -> bool {
        self.hue.is_empty() && self.spread.is_empty()
    }

    pub fn clear(&mut self) {
        self.hue.clear();
        self.spread.clear();
    }

    /// Registers a hue field, replacing any previous field with the same id.
    pub fn register_hue(&mut self, id: impl Into<FieldId>, field: HueField) {
        self.hue.insert(id.into(), Arc::new(field));
    }

    /// Registers a spread field, replacing any previous field with the same id.
    pub fn register_spread(&mut self, id: impl Into<FieldId>, field: SpreadField) {
        self.spread.insert(id.into(), Arc::new(field));
    }

    pub fn register_hue_arc(&mut self, id: impl Into<FieldId>, field: Arc<HueField>) {
        self.hue.insert(id.into(), field);
    }

    pub fn register_spread_arc(&mut self, id: impl Into<FieldId>, field: Arc<SpreadField>) {
        self.spread.insert(id.into(), field);
    }

    /// Extends the registry with fields from another registry.
    pub fn extend_from(&mut self, other: &FieldRegistry) {
        for (k, v) in other.hue.iter() {
            self.hue.insert(k.clone(), v.clone());
        }
        for (k, v) in other.spread.iter() {
            self.spread.insert(k.clone(), v.clone());
        }
    }

    pub fn contains_hue(&self, id: &str) -> bool {
        self.hue.contains_key(id)
    }

    pub fn contains_spread(&self, id: &str) -> bool {
        self.spread.contains_key(id)
    }

    pub fn hue(&self, id: &str) -> Option<Arc<HueField>> {
        self.hue.get(id).cloned()
    }

    pub fn spread(&self, id: &str) -> Option<Arc<SpreadField>> {
        self.spread.get(id).cloned()
    }

    /// Like [`FieldRegistry::hue`], but an unknown id is an error.
    pub fn require_hue(&self, id: &str) -> Result<Arc<HueField>> {
        self.hue(id).ok_or_else(|| Error::UnknownField { id: id.to_owned() })
    }

    /// Like [`FieldRegistry::spread`], but an unknown id is an error.
    pub fn require_spread(&self, id: &str) -> Result<Arc<SpreadField>> {
        self.spread(id)
            .ok_or_else(|| Error::UnknownField { id: id.to_owned() })
    }

    /// Ids of all registered hue fields, sorted.
    pub fn hue_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.hue.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Ids of all registered spread fields, sorted.
    pub fn spread_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.spread.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{HueCell, RasterSize};

    #[test]
    fn registered_fields_are_shared_not_copied() {
        let size = RasterSize::new(2, 2);
        let mut registry = FieldRegistry::new();
        registry.register_spread("tight", SpreadField::filled(size, 5.0));

        let a = registry.require_spread("tight").unwrap();
        let b = registry.require_spread("tight").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn namespaces_are_separate() {
        let size = RasterSize::new(1, 1);
        let mut registry = FieldRegistry::new();
        registry.register_hue("flag", HueField::filled(size, HueCell::vivid(10.0)));
        registry.register_spread("flag", SpreadField::filled(size, 5.0));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains_hue("flag") && registry.contains_spread("flag"));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let registry = FieldRegistry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.require_hue("missing"),
            Err(Error::UnknownField { ref id }) if id == "missing"
        ));
        assert!(registry.spread("missing").is_none());
    }

    #[test]
    fn extend_from_merges() {
        let size = RasterSize::new(1, 1);
        let mut a = FieldRegistry::new();
        a.register_spread("x", SpreadField::filled(size, 1.0));
        let mut b = FieldRegistry::new();
        b.register_spread("y", SpreadField::filled(size, 2.0));
        a.extend_from(&b);
        assert_eq!(a.spread_ids(), vec!["x", "y"]);
    }
}
