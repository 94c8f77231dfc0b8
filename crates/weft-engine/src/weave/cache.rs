//! Weaver cache and facade
//!
//! Memoizes woven classes by class name. The entry API keeps the per-name
//! lock held across synthesis, so weaving for a given name runs at most
//! once even under concurrent first use, and every caller observes the same
//! woven class.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use crate::error::WeaveResult;
use crate::model::ClassDef;
use crate::weave::{Weaver, WovenClass};

/// Process-wide store of woven classes, keyed by class name.
#[derive(Default)]
pub struct WeaverCache {
    weaver: Weaver,
    classes: DashMap<String, Arc<WovenClass>>,
}

impl WeaverCache {
    /// Create a cache around a default weaver
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache around the given weaver
    pub fn with_weaver(weaver: Weaver) -> Self {
        Self {
            weaver,
            classes: DashMap::new(),
        }
    }

    /// The weaver behind this cache
    pub fn weaver(&self) -> &Weaver {
        &self.weaver
    }

    /// Return the woven class for this definition, weaving it on first use.
    ///
    /// Repeated requests for the same class name return the identical woven
    /// class; the supplied definition is ignored on a hit.
    pub fn get_or_weave(&self, def: ClassDef) -> WeaveResult<Arc<WovenClass>> {
        match self.classes.entry(def.name.clone()) {
            Entry::Occupied(entry) => {
                debug!(class = %def.name, "weaver cache hit");
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                let woven = self.weaver.weave(def)?;
                entry.insert(woven.clone());
                Ok(woven)
            }
        }
    }

    /// Look up an already-woven class
    pub fn get(&self, name: &str) -> Option<Arc<WovenClass>> {
        self.classes.get(name).map(|entry| entry.value().clone())
    }

    /// Whether a class is already woven
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Number of woven classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether no class has been woven yet
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl std::fmt::Debug for WeaverCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeaverCache")
            .field("classes", &self.classes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstructorDef, MethodDef};
    use weft_sdk::Value;

    fn counter_def() -> ClassDef {
        ClassDef::new("Counter")
            .constructor(ConstructorDef::empty())
            .method(MethodDef::new("bump", |_, _| Ok(Value::Null)).intercepted())
    }

    #[test]
    fn test_cache_hit_returns_identical_class() {
        let cache = WeaverCache::new();
        let first = cache.get_or_weave(counter_def()).unwrap();
        let second = cache.get_or_weave(counter_def()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_lookup() {
        let cache = WeaverCache::new();
        assert!(cache.get("Counter").is_none());
        assert!(!cache.contains("Counter"));

        let woven = cache.get_or_weave(counter_def()).unwrap();
        assert!(Arc::ptr_eq(&cache.get("Counter").unwrap(), &woven));
        assert!(cache.contains("Counter"));
    }

    #[test]
    fn test_cache_weave_error_not_cached() {
        let cache = WeaverCache::new();
        assert!(cache.get_or_weave(ClassDef::new("Broken")).is_err());
        assert!(!cache.contains("Broken"));
        assert!(cache.is_empty());
    }
}
