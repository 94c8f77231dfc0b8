//! Per-instance proxy registry
//!
//! Maps member names to their proxies for one instance. Methods and
//! properties live in separate namespaces: a method and a property may share
//! a name without colliding. Lookups never create proxies — every proxy is
//! created on the construction path, so a miss means the member was never
//! marked interceptable (or its proxy was explicitly removed).

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::{MethodProxy, PropertyProxy};

/// Per-instance lookup table from member name to member proxy.
#[derive(Default)]
pub struct ProxyRegistry {
    methods: Mutex<FxHashMap<String, Arc<MethodProxy>>>,
    properties: Mutex<FxHashMap<String, Arc<PropertyProxy>>>,
}

impl ProxyRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method proxy
    pub fn add_method(&self, name: impl Into<String>, proxy: Arc<MethodProxy>) {
        self.methods.lock().insert(name.into(), proxy);
    }

    /// Register a property proxy
    pub fn add_property(&self, name: impl Into<String>, proxy: Arc<PropertyProxy>) {
        self.properties.lock().insert(name.into(), proxy);
    }

    /// Look up a method proxy
    pub fn method(&self, name: &str) -> Option<Arc<MethodProxy>> {
        self.methods.lock().get(name).cloned()
    }

    /// Look up a property proxy
    pub fn property(&self, name: &str) -> Option<Arc<PropertyProxy>> {
        self.properties.lock().get(name).cloned()
    }

    /// Remove a method proxy. Returns true if one was registered.
    pub fn remove_method(&self, name: &str) -> bool {
        self.methods.lock().remove(name).is_some()
    }

    /// Remove a property proxy. Returns true if one was registered.
    pub fn remove_property(&self, name: &str) -> bool {
        self.properties.lock().remove(name).is_some()
    }

    /// Total number of registered proxies
    pub fn len(&self) -> usize {
        self.methods.lock().len() + self.properties.lock().len()
    }

    /// Whether no proxies are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ProxyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyRegistry")
            .field("methods", &self.methods.lock().len())
            .field("properties", &self.properties.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_sdk::{MemberDescriptor, MemberKind, TypeTag, Value};

    fn method_proxy(name: &str) -> Arc<MethodProxy> {
        let descriptor = MemberDescriptor::new(
            "Widget",
            name,
            MemberKind::Method,
            TypeTag::void(),
            Vec::new(),
            Vec::new(),
        );
        Arc::new(MethodProxy::new(
            descriptor,
            Arc::new(|_, _| Ok(Value::Null)),
            true,
        ))
    }

    fn property_proxy(name: &str) -> Arc<PropertyProxy> {
        let descriptor = MemberDescriptor::new(
            "Widget",
            name,
            MemberKind::Property,
            TypeTag::optional("int"),
            Vec::new(),
            Vec::new(),
        );
        Arc::new(PropertyProxy::new(descriptor, None, None, true))
    }

    #[test]
    fn test_add_and_lookup() {
        let registry = ProxyRegistry::new();
        assert!(registry.is_empty());

        registry.add_method("poke", method_proxy("poke"));
        assert!(registry.method("poke").is_some());
        assert!(registry.method("other").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_namespaces_do_not_collide() {
        let registry = ProxyRegistry::new();
        registry.add_method("size", method_proxy("size"));
        registry.add_property("size", property_proxy("size"));

        assert!(registry.method("size").is_some());
        assert!(registry.property("size").is_some());
        assert_eq!(registry.len(), 2);

        assert!(registry.remove_property("size"));
        assert!(registry.method("size").is_some());
        assert!(registry.property("size").is_none());
    }

    #[test]
    fn test_remove() {
        let registry = ProxyRegistry::new();
        registry.add_method("poke", method_proxy("poke"));

        assert!(registry.remove_method("poke"));
        assert!(!registry.remove_method("poke"));
        assert!(registry.is_empty());
    }
}
