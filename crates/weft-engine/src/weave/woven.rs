//! Woven classes
//!
//! A [`WovenClass`] is the synthesized dispatch shape for one class
//! definition: member tables with stable slots, name indices resolved once
//! at weave time, and a per-member plan deciding whether a call routes
//! through the instance's proxy registry or straight into the member body.
//! After weaving, dispatch is an index lookup — nothing is resolved at call
//! time.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use weft_sdk::{MemberDescriptor, Value};

use crate::aspect::AspectRegistry;
use crate::error::{CallResult, ContractViolation};
use crate::model::{ConstructorDef, FieldDef, GetterBody, MethodBody, SetterBody};
use crate::proxy::{MethodProxy, PropertyProxy};
use crate::weave::Instance;

/// One method slot in a woven class.
pub(crate) struct WovenMethod {
    pub(crate) descriptor: MemberDescriptor,
    /// Resolved raw invoker: the member's own body, or the named raw
    /// target's body when the interception declaration names one.
    pub(crate) raw: MethodBody,
    pub(crate) intercepted: bool,
    pub(crate) accepts_null: bool,
    pub(crate) arity: usize,
}

/// One property slot in a woven class.
pub(crate) struct WovenProperty {
    pub(crate) descriptor: MemberDescriptor,
    pub(crate) getter: Option<GetterBody>,
    pub(crate) setter: Option<SetterBody>,
    pub(crate) intercepted: bool,
    pub(crate) accepts_null: bool,
}

/// The synthesized dispatch shape for one class.
///
/// Created once per class definition by the weaver and cached for the
/// process lifetime; instances are constructed from it with
/// [`Instance::construct`].
pub struct WovenClass {
    pub(crate) name: String,
    pub(crate) fields: Vec<FieldDef>,
    pub(crate) field_index: FxHashMap<String, usize>,
    pub(crate) constructors: Vec<ConstructorDef>,
    pub(crate) methods: Vec<WovenMethod>,
    pub(crate) method_index: FxHashMap<String, usize>,
    pub(crate) properties: Vec<WovenProperty>,
    pub(crate) property_index: FxHashMap<String, usize>,
    pub(crate) passthrough: bool,
    pub(crate) collapse: bool,
    pub(crate) strict_arity: bool,
    pub(crate) aspects: Arc<AspectRegistry>,
}

impl WovenClass {
    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether no member of this class is intercepted
    pub fn is_passthrough(&self) -> bool {
        self.passthrough
    }

    /// Number of declared constructors
    pub fn constructor_count(&self) -> usize {
        self.constructors.len()
    }

    /// Number of fields per instance
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether the named method exists
    pub fn has_method(&self, name: &str) -> bool {
        self.method_index.contains_key(name)
    }

    /// Whether the named property exists
    pub fn has_property(&self, name: &str) -> bool {
        self.property_index.contains_key(name)
    }

    pub(crate) fn method_slot(&self, name: &str) -> Option<&WovenMethod> {
        self.method_index.get(name).map(|&i| &self.methods[i])
    }

    pub(crate) fn property_slot(&self, name: &str) -> Option<&WovenProperty> {
        self.property_index.get(name).map(|&i| &self.properties[i])
    }

    /// Fresh field vector holding every field's declared default
    pub(crate) fn default_fields(&self) -> Vec<Value> {
        self.fields.iter().map(|f| f.default.clone()).collect()
    }

    /// Check an argument list against a declared parameter count.
    ///
    /// Exact matches pass through. Under strict arity any mismatch is a
    /// contract violation; otherwise missing arguments are padded with
    /// nulls (surplus arguments are always rejected).
    pub(crate) fn normalize_args(
        &self,
        member: &str,
        expected: usize,
        args: &[Value],
    ) -> CallResult<Vec<Value>> {
        if args.len() == expected {
            return Ok(args.to_vec());
        }
        if self.strict_arity || args.len() > expected {
            return Err(ContractViolation::ArityMismatch {
                member: format!("{}::{}", self.name, member),
                expected,
                got: args.len(),
            }
            .into());
        }
        let mut padded = args.to_vec();
        padded.resize(expected, Value::Null);
        Ok(padded)
    }

    /// Populate the instance's proxy registry with one proxy per
    /// intercepted member, then hand every fresh proxy to the aspect
    /// registry.
    pub(crate) fn populate_proxies(&self, instance: &Instance) {
        let mut method_proxies = Vec::new();
        for method in self.methods.iter().filter(|m| m.intercepted) {
            let proxy = Arc::new(MethodProxy::new(
                method.descriptor.clone(),
                method.raw.clone(),
                method.accepts_null,
            ));
            instance
                .proxies()
                .add_method(method.descriptor.name(), proxy.clone());
            method_proxies.push(proxy);
        }

        let mut property_proxies = Vec::new();
        for property in self.properties.iter().filter(|p| p.intercepted) {
            let proxy = Arc::new(PropertyProxy::new(
                property.descriptor.clone(),
                property.getter.clone(),
                property.setter.clone(),
                property.accepts_null,
            ));
            instance
                .proxies()
                .add_property(property.descriptor.name(), proxy.clone());
            property_proxies.push(proxy);
        }

        for proxy in &method_proxies {
            self.aspects.apply_method(proxy);
        }
        for proxy in &property_proxies {
            self.aspects.apply_property(proxy);
        }
    }
}

impl std::fmt::Debug for WovenClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WovenClass")
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods.len())
            .field("properties", &self.properties.len())
            .field("passthrough", &self.passthrough)
            .finish()
    }
}
