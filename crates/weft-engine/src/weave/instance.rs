//! Instances and the construction path
//!
//! An [`Instance`] is a runtime object of a woven class: a field vector plus
//! its own proxy registry. Construction runs the declared constructor body,
//! then populates one member proxy per intercepted member, then lets the
//! aspect registry customize every fresh proxy — all before the instance is
//! handed to the caller.
//!
//! Dispatch goes through [`Instance::call`], [`Instance::get`] and
//! [`Instance::set`]: intercepted members route through their proxy's
//! pipeline, everything else calls the member body directly.

use std::sync::Arc;

use parking_lot::Mutex;

use weft_sdk::{Exception, Value};

use crate::error::{CallError, CallResult, ContractViolation};
use crate::proxy::{MethodProxy, PropertyProxy, ProxyRegistry};
use crate::weave::WovenClass;

/// Discovery interface exposed by every woven instance.
///
/// External code uses this to reach a member's proxy and subscribe hooks.
/// `None` means the member was never marked interceptable (or its proxy was
/// explicitly removed).
pub trait ProxiedObject {
    /// The proxy intercepting the named method
    fn method_proxy(&self, name: &str) -> Option<Arc<MethodProxy>>;

    /// The proxy intercepting the named property
    fn property_proxy(&self, name: &str) -> Option<Arc<PropertyProxy>>;
}

/// A runtime object of a woven class.
pub struct Instance {
    class: Arc<WovenClass>,
    fields: Mutex<Vec<Value>>,
    proxies: ProxyRegistry,
}

impl Instance {
    /// Construct through the default constructor (index 0).
    pub fn construct(class: &Arc<WovenClass>, args: &[Value]) -> CallResult<Arc<Self>> {
        Self::construct_with(class, 0, args)
    }

    /// Construct through the constructor at `index`.
    pub fn construct_with(
        class: &Arc<WovenClass>,
        index: usize,
        args: &[Value],
    ) -> CallResult<Arc<Self>> {
        let ctor = class
            .constructors
            .get(index)
            .ok_or(ContractViolation::UnknownConstructor {
                class: class.name().to_string(),
                index,
            })?;
        let args = class.normalize_args(
            &format!("constructor[{}]", index),
            ctor.params.len(),
            args,
        )?;

        let instance = Arc::new(Self {
            class: class.clone(),
            fields: Mutex::new(class.default_fields()),
            proxies: ProxyRegistry::new(),
        });

        (ctor.body)(&instance, &args).map_err(CallError::Raised)?;

        if !(class.is_passthrough() && class.collapse) {
            class.populate_proxies(&instance);
        }

        Ok(instance)
    }

    /// The woven class this instance belongs to
    pub fn class(&self) -> &Arc<WovenClass> {
        &self.class
    }

    /// This instance's proxy registry
    pub fn proxies(&self) -> &ProxyRegistry {
        &self.proxies
    }

    /// Read a field by name
    pub fn field(&self, name: &str) -> Option<Value> {
        let slot = self.class.field_index.get(name)?;
        Some(self.fields.lock()[*slot].clone())
    }

    /// Write a field by name
    pub fn set_field(&self, name: &str, value: Value) -> Result<(), Exception> {
        match self.class.field_index.get(name) {
            Some(&slot) => {
                self.fields.lock()[slot] = value;
                Ok(())
            }
            None => Err(Exception::new(format!(
                "unknown field '{}' on class '{}'",
                name,
                self.class.name()
            ))),
        }
    }

    pub(crate) fn field_by_slot(&self, slot: usize) -> Value {
        self.fields.lock()[slot].clone()
    }

    pub(crate) fn set_field_by_slot(&self, slot: usize, value: Value) {
        self.fields.lock()[slot] = value;
    }

    /// Call a method.
    ///
    /// An intercepted method routes through its proxy pipeline; any other
    /// method calls its body directly.
    pub fn call(&self, method: &str, args: &[Value]) -> CallResult<Value> {
        let slot =
            self.class
                .method_slot(method)
                .ok_or_else(|| ContractViolation::UnknownMember {
                    kind: "method",
                    class: self.class.name().to_string(),
                    member: method.to_string(),
                })?;
        let args = self.class.normalize_args(method, slot.arity, args)?;

        if slot.intercepted {
            if let Some(proxy) = self.proxies.method(method) {
                return proxy.invoke(self, &args);
            }
        }
        (slot.raw)(self, &args).map_err(CallError::Raised)
    }

    /// Read a property.
    pub fn get(&self, property: &str) -> CallResult<Value> {
        let slot =
            self.class
                .property_slot(property)
                .ok_or_else(|| ContractViolation::UnknownMember {
                    kind: "property",
                    class: self.class.name().to_string(),
                    member: property.to_string(),
                })?;

        if slot.intercepted {
            if let Some(proxy) = self.proxies.property(property) {
                return proxy.get(self);
            }
        }
        let getter = slot.getter.as_ref().ok_or_else(|| {
            CallError::from(ContractViolation::WriteOnly(slot.descriptor.qualified_name()))
        })?;
        getter(self).map_err(CallError::Raised)
    }

    /// Write a property.
    pub fn set(&self, property: &str, value: Value) -> CallResult<()> {
        let slot =
            self.class
                .property_slot(property)
                .ok_or_else(|| ContractViolation::UnknownMember {
                    kind: "property",
                    class: self.class.name().to_string(),
                    member: property.to_string(),
                })?;

        if slot.intercepted {
            if let Some(proxy) = self.proxies.property(property) {
                return proxy.set(self, value);
            }
        }
        let setter = slot.setter.as_ref().ok_or_else(|| {
            CallError::from(ContractViolation::ReadOnly(slot.descriptor.qualified_name()))
        })?;
        setter(self, value).map_err(CallError::Raised)
    }
}

impl ProxiedObject for Instance {
    fn method_proxy(&self, name: &str) -> Option<Arc<MethodProxy>> {
        self.proxies.method(name)
    }

    fn property_proxy(&self, name: &str) -> Option<Arc<PropertyProxy>> {
        self.proxies.property(name)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class.name())
            .field("fields", &self.fields.lock().len())
            .field("proxies", &self.proxies)
            .finish()
    }
}
