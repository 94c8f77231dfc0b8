//! Property proxy and access pipelines
//!
//! One proxy per intercepted property per instance, running two symmetric
//! pipelines over a fresh [`AccessContext`] per access:
//!
//! - get: getting hooks → real get (unless skipped/interrupted) →
//!   after-getting hooks;
//! - set: setting hooks → real set (unless skipped/interrupted) →
//!   after-setting hooks.
//!
//! A read through a property with no getter, or a write through one with no
//! setter, is a contract violation raised before any hook runs.

use parking_lot::Mutex;
use tracing::trace;
use weft_sdk::{AccessContext, MemberDescriptor, PropertyHook, PropertySite, Value};

use crate::error::{CallError, CallResult, ContractViolation};
use crate::model::{GetterBody, SetterBody};
use crate::weave::Instance;

/// Interception unit for one property on one instance.
pub struct PropertyProxy {
    descriptor: MemberDescriptor,
    getter: Option<GetterBody>,
    setter: Option<SetterBody>,
    accepts_null: bool,
    getting: Mutex<Vec<PropertyHook>>,
    after_getting: Mutex<Vec<PropertyHook>>,
    setting: Mutex<Vec<PropertyHook>>,
    after_setting: Mutex<Vec<PropertyHook>>,
}

impl PropertyProxy {
    /// Create a proxy wired to its raw accessors.
    pub(crate) fn new(
        descriptor: MemberDescriptor,
        getter: Option<GetterBody>,
        setter: Option<SetterBody>,
        accepts_null: bool,
    ) -> Self {
        Self {
            descriptor,
            getter,
            setter,
            accepts_null,
            getting: Mutex::new(Vec::new()),
            after_getting: Mutex::new(Vec::new()),
            setting: Mutex::new(Vec::new()),
            after_setting: Mutex::new(Vec::new()),
        }
    }

    /// The member this proxy intercepts
    pub fn descriptor(&self) -> &MemberDescriptor {
        &self.descriptor
    }

    /// Whether a null value satisfies the property's declared type
    pub fn accepts_null(&self) -> bool {
        self.accepts_null
    }

    /// Whether the property can be read
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }

    /// Whether the property can be written
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }

    /// Run one read through the get pipeline.
    pub fn get(&self, instance: &Instance) -> CallResult<Value> {
        let getter = self.getter.as_ref().ok_or_else(|| {
            CallError::from(ContractViolation::WriteOnly(self.descriptor.qualified_name()))
        })?;

        let mut ctx = AccessContext::new(Value::Null);

        trace!(member = %self.descriptor.qualified_name(), "get: getting hooks");
        let getting = self.getting.lock().clone();
        for hook in &getting {
            hook(&mut ctx);
        }
        if let Some(exception) = ctx.take_raising() {
            return Err(CallError::Raised(exception));
        }
        if ctx.is_interrupted() {
            return self.admit(ctx.take_value());
        }

        if !ctx.is_skipped() {
            let value = getter(instance).map_err(CallError::Raised)?;
            ctx.set_value(value);
        }
        self.ensure_value(&ctx)?;

        trace!(member = %self.descriptor.qualified_name(), "get: after-getting hooks");
        let after = self.after_getting.lock().clone();
        for hook in &after {
            hook(&mut ctx);
        }
        if let Some(exception) = ctx.take_raising() {
            return Err(CallError::Raised(exception));
        }

        self.admit(ctx.take_value())
    }

    /// Run one write through the set pipeline.
    pub fn set(&self, instance: &Instance, value: Value) -> CallResult<()> {
        let setter = self.setter.as_ref().ok_or_else(|| {
            CallError::from(ContractViolation::ReadOnly(self.descriptor.qualified_name()))
        })?;

        let mut ctx = AccessContext::new(value);

        trace!(member = %self.descriptor.qualified_name(), "set: setting hooks");
        let setting = self.setting.lock().clone();
        for hook in &setting {
            hook(&mut ctx);
        }
        if let Some(exception) = ctx.take_raising() {
            return Err(CallError::Raised(exception));
        }
        if ctx.is_interrupted() {
            return Ok(());
        }

        if !ctx.is_skipped() {
            self.ensure_value(&ctx)?;
            setter(instance, ctx.value().clone()).map_err(CallError::Raised)?;
        }

        trace!(member = %self.descriptor.qualified_name(), "set: after-setting hooks");
        let after = self.after_setting.lock().clone();
        for hook in &after {
            hook(&mut ctx);
        }
        if let Some(exception) = ctx.take_raising() {
            return Err(CallError::Raised(exception));
        }

        Ok(())
    }

    fn violation(&self) -> ContractViolation {
        ContractViolation::NullResult {
            member: self.descriptor.qualified_name(),
            declared: self.descriptor.declared().name.clone(),
        }
    }

    fn ensure_value(&self, ctx: &AccessContext) -> CallResult<()> {
        if ctx.value().is_null() && !self.accepts_null {
            return Err(self.violation().into());
        }
        Ok(())
    }

    fn admit(&self, value: Value) -> CallResult<Value> {
        if value.is_null() && !self.accepts_null {
            return Err(self.violation().into());
        }
        Ok(value)
    }
}

impl PropertySite for PropertyProxy {
    fn descriptor(&self) -> &MemberDescriptor {
        &self.descriptor
    }

    fn on_getting(&self, hook: PropertyHook) {
        self.getting.lock().push(hook);
    }

    fn on_after_getting(&self, hook: PropertyHook) {
        self.after_getting.lock().push(hook);
    }

    fn on_setting(&self, hook: PropertyHook) {
        self.setting.lock().push(hook);
    }

    fn on_after_setting(&self, hook: PropertyHook) {
        self.after_setting.lock().push(hook);
    }
}

impl std::fmt::Debug for PropertyProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyProxy")
            .field("member", &self.descriptor.qualified_name())
            .field("accepts_null", &self.accepts_null)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}
