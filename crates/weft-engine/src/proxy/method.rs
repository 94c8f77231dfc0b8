//! Method proxy and invocation pipeline
//!
//! One proxy per intercepted method per instance. A call runs a three-stage
//! pipeline over a fresh [`InvokeContext`]:
//!
//! 1. pre hooks, in registration order;
//! 2. the raw implementation, unless a hook skipped or interrupted it;
//! 3. post hooks, in registration order.
//!
//! A pending exception ends the pipeline as soon as the stage that raised it
//! finishes. An interrupt ends the pipeline before stage 2 and suppresses
//! stage 3. A skip suppresses only stage 2. The result leaving any stage
//! boundary must be non-null unless the member's declared type accepts null.

use parking_lot::Mutex;
use tracing::trace;
use weft_sdk::{InvokeContext, MemberDescriptor, MethodHook, MethodSite, Value};

use crate::error::{CallError, CallResult, ContractViolation};
use crate::model::MethodBody;
use crate::weave::Instance;

/// Interception unit for one method on one instance.
pub struct MethodProxy {
    descriptor: MemberDescriptor,
    raw: MethodBody,
    accepts_null: bool,
    pre: Mutex<Vec<MethodHook>>,
    post: Mutex<Vec<MethodHook>>,
}

impl MethodProxy {
    /// Create a proxy wired to its raw invoker.
    ///
    /// `accepts_null` is computed once by the weaver from the member's
    /// declared return type and governs every call through this proxy.
    pub(crate) fn new(descriptor: MemberDescriptor, raw: MethodBody, accepts_null: bool) -> Self {
        Self {
            descriptor,
            raw,
            accepts_null,
            pre: Mutex::new(Vec::new()),
            post: Mutex::new(Vec::new()),
        }
    }

    /// The member this proxy intercepts
    pub fn descriptor(&self) -> &MemberDescriptor {
        &self.descriptor
    }

    /// Whether a null result satisfies the member's declared type
    pub fn accepts_null(&self) -> bool {
        self.accepts_null
    }

    /// Number of registered pre hooks
    pub fn pre_hook_count(&self) -> usize {
        self.pre.lock().len()
    }

    /// Number of registered post hooks
    pub fn post_hook_count(&self) -> usize {
        self.post.lock().len()
    }

    /// Run one call through the pipeline.
    pub fn invoke(&self, instance: &Instance, args: &[Value]) -> CallResult<Value> {
        let mut ctx = InvokeContext::new(args.to_vec());

        trace!(member = %self.descriptor.qualified_name(), "invoke: pre hooks");
        let pre = self.pre.lock().clone();
        for hook in &pre {
            hook(&mut ctx);
        }
        if let Some(exception) = ctx.take_raising() {
            return Err(CallError::Raised(exception));
        }
        if ctx.is_interrupted() {
            trace!(member = %self.descriptor.qualified_name(), "invoke: interrupted");
            return self.admit(ctx.take_result());
        }

        if ctx.is_skipped() {
            trace!(member = %self.descriptor.qualified_name(), "invoke: raw skipped");
        } else {
            let result = (self.raw)(instance, ctx.args()).map_err(CallError::Raised)?;
            ctx.set_result(result);
        }
        self.ensure_result(&ctx)?;

        trace!(member = %self.descriptor.qualified_name(), "invoke: post hooks");
        let post = self.post.lock().clone();
        for hook in &post {
            hook(&mut ctx);
        }
        if let Some(exception) = ctx.take_raising() {
            return Err(CallError::Raised(exception));
        }

        self.admit(ctx.take_result())
    }

    fn violation(&self) -> ContractViolation {
        ContractViolation::NullResult {
            member: self.descriptor.qualified_name(),
            declared: self.descriptor.declared().name.clone(),
        }
    }

    fn ensure_result(&self, ctx: &InvokeContext) -> CallResult<()> {
        if ctx.result().is_null() && !self.accepts_null {
            return Err(self.violation().into());
        }
        Ok(())
    }

    fn admit(&self, result: Value) -> CallResult<Value> {
        if result.is_null() && !self.accepts_null {
            return Err(self.violation().into());
        }
        Ok(result)
    }
}

impl MethodSite for MethodProxy {
    fn descriptor(&self) -> &MemberDescriptor {
        &self.descriptor
    }

    fn on_invoking(&self, hook: MethodHook) {
        self.pre.lock().push(hook);
    }

    fn on_invoked(&self, hook: MethodHook) {
        self.post.lock().push(hook);
    }
}

impl std::fmt::Debug for MethodProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodProxy")
            .field("member", &self.descriptor.qualified_name())
            .field("accepts_null", &self.accepts_null)
            .field("pre_hooks", &self.pre.lock().len())
            .field("post_hooks", &self.post.lock().len())
            .finish()
    }
}
