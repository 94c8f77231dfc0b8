//! Per-call contexts passed through interception pipelines
//!
//! A context is created at call entry, owned by the calling thread, mutated
//! in place by each hook in registration order, and discarded at call exit.
//! It is never persisted or shared across calls.
//!
//! Control flags:
//! - `skip()` — the real implementation is not invoked; post hooks still run.
//! - `interrupt()` — the pipeline ends; neither the real implementation nor
//!   the post hooks run.
//! - `raise(..)` — the exception propagates to the caller once the current
//!   hook stage has finished running.

use std::sync::Arc;

use crate::error::Exception;
use crate::value::Value;

/// Mutable per-call record for a method invocation.
#[derive(Debug)]
pub struct InvokeContext {
    args: Vec<Value>,
    result: Value,
    interrupted: bool,
    skipped: bool,
    raising: Option<Exception>,
}

impl InvokeContext {
    /// Create a fresh context from the call arguments
    pub fn new(args: Vec<Value>) -> Self {
        Self {
            args,
            result: Value::Null,
            interrupted: false,
            skipped: false,
            raising: None,
        }
    }

    /// The current argument list
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Mutable access to the argument list
    pub fn args_mut(&mut self) -> &mut Vec<Value> {
        &mut self.args
    }

    /// Get one argument by position
    pub fn arg(&self, index: usize) -> Option<&Value> {
        self.args.get(index)
    }

    /// Replace one argument by position. Returns false if out of range.
    pub fn set_arg(&mut self, index: usize, value: Value) -> bool {
        match self.args.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The current result value
    pub fn result(&self) -> &Value {
        &self.result
    }

    /// Overwrite the result value
    pub fn set_result(&mut self, value: Value) {
        self.result = value;
    }

    /// Take the result value out, leaving null
    pub fn take_result(&mut self) -> Value {
        std::mem::take(&mut self.result)
    }

    /// Abort the entire remaining pipeline, including post hooks
    pub fn interrupt(&mut self) {
        self.interrupted = true;
    }

    /// Whether the pipeline was interrupted
    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Abort only the real invocation; post hooks still run
    pub fn skip(&mut self) {
        self.skipped = true;
    }

    /// Whether the real invocation was skipped
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Raise an exception toward the caller
    pub fn raise(&mut self, exception: Exception) {
        self.raising = Some(exception);
    }

    /// The pending exception, if any
    pub fn raising(&self) -> Option<&Exception> {
        self.raising.as_ref()
    }

    /// Take the pending exception out
    pub fn take_raising(&mut self) -> Option<Exception> {
        self.raising.take()
    }
}

/// Mutable per-call record for a property access.
///
/// For a read, `value` starts null and carries the read result; for a write
/// it carries the value being written. Hooks mutate it in place.
#[derive(Debug)]
pub struct AccessContext {
    value: Value,
    interrupted: bool,
    skipped: bool,
    raising: Option<Exception>,
}

impl AccessContext {
    /// Create a fresh context carrying the accessed value
    pub fn new(value: Value) -> Self {
        Self {
            value,
            interrupted: false,
            skipped: false,
            raising: None,
        }
    }

    /// The value being read or written
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Overwrite the value
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Take the value out, leaving null
    pub fn take_value(&mut self) -> Value {
        std::mem::take(&mut self.value)
    }

    /// Abort the entire remaining pipeline, including post hooks
    pub fn interrupt(&mut self) {
        self.interrupted = true;
    }

    /// Whether the pipeline was interrupted
    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// Abort only the real accessor; post hooks still run
    pub fn skip(&mut self) {
        self.skipped = true;
    }

    /// Whether the real accessor was skipped
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Raise an exception toward the caller
    pub fn raise(&mut self, exception: Exception) {
        self.raising = Some(exception);
    }

    /// The pending exception, if any
    pub fn raising(&self) -> Option<&Exception> {
        self.raising.as_ref()
    }

    /// Take the pending exception out
    pub fn take_raising(&mut self) -> Option<Exception> {
        self.raising.take()
    }
}

/// A hook observing and mutating a method invocation context.
///
/// Hooks run synchronously, one at a time, in registration order; each hook
/// observes the cumulative mutations of all hooks before it.
pub type MethodHook = Arc<dyn Fn(&mut InvokeContext) + Send + Sync>;

/// A hook observing and mutating a property access context.
pub type PropertyHook = Arc<dyn Fn(&mut AccessContext) + Send + Sync>;
