//! Weft Interception Engine
//!
//! This crate provides the complete weft runtime:
//! - **Model**: explicit class and member definitions (`model` module)
//! - **Weave**: class synthesis, instances, and the weaver cache (`weave`
//!   module)
//! - **Proxy**: member proxies, hook pipelines, and the per-instance proxy
//!   registry (`proxy` module)
//! - **Aspect**: marker-triggered handler registry (`aspect` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use weft_engine::{ClassDef, ConstructorDef, Instance, MethodDef, WeaverCache};
//! use weft_engine::{ProxiedObject, TypeTag, Value};
//! use std::sync::Arc;
//!
//! let def = ClassDef::new("Greeter")
//!     .constructor(ConstructorDef::empty())
//!     .method(
//!         MethodDef::new("echo", |_, args| Ok(args[0].clone()))
//!             .param("text", TypeTag::named("string"))
//!             .returns(TypeTag::named("string"))
//!             .intercepted(),
//!     );
//!
//! let cache = WeaverCache::new();
//! let woven = cache.get_or_weave(def).unwrap();
//! let greeter = Instance::construct(&woven, &[]).unwrap();
//!
//! greeter
//!     .method_proxy("echo")
//!     .unwrap()
//!     .on_invoking(Arc::new(|ctx| {
//!         ctx.set_arg(0, Value::str("X"));
//!     }));
//!
//! let out = greeter.call("echo", &[Value::str("hello")]).unwrap();
//! assert_eq!(out, Value::str("X"));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

/// Aspect handler registry
pub mod aspect;

/// Engine error taxonomy
pub mod error;

/// Class and member definitions
pub mod model;

/// Member proxies and the per-instance proxy registry
pub mod proxy;

/// Class reports for debugging and tooling
pub mod report;

/// The weaver, woven classes, instances, and the weaver cache
pub mod weave;

// ============================================================================
// Re-exports
// ============================================================================

pub use aspect::AspectRegistry;
pub use error::{CallError, CallResult, ContractViolation, WeaveError, WeaveResult};
pub use model::{
    ClassDef, ConstructorBody, ConstructorDef, FieldDef, GetterBody, Intercept, MethodBody,
    MethodDef, PropertyDef, SetterBody,
};
pub use proxy::{MethodProxy, PropertyProxy, ProxyRegistry};
pub use report::{ClassReport, MemberReport, MemberReportKind};
pub use weave::{Instance, ProxiedObject, Weaver, WeaverCache, WeaverOptions, WovenClass};

// Plugin surface types, re-exported so engine users need only one import.
pub use weft_sdk::{
    AccessContext, AspectHandler, CandidateSource, Exception, FromValue, HandlerCandidate,
    HandlerFactory, IntoValue, InvokeContext, Marker, MarkerKey, MemberDescriptor, MemberKind,
    MethodHook, MethodSite, ParamInfo, PropertyHook, PropertySite, TypeTag, Value,
};
