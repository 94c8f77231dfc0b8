//! Weft SDK - Lightweight SDK for writing aspect handler plugins
//!
//! This crate provides the minimal types and traits needed to write weft
//! aspect handlers without depending on the full weft-engine.
//!
//! # Example
//!
//! ```ignore
//! use weft_sdk::{AspectHandler, Marker, MarkerKey, MethodSite, Value};
//! use std::sync::Arc;
//!
//! struct Logged;
//!
//! impl Marker for Logged {
//!     fn name(&self) -> &str {
//!         "Logged"
//!     }
//! }
//!
//! struct LoggingHandler;
//!
//! impl AspectHandler for LoggingHandler {
//!     fn triggers(&self) -> Vec<MarkerKey> {
//!         vec![MarkerKey::of::<Logged>()]
//!     }
//!
//!     fn apply_method(&self, site: &dyn MethodSite) {
//!         let member = site.descriptor().qualified_name();
//!         site.on_invoking(Arc::new(move |ctx| {
//!             println!("calling {} with {} args", member, ctx.args().len());
//!         }));
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod context;
mod convert;
mod error;
mod handler;
mod types;
mod value;

pub use context::{AccessContext, InvokeContext, MethodHook, PropertyHook};
pub use convert::{FromValue, IntoValue};
pub use error::Exception;
pub use handler::{
    AspectHandler, CandidateSource, HandlerCandidate, HandlerFactory, Marker, MarkerKey,
    MethodSite, PropertySite,
};
pub use types::{MemberDescriptor, MemberKind, ParamInfo, TypeTag};
pub use value::Value;
