//! Aspect handler plugin surface
//!
//! An aspect handler customizes the member proxies generated for members
//! carrying one of its trigger markers, typically by subscribing extra
//! pre/post hooks. Handlers program against the abstract [`MethodSite`] and
//! [`PropertySite`] traits; the engine provides the concrete proxy types and
//! never leaks its internals into plugin code.
//!
//! Handlers reach the engine two ways:
//! - direct binding on the engine's aspect registry, or
//! - discovery: a [`CandidateSource`] (the plugin module collaborator)
//!   enumerates [`HandlerCandidate`]s, instantiated once and cached.
//!   A candidate whose factory fails is skipped with a warning; it does not
//!   abort the installation of other handlers.

use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::context::{MethodHook, PropertyHook};
use crate::types::MemberDescriptor;

// ============================================================================
// Trigger markers
// ============================================================================

/// A declarative marker attached to a member.
///
/// Handlers bind to marker *types*; members carry marker *instances*.
pub trait Marker: Any + Send + Sync {
    /// Marker name for diagnostics and reports
    fn name(&self) -> &str;
}

impl dyn Marker {
    /// The key of this marker instance's concrete type
    pub fn key(&self) -> MarkerKey {
        let any: &dyn Any = self;
        MarkerKey(Any::type_id(any))
    }
}

/// Identity of a marker type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerKey(TypeId);

impl MarkerKey {
    /// Key of the marker type `M`
    pub fn of<M: Marker>() -> Self {
        MarkerKey(TypeId::of::<M>())
    }
}

// ============================================================================
// Proxy sites
// ============================================================================

/// Abstract surface of a method proxy, as seen by aspect handlers.
///
/// The engine implements this for its method proxy type. Hooks subscribed
/// here run in subscription order, after any hooks already present.
pub trait MethodSite {
    /// The member this proxy intercepts
    fn descriptor(&self) -> &MemberDescriptor;

    /// Subscribe a hook to run before the real invocation
    fn on_invoking(&self, hook: MethodHook);

    /// Subscribe a hook to run after the real invocation
    fn on_invoked(&self, hook: MethodHook);
}

/// Abstract surface of a property proxy, as seen by aspect handlers.
pub trait PropertySite {
    /// The member this proxy intercepts
    fn descriptor(&self) -> &MemberDescriptor;

    /// Subscribe a hook to run before the real get
    fn on_getting(&self, hook: PropertyHook);

    /// Subscribe a hook to run after the real get
    fn on_after_getting(&self, hook: PropertyHook);

    /// Subscribe a hook to run before the real set
    fn on_setting(&self, hook: PropertyHook);

    /// Subscribe a hook to run after the real set
    fn on_after_setting(&self, hook: PropertyHook);
}

// ============================================================================
// Aspect handlers
// ============================================================================

/// External code that customizes member proxies matching a trigger marker.
///
/// Handlers are instantiated once and shared process-wide; by convention
/// they hold no per-member state. The engine invokes the matching apply
/// entry point once per fresh proxy whose member carries one of the
/// handler's trigger markers.
pub trait AspectHandler: Send + Sync {
    /// Marker types that activate this handler
    fn triggers(&self) -> Vec<MarkerKey>;

    /// Customize a freshly created method proxy
    fn apply_method(&self, site: &dyn MethodSite) {
        let _ = site;
    }

    /// Customize a freshly created property proxy
    fn apply_property(&self, site: &dyn PropertySite) {
        let _ = site;
    }
}

// ============================================================================
// Handler discovery (plugin module collaborator)
// ============================================================================

/// Factory producing one handler instance.
pub type HandlerFactory =
    Arc<dyn Fn() -> Result<Arc<dyn AspectHandler>, String> + Send + Sync>;

/// A handler class found in a plugin module, not yet instantiated.
#[derive(Clone)]
pub struct HandlerCandidate {
    name: String,
    factory: HandlerFactory,
}

impl HandlerCandidate {
    /// Create a candidate from a name and a factory
    pub fn new(
        name: impl Into<String>,
        factory: impl Fn() -> Result<Arc<dyn AspectHandler>, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Candidate name for diagnostics
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Instantiate the handler
    pub fn instantiate(&self) -> Result<Arc<dyn AspectHandler>, String> {
        (self.factory)()
    }
}

impl std::fmt::Debug for HandlerCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerCandidate")
            .field("name", &self.name)
            .finish()
    }
}

/// Supplies the set of handler candidates to scan.
///
/// How the set is produced (build-time registry, module scan, explicit
/// list) is the caller's concern; the engine only consumes the enumeration.
pub trait CandidateSource: Send + Sync {
    /// Enumerate the current candidates
    fn candidates(&self) -> Vec<HandlerCandidate>;
}

impl CandidateSource for Vec<HandlerCandidate> {
    fn candidates(&self) -> Vec<HandlerCandidate> {
        self.clone()
    }
}
