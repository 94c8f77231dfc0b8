//! Aspect handler registry
//!
//! Binds aspect handlers to trigger marker types and applies every matching
//! handler to every fresh member proxy whose member carries one of those
//! markers.
//!
//! Handlers arrive two ways:
//! - direct binding (`bind` / `register`), removable with `unbind`;
//! - discovery over an injected [`CandidateSource`]: runs lazily exactly
//!   once, before the first class is woven; `rescan` re-runs it explicitly
//!   and replaces the discovered binding set wholesale, leaving direct
//!   bindings untouched. A candidate that fails to instantiate is skipped
//!   with a warning and does not abort the installation of the others.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use weft_sdk::{AspectHandler, CandidateSource, Marker, MarkerKey};

use crate::proxy::{MethodProxy, PropertyProxy};

type HandlerMap = FxHashMap<MarkerKey, Vec<Arc<dyn AspectHandler>>>;

/// Registry of aspect handlers keyed by trigger marker type.
#[derive(Default)]
pub struct AspectRegistry {
    direct: RwLock<HandlerMap>,
    discovered: RwLock<HandlerMap>,
    source: Option<Arc<dyn CandidateSource>>,
    scanned: OnceCell<()>,
}

impl AspectRegistry {
    /// Create a registry with no candidate source
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry that discovers handlers from `source`
    pub fn with_source(source: Arc<dyn CandidateSource>) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    /// Bind a handler to the marker type `M`
    pub fn bind<M: Marker>(&self, handler: Arc<dyn AspectHandler>) {
        self.bind_key(MarkerKey::of::<M>(), handler);
    }

    /// Bind a handler to a marker key
    pub fn bind_key(&self, key: MarkerKey, handler: Arc<dyn AspectHandler>) {
        self.direct.write().entry(key).or_default().push(handler);
    }

    /// Bind a handler to every marker type it declares as a trigger
    pub fn register(&self, handler: Arc<dyn AspectHandler>) {
        for key in handler.triggers() {
            self.bind_key(key, handler.clone());
        }
    }

    /// Remove every binding for the marker type `M`.
    ///
    /// Returns true if any binding (direct or discovered) was removed.
    pub fn unbind<M: Marker>(&self) -> bool {
        let key = MarkerKey::of::<M>();
        let direct = self.direct.write().remove(&key).is_some();
        let discovered = self.discovered.write().remove(&key).is_some();
        direct || discovered
    }

    /// Handlers bound to a marker key, direct bindings first
    pub fn handlers_for(&self, key: MarkerKey) -> Vec<Arc<dyn AspectHandler>> {
        self.collect(&[key])
    }

    /// Total number of (marker, handler) bindings
    pub fn binding_count(&self) -> usize {
        let direct: usize = self.direct.read().values().map(Vec::len).sum();
        let discovered: usize = self.discovered.read().values().map(Vec::len).sum();
        direct + discovered
    }

    /// Run discovery if it has not run yet.
    ///
    /// Idempotent and safe under concurrent first use: the scan runs at
    /// most once no matter how many threads race here.
    pub fn ensure_discovered(&self) {
        self.scanned.get_or_init(|| self.scan());
    }

    /// Re-run discovery explicitly, replacing the discovered binding set
    pub fn rescan(&self) {
        self.scanned.get_or_init(|| ());
        self.scan();
    }

    fn scan(&self) {
        let Some(source) = &self.source else {
            return;
        };

        let mut map: HandlerMap = FxHashMap::default();
        for candidate in source.candidates() {
            match candidate.instantiate() {
                Ok(handler) => {
                    debug!(candidate = candidate.name(), "installed aspect handler");
                    for key in handler.triggers() {
                        map.entry(key).or_default().push(handler.clone());
                    }
                }
                Err(reason) => {
                    warn!(
                        candidate = candidate.name(),
                        %reason,
                        "skipping aspect handler candidate"
                    );
                }
            }
        }
        *self.discovered.write() = map;
    }

    /// Apply every handler matching the member's markers to a fresh method
    /// proxy.
    pub fn apply_method(&self, proxy: &MethodProxy) {
        for handler in self.collect(&proxy.descriptor().marker_keys()) {
            handler.apply_method(proxy);
        }
    }

    /// Apply every handler matching the member's markers to a fresh
    /// property proxy.
    pub fn apply_property(&self, proxy: &PropertyProxy) {
        for handler in self.collect(&proxy.descriptor().marker_keys()) {
            handler.apply_property(proxy);
        }
    }

    /// Collect the handlers bound to any of `keys`, deduplicated by handler
    /// identity so a handler bound to several of the member's markers runs
    /// once.
    fn collect(&self, keys: &[MarkerKey]) -> Vec<Arc<dyn AspectHandler>> {
        let direct = self.direct.read();
        let discovered = self.discovered.read();

        let mut out: Vec<Arc<dyn AspectHandler>> = Vec::new();
        for key in keys {
            let bound = direct
                .get(key)
                .into_iter()
                .flatten()
                .chain(discovered.get(key).into_iter().flatten());
            for handler in bound {
                let ptr = Arc::as_ptr(handler) as *const ();
                if !out.iter().any(|h| Arc::as_ptr(h) as *const () == ptr) {
                    out.push(handler.clone());
                }
            }
        }
        out
    }
}

impl std::fmt::Debug for AspectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AspectRegistry")
            .field("direct_keys", &self.direct.read().len())
            .field("discovered_keys", &self.discovered.read().len())
            .field("scanned", &self.scanned.get().is_some())
            .finish()
    }
}
