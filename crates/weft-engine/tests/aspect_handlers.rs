//! Aspect handler discovery and application through the full weave path.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use weft_engine::{
    AspectHandler, AspectRegistry, ClassDef, ConstructorDef, FieldDef, HandlerCandidate, Instance,
    Marker, MarkerKey, MethodDef, MethodSite, PropertyDef, PropertySite, TypeTag, Value, Weaver,
    WeaverCache,
};

struct Audited;
struct Clamped;

impl Marker for Audited {
    fn name(&self) -> &str {
        "Audited"
    }
}

impl Marker for Clamped {
    fn name(&self) -> &str {
        "Clamped"
    }
}

/// Counts every call through members marked `Audited`.
struct AuditHandler {
    applied: AtomicUsize,
    calls: Arc<AtomicUsize>,
}

impl AuditHandler {
    fn new(calls: Arc<AtomicUsize>) -> Self {
        Self {
            applied: AtomicUsize::new(0),
            calls,
        }
    }
}

impl AspectHandler for AuditHandler {
    fn triggers(&self) -> Vec<MarkerKey> {
        vec![MarkerKey::of::<Audited>()]
    }

    fn apply_method(&self, site: &dyn MethodSite) {
        self.applied.fetch_add(1, Ordering::SeqCst);
        let calls = self.calls.clone();
        site.on_invoking(Arc::new(move |_| {
            calls.fetch_add(1, Ordering::SeqCst);
        }));
    }
}

/// Clamps values written through properties marked `Clamped` to 0..=100.
struct ClampHandler;

impl AspectHandler for ClampHandler {
    fn triggers(&self) -> Vec<MarkerKey> {
        vec![MarkerKey::of::<Clamped>()]
    }

    fn apply_property(&self, site: &dyn PropertySite) {
        site.on_setting(Arc::new(|ctx| {
            if let Some(v) = ctx.value().as_int() {
                ctx.set_value(Value::int(v.clamp(0, 100)));
            }
        }));
    }
}

fn meter_def() -> ClassDef {
    ClassDef::new("Meter")
        .field(FieldDef::new("level", TypeTag::named("int")).default_value(Value::int(0)))
        .constructor(ConstructorDef::empty())
        .method(
            MethodDef::new("read", |instance, _| Ok(instance.field("level").unwrap()))
                .returns(TypeTag::named("int"))
                .intercepted()
                .marker(Audited),
        )
        .method(
            MethodDef::new("reset", |instance, _| {
                instance.set_field("level", Value::int(0))?;
                Ok(Value::Null)
            })
            .intercepted(),
        )
        .property(
            PropertyDef::new("level", TypeTag::named("int"))
                .backed_by("level")
                .intercepted()
                .marker(Clamped),
        )
}

#[test]
fn bound_handler_applies_to_marked_members_only() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(AuditHandler::new(calls.clone()));

    let aspects = Arc::new(AspectRegistry::new());
    aspects.register(handler.clone());

    let cache = WeaverCache::with_weaver(Weaver::new().with_aspects(aspects));
    let woven = cache.get_or_weave(meter_def()).unwrap();
    let meter = Instance::construct(&woven, &[]).unwrap();

    // Applied once: `read` carries the marker, `reset` and `level` do not.
    assert_eq!(handler.applied.load(Ordering::SeqCst), 1);

    meter.call("read", &[]).unwrap();
    meter.call("read", &[]).unwrap();
    meter.call("reset", &[]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn handler_applies_once_per_instance() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(AuditHandler::new(calls));

    let aspects = Arc::new(AspectRegistry::new());
    aspects.register(handler.clone());

    let cache = WeaverCache::with_weaver(Weaver::new().with_aspects(aspects));
    let woven = cache.get_or_weave(meter_def()).unwrap();

    let _a = Instance::construct(&woven, &[]).unwrap();
    let _b = Instance::construct(&woven, &[]).unwrap();
    assert_eq!(handler.applied.load(Ordering::SeqCst), 2);
}

#[test]
fn property_handler_customizes_set_pipeline() {
    let aspects = Arc::new(AspectRegistry::new());
    aspects.register(Arc::new(ClampHandler));

    let cache = WeaverCache::with_weaver(Weaver::new().with_aspects(aspects));
    let woven = cache.get_or_weave(meter_def()).unwrap();
    let meter = Instance::construct(&woven, &[]).unwrap();

    meter.set("level", Value::int(250)).unwrap();
    assert_eq!(meter.field("level"), Some(Value::int(100)));

    meter.set("level", Value::int(-3)).unwrap();
    assert_eq!(meter.field("level"), Some(Value::int(0)));
}

#[test]
fn discovered_handlers_install_before_first_weave() {
    let calls = Arc::new(AtomicUsize::new(0));
    let candidate_calls = calls.clone();
    let source = vec![HandlerCandidate::new("audit", move || {
        Ok(Arc::new(AuditHandler::new(candidate_calls.clone())) as Arc<dyn AspectHandler>)
    })];

    let aspects = Arc::new(AspectRegistry::with_source(Arc::new(source)));
    let cache = WeaverCache::with_weaver(Weaver::new().with_aspects(aspects));
    let woven = cache.get_or_weave(meter_def()).unwrap();
    let meter = Instance::construct(&woven, &[]).unwrap();

    meter.call("read", &[]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn failed_candidate_does_not_abort_the_rest() {
    let calls = Arc::new(AtomicUsize::new(0));
    let candidate_calls = calls.clone();
    let source = vec![
        HandlerCandidate::new("broken", || Err("requires a parameter".to_string())),
        HandlerCandidate::new("audit", move || {
            Ok(Arc::new(AuditHandler::new(candidate_calls.clone())) as Arc<dyn AspectHandler>)
        }),
    ];

    let aspects = Arc::new(AspectRegistry::with_source(Arc::new(source)));
    let cache = WeaverCache::with_weaver(Weaver::new().with_aspects(aspects));
    let woven = cache.get_or_weave(meter_def()).unwrap();
    let meter = Instance::construct(&woven, &[]).unwrap();

    meter.call("read", &[]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn unbound_marker_triggers_nothing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(AuditHandler::new(calls.clone()));

    let aspects = Arc::new(AspectRegistry::new());
    aspects.register(handler);
    aspects.unbind::<Audited>();

    let cache = WeaverCache::with_weaver(Weaver::new().with_aspects(aspects));
    let woven = cache.get_or_weave(meter_def()).unwrap();
    let meter = Instance::construct(&woven, &[]).unwrap();

    meter.call("read", &[]).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}
