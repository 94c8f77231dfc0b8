//! Weaver cache behavior, including concurrent first use.

use std::sync::Arc;
use std::thread;

use weft_engine::{
    ClassDef, ConstructorDef, FieldDef, Instance, MethodDef, MethodSite, TypeTag, Value,
    WeaverCache,
};

fn gadget_def() -> ClassDef {
    ClassDef::new("Gadget")
        .field(FieldDef::new("uses", TypeTag::named("int")).default_value(Value::int(0)))
        .constructor(ConstructorDef::empty())
        .method(
            MethodDef::new("poke", |instance, _| {
                let uses = instance.field("uses").unwrap().as_int().unwrap();
                instance.set_field("uses", Value::int(uses + 1))?;
                Ok(Value::int(uses + 1))
            })
            .returns(TypeTag::named("int"))
            .intercepted(),
        )
}

#[test]
fn repeated_requests_return_the_identical_class() {
    let cache = WeaverCache::new();
    let first = cache.get_or_weave(gadget_def()).unwrap();
    let second = cache.get_or_weave(gadget_def()).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
}

#[test]
fn concurrent_first_use_converges_on_one_class() {
    let cache = Arc::new(WeaverCache::new());

    let woven: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                scope.spawn(move || cache.get_or_weave(gadget_def()).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(cache.len(), 1);
    for class in &woven[1..] {
        assert!(Arc::ptr_eq(&woven[0], class));
    }
}

#[test]
fn instances_from_the_cached_class_are_independent() {
    let cache = WeaverCache::new();
    let woven = cache.get_or_weave(gadget_def()).unwrap();

    let a = Instance::construct(&woven, &[]).unwrap();
    let b = Instance::construct(&woven, &[]).unwrap();

    a.call("poke", &[]).unwrap();
    a.call("poke", &[]).unwrap();
    b.call("poke", &[]).unwrap();

    assert_eq!(a.field("uses"), Some(Value::int(2)));
    assert_eq!(b.field("uses"), Some(Value::int(1)));
}

#[test]
fn proxies_are_per_instance_not_shared() {
    let cache = WeaverCache::new();
    let woven = cache.get_or_weave(gadget_def()).unwrap();

    let a = Instance::construct(&woven, &[]).unwrap();
    let b = Instance::construct(&woven, &[]).unwrap();

    let pa = a.proxies().method("poke").unwrap();
    let pb = b.proxies().method("poke").unwrap();
    assert!(!std::ptr::eq(Arc::as_ptr(&pa), Arc::as_ptr(&pb)));

    // A hook on one instance's proxy does not leak to the other.
    pa.on_invoking(Arc::new(|ctx| ctx.skip()));
    pa.on_invoking(Arc::new(|ctx| ctx.set_result(Value::int(100))));

    assert_eq!(a.call("poke", &[]).unwrap(), Value::int(100));
    assert_eq!(a.field("uses"), Some(Value::int(0)));
    assert_eq!(b.call("poke", &[]).unwrap(), Value::int(1));
}
