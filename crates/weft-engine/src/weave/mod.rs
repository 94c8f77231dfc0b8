//! The weaver: class synthesis over dispatch tables
//!
//! The weaver consumes a [`ClassDef`] and produces a [`WovenClass`]: every
//! name is resolved once (raw targets, backing fields, member indices), the
//! per-member interception plan and null-acceptability are fixed, and the
//! result is immutable. Weaving fails fatally — a woven class is never
//! partially built.

mod cache;
mod instance;
mod woven;

pub use cache::WeaverCache;
pub use instance::{Instance, ProxiedObject};
pub use woven::WovenClass;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use weft_sdk::{MemberDescriptor, MemberKind};

use crate::aspect::AspectRegistry;
use crate::error::{WeaveError, WeaveResult};
use crate::model::{ClassDef, GetterBody, SetterBody};
use crate::weave::woven::{WovenMethod, WovenProperty};

/// Weaving options.
#[derive(Debug, Clone)]
pub struct WeaverOptions {
    /// Skip proxy-registry population and aspect application for classes
    /// with no intercepted members. Off by default so every instance
    /// exposes the discovery interface uniformly.
    pub collapse_passthrough: bool,
    /// Reject argument-count mismatches. When off, missing arguments are
    /// padded with nulls; surplus arguments are always rejected.
    pub strict_arity: bool,
}

impl Default for WeaverOptions {
    fn default() -> Self {
        Self {
            collapse_passthrough: false,
            strict_arity: true,
        }
    }
}

impl WeaverOptions {
    /// Set [`WeaverOptions::collapse_passthrough`]
    pub fn collapse_passthrough(mut self, collapse: bool) -> Self {
        self.collapse_passthrough = collapse;
        self
    }

    /// Set [`WeaverOptions::strict_arity`]
    pub fn strict_arity(mut self, strict: bool) -> Self {
        self.strict_arity = strict;
        self
    }
}

/// Synthesizes woven classes from class definitions.
#[derive(Default)]
pub struct Weaver {
    options: WeaverOptions,
    aspects: Arc<AspectRegistry>,
}

impl Weaver {
    /// Create a weaver with default options and an empty aspect registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a weaver with the given options
    pub fn with_options(options: WeaverOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Replace the aspect registry
    pub fn with_aspects(mut self, aspects: Arc<AspectRegistry>) -> Self {
        self.aspects = aspects;
        self
    }

    /// The weaving options
    pub fn options(&self) -> &WeaverOptions {
        &self.options
    }

    /// The aspect registry applied to every woven class
    pub fn aspects(&self) -> &Arc<AspectRegistry> {
        &self.aspects
    }

    /// Weave a class definition.
    pub fn weave(&self, def: ClassDef) -> WeaveResult<Arc<WovenClass>> {
        if def.constructors.is_empty() {
            return Err(WeaveError::NoConstructor(def.name.clone()));
        }

        let field_index = Self::index_names(
            "field",
            &def.name,
            def.fields.iter().map(|f| f.name.as_str()),
        )?;
        let method_index = Self::index_names(
            "method",
            &def.name,
            def.methods.iter().map(|m| m.name.as_str()),
        )?;
        let property_index = Self::index_names(
            "property",
            &def.name,
            def.properties.iter().map(|p| p.name.as_str()),
        )?;

        let mut methods = Vec::with_capacity(def.methods.len());
        for method in &def.methods {
            let raw = match method.intercept.as_ref().and_then(|i| i.raw_target()) {
                Some(target) => def
                    .methods
                    .iter()
                    .find(|m| m.name == target)
                    .map(|m| m.body.clone())
                    .ok_or_else(|| WeaveError::UnknownRawTarget {
                        class: def.name.clone(),
                        method: method.name.clone(),
                        target: target.to_string(),
                    })?,
                None => method.body.clone(),
            };
            let descriptor = MemberDescriptor::new(
                def.name.clone(),
                method.name.clone(),
                MemberKind::Method,
                method.returns.clone(),
                method.params.clone(),
                method.markers.clone(),
            );
            methods.push(WovenMethod {
                descriptor,
                raw,
                intercepted: method.intercept.is_some(),
                accepts_null: method.returns.accepts_null(),
                arity: method.params.len(),
            });
        }

        let mut properties = Vec::with_capacity(def.properties.len());
        for property in &def.properties {
            let backing_slot = match &property.backing_field {
                Some(field) => Some(*field_index.get(field.as_str()).ok_or_else(|| {
                    WeaveError::UnknownBackingField {
                        class: def.name.clone(),
                        property: property.name.clone(),
                        field: field.clone(),
                    }
                })?),
                None => None,
            };

            let getter: Option<GetterBody> = if !property.readable {
                None
            } else if let Some(custom) = &property.getter {
                Some(custom.clone())
            } else {
                backing_slot.map(|slot| {
                    Arc::new(move |instance: &Instance| Ok(instance.field_by_slot(slot)))
                        as GetterBody
                })
            };
            let setter: Option<SetterBody> = if !property.writable {
                None
            } else if let Some(custom) = &property.setter {
                Some(custom.clone())
            } else {
                backing_slot.map(|slot| {
                    Arc::new(move |instance: &Instance, value| {
                        instance.set_field_by_slot(slot, value);
                        Ok(())
                    }) as SetterBody
                })
            };

            if getter.is_none() && setter.is_none() {
                return Err(WeaveError::InaccessibleProperty {
                    class: def.name.clone(),
                    property: property.name.clone(),
                });
            }

            let descriptor = MemberDescriptor::new(
                def.name.clone(),
                property.name.clone(),
                MemberKind::Property,
                property.tag.clone(),
                Vec::new(),
                property.markers.clone(),
            );
            properties.push(WovenProperty {
                descriptor,
                getter,
                setter,
                intercepted: property.intercept.is_some(),
                accepts_null: property.tag.accepts_null(),
            });
        }

        let passthrough = !def.has_intercepted_members();

        // Handlers must be installed before the first member proxy can exist.
        self.aspects.ensure_discovered();

        debug!(
            class = %def.name,
            methods = methods.len(),
            properties = properties.len(),
            passthrough,
            "woven class"
        );

        Ok(Arc::new(WovenClass {
            name: def.name,
            fields: def.fields,
            field_index,
            constructors: def.constructors,
            methods,
            method_index,
            properties,
            property_index,
            passthrough,
            collapse: self.options.collapse_passthrough,
            strict_arity: self.options.strict_arity,
            aspects: self.aspects.clone(),
        }))
    }

    fn index_names<'a>(
        kind: &'static str,
        class: &str,
        names: impl Iterator<Item = &'a str>,
    ) -> WeaveResult<FxHashMap<String, usize>> {
        let mut index = FxHashMap::default();
        for (slot, name) in names.enumerate() {
            if index.insert(name.to_string(), slot).is_some() {
                return Err(WeaveError::DuplicateMember {
                    kind,
                    class: class.to_string(),
                    member: name.to_string(),
                });
            }
        }
        Ok(index)
    }
}

impl std::fmt::Debug for Weaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Weaver")
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstructorDef, FieldDef, MethodDef, PropertyDef};
    use weft_sdk::{TypeTag, Value};

    fn minimal(name: &str) -> ClassDef {
        ClassDef::new(name).constructor(ConstructorDef::empty())
    }

    #[test]
    fn test_weave_requires_constructor() {
        let err = Weaver::new().weave(ClassDef::new("Bare")).unwrap_err();
        assert_eq!(err, WeaveError::NoConstructor("Bare".to_string()));
    }

    #[test]
    fn test_weave_rejects_duplicate_methods() {
        let def = minimal("Dup")
            .method(MethodDef::new("go", |_, _| Ok(Value::Null)))
            .method(MethodDef::new("go", |_, _| Ok(Value::Null)));
        let err = Weaver::new().weave(def).unwrap_err();
        assert!(matches!(err, WeaveError::DuplicateMember { kind: "method", .. }));
    }

    #[test]
    fn test_weave_rejects_unknown_raw_target() {
        let def = minimal("Ghost")
            .method(MethodDef::new("go", |_, _| Ok(Value::Null)).intercepted_via("missing"));
        let err = Weaver::new().weave(def).unwrap_err();
        assert!(matches!(err, WeaveError::UnknownRawTarget { .. }));
    }

    #[test]
    fn test_weave_rejects_unknown_backing_field() {
        let def = minimal("NoField")
            .property(PropertyDef::new("speed", TypeTag::named("int")).backed_by("missing"));
        let err = Weaver::new().weave(def).unwrap_err();
        assert!(matches!(err, WeaveError::UnknownBackingField { .. }));
    }

    #[test]
    fn test_weave_rejects_inaccessible_property() {
        let def = minimal("NoAccess").property(PropertyDef::new("x", TypeTag::named("int")));
        let err = Weaver::new().weave(def).unwrap_err();
        assert!(matches!(err, WeaveError::InaccessibleProperty { .. }));
    }

    #[test]
    fn test_weave_passthrough_detection() {
        let plain = minimal("Plain").method(MethodDef::new("go", |_, _| Ok(Value::Null)));
        let woven = Weaver::new().weave(plain).unwrap();
        assert!(woven.is_passthrough());

        let hooked =
            minimal("Hooked").method(MethodDef::new("go", |_, _| Ok(Value::Null)).intercepted());
        let woven = Weaver::new().weave(hooked).unwrap();
        assert!(!woven.is_passthrough());
    }

    #[test]
    fn test_weave_member_tables() {
        let def = minimal("Counter")
            .field(FieldDef::new("ticks", TypeTag::named("int")).default_value(Value::int(0)))
            .method(MethodDef::new("bump", |_, _| Ok(Value::Null)))
            .property(PropertyDef::new("ticks", TypeTag::named("int")).backed_by("ticks"));
        let woven = Weaver::new().weave(def).unwrap();

        assert_eq!(woven.name(), "Counter");
        assert_eq!(woven.field_count(), 1);
        assert!(woven.has_method("bump"));
        assert!(!woven.has_method("ticks"));
        assert!(woven.has_property("ticks"));
    }
}
