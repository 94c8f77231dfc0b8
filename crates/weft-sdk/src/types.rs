//! Declared-type tags and member descriptors
//!
//! A [`TypeTag`] records the declared type of a member result, property or
//! parameter as a name plus an optionality bit. The engine computes, once
//! per member, whether a null result is acceptable: it is iff the declared
//! type is optional or `void`.
//!
//! A [`MemberDescriptor`] is the reflected identity of one method or
//! property: owning class, name, kind, declared type, parameters and the
//! marker instances attached to it.

use std::sync::Arc;

use crate::handler::{Marker, MarkerKey};

/// Declared type of a member result, property or parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTag {
    /// Type name (e.g. "int", "string", "Ticket")
    pub name: String,
    /// Whether the absence of a value is part of the declared type
    pub optional: bool,
}

impl TypeTag {
    /// Create a non-optional type tag
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
        }
    }

    /// Create an optional type tag
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: true,
        }
    }

    /// The `void` tag, used by methods that return nothing
    pub fn void() -> Self {
        Self::named("void")
    }

    /// Whether this is the `void` tag
    pub fn is_void(&self) -> bool {
        self.name == "void"
    }

    /// Whether a null value satisfies this declared type
    pub fn accepts_null(&self) -> bool {
        self.optional || self.is_void()
    }
}

/// Name and declared type of one method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    /// Parameter name
    pub name: String,
    /// Declared parameter type
    pub tag: TypeTag,
}

impl ParamInfo {
    /// Create a parameter info
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }
}

/// Whether a member is a method or a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A callable method
    Method,
    /// A readable/writable property
    Property,
}

/// Reflected identity of one interceptable member.
#[derive(Clone)]
pub struct MemberDescriptor {
    class: String,
    name: String,
    kind: MemberKind,
    declared: TypeTag,
    params: Vec<ParamInfo>,
    markers: Vec<Arc<dyn Marker>>,
}

impl MemberDescriptor {
    /// Create a descriptor
    pub fn new(
        class: impl Into<String>,
        name: impl Into<String>,
        kind: MemberKind,
        declared: TypeTag,
        params: Vec<ParamInfo>,
        markers: Vec<Arc<dyn Marker>>,
    ) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            kind,
            declared,
            params,
            markers,
        }
    }

    /// Owning class name
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Member kind
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Declared result/property type
    pub fn declared(&self) -> &TypeTag {
        &self.declared
    }

    /// Declared parameters (empty for properties)
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    /// Marker instances attached to this member
    pub fn markers(&self) -> &[Arc<dyn Marker>] {
        &self.markers
    }

    /// Keys of the marker types attached to this member
    pub fn marker_keys(&self) -> Vec<MarkerKey> {
        self.markers.iter().map(|m| m.key()).collect()
    }

    /// Whether a marker of type `M` is attached to this member
    pub fn has_marker<M: Marker>(&self) -> bool {
        self.markers.iter().any(|m| m.key() == MarkerKey::of::<M>())
    }

    /// `Class::member` form for diagnostics
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.class, self.name)
    }
}

impl std::fmt::Debug for MemberDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberDescriptor")
            .field("class", &self.class)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declared", &self.declared)
            .field("params", &self.params)
            .field(
                "markers",
                &self.markers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Audited;

    impl Marker for Audited {
        fn name(&self) -> &str {
            "Audited"
        }
    }

    #[test]
    fn test_type_tag_accepts_null() {
        assert!(!TypeTag::named("int").accepts_null());
        assert!(TypeTag::optional("int").accepts_null());
        assert!(TypeTag::void().accepts_null());
        assert!(TypeTag::void().is_void());
    }

    #[test]
    fn test_descriptor_markers() {
        let desc = MemberDescriptor::new(
            "Counter",
            "add_tick",
            MemberKind::Method,
            TypeTag::named("int"),
            vec![ParamInfo::new("n", TypeTag::named("int"))],
            vec![Arc::new(Audited)],
        );

        assert_eq!(desc.qualified_name(), "Counter::add_tick");
        assert!(desc.has_marker::<Audited>());
        assert_eq!(desc.marker_keys(), vec![MarkerKey::of::<Audited>()]);
        assert_eq!(desc.params().len(), 1);
    }
}
