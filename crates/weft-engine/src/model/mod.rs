//! Class and member definitions
//!
//! A [`ClassDef`] is the explicit registration of a class with the weaver:
//! fields, constructors, methods and properties, with member bodies supplied
//! as closures. Members opt into interception with an [`Intercept`]
//! declaration and may carry trigger markers for aspect handlers.
//!
//! Definitions are plain data; all validation (duplicate names, raw-target
//! and backing-field resolution) happens when the weaver consumes one.

use std::sync::Arc;

use weft_sdk::{Exception, Marker, ParamInfo, TypeTag, Value};

use crate::weave::Instance;

/// Body of a method: receives the instance and the (possibly hook-modified)
/// argument list.
pub type MethodBody = Arc<dyn Fn(&Instance, &[Value]) -> Result<Value, Exception> + Send + Sync>;

/// Body of a custom property getter.
pub type GetterBody = Arc<dyn Fn(&Instance) -> Result<Value, Exception> + Send + Sync>;

/// Body of a custom property setter.
pub type SetterBody = Arc<dyn Fn(&Instance, Value) -> Result<(), Exception> + Send + Sync>;

/// Body of a constructor: runs after fields are set to their defaults.
pub type ConstructorBody = Arc<dyn Fn(&Instance, &[Value]) -> Result<(), Exception> + Send + Sync>;

// ============================================================================
// Interception declaration
// ============================================================================

/// Declares a member interceptable.
///
/// By default the member's own body serves as the raw implementation; `via`
/// names another method whose body is invoked instead once hooks allow
/// continuation.
#[derive(Debug, Clone, Default)]
pub struct Intercept {
    raw_target: Option<String>,
}

impl Intercept {
    /// Intercept with the member's own body as the raw implementation
    pub fn new() -> Self {
        Self::default()
    }

    /// Intercept, forwarding real calls to the named method
    pub fn via(target: impl Into<String>) -> Self {
        Self {
            raw_target: Some(target.into()),
        }
    }

    /// The named raw target, if any
    pub fn raw_target(&self) -> Option<&str> {
        self.raw_target.as_deref()
    }
}

// ============================================================================
// Fields
// ============================================================================

/// Definition of one instance field.
#[derive(Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared field type
    pub tag: TypeTag,
    /// Value the field holds before the constructor body runs
    pub default: Value,
}

impl FieldDef {
    /// Create a field definition defaulting to null
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
            default: Value::Null,
        }
    }

    /// Set the pre-constructor default value
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = value;
        self
    }
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("default", &self.default)
            .finish()
    }
}

// ============================================================================
// Constructors
// ============================================================================

/// Definition of one constructor.
#[derive(Clone)]
pub struct ConstructorDef {
    /// Declared parameters
    pub params: Vec<ParamInfo>,
    /// Constructor body
    pub body: ConstructorBody,
}

impl ConstructorDef {
    /// Create a constructor definition
    pub fn new(
        body: impl Fn(&Instance, &[Value]) -> Result<(), Exception> + Send + Sync + 'static,
    ) -> Self {
        Self {
            params: Vec::new(),
            body: Arc::new(body),
        }
    }

    /// A constructor that leaves every field at its default
    pub fn empty() -> Self {
        Self::new(|_, _| Ok(()))
    }

    /// Add a parameter
    pub fn param(mut self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.params.push(ParamInfo::new(name, tag));
        self
    }
}

impl std::fmt::Debug for ConstructorDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructorDef")
            .field("params", &self.params)
            .finish()
    }
}

// ============================================================================
// Methods
// ============================================================================

/// Definition of one method.
#[derive(Clone)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Declared parameters
    pub params: Vec<ParamInfo>,
    /// Declared return type
    pub returns: TypeTag,
    /// Interception declaration, if the method is interceptable
    pub intercept: Option<Intercept>,
    /// Marker instances attached to this method
    pub markers: Vec<Arc<dyn Marker>>,
    /// Method body
    pub body: MethodBody,
}

impl MethodDef {
    /// Create a method definition returning `void`
    pub fn new(
        name: impl Into<String>,
        body: impl Fn(&Instance, &[Value]) -> Result<Value, Exception> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            returns: TypeTag::void(),
            intercept: None,
            markers: Vec::new(),
            body: Arc::new(body),
        }
    }

    /// Add a parameter
    pub fn param(mut self, name: impl Into<String>, tag: TypeTag) -> Self {
        self.params.push(ParamInfo::new(name, tag));
        self
    }

    /// Set the declared return type
    pub fn returns(mut self, tag: TypeTag) -> Self {
        self.returns = tag;
        self
    }

    /// Mark the method interceptable
    pub fn intercepted(mut self) -> Self {
        self.intercept = Some(Intercept::new());
        self
    }

    /// Mark the method interceptable, forwarding real calls to `target`
    pub fn intercepted_via(mut self, target: impl Into<String>) -> Self {
        self.intercept = Some(Intercept::via(target));
        self
    }

    /// Attach a trigger marker instance
    pub fn marker(mut self, marker: impl Marker) -> Self {
        self.markers.push(Arc::new(marker));
        self
    }
}

impl std::fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("intercept", &self.intercept)
            .field(
                "markers",
                &self.markers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// Properties
// ============================================================================

/// Definition of one property.
///
/// A property is either backed by a field (default read-write accessors are
/// synthesized at weave time) or carries custom accessor closures. A
/// property with no getter is write-only; with no setter, read-only.
#[derive(Clone)]
pub struct PropertyDef {
    /// Property name
    pub name: String,
    /// Declared property type
    pub tag: TypeTag,
    /// Backing field name, if field-backed
    pub backing_field: Option<String>,
    /// Custom getter, overriding the backing field read
    pub getter: Option<GetterBody>,
    /// Custom setter, overriding the backing field write
    pub setter: Option<SetterBody>,
    /// Whether reads are allowed (false makes the property write-only)
    pub readable: bool,
    /// Whether writes are allowed (false makes the property read-only)
    pub writable: bool,
    /// Interception declaration, if the property is interceptable
    pub intercept: Option<Intercept>,
    /// Marker instances attached to this property
    pub markers: Vec<Arc<dyn Marker>>,
}

impl PropertyDef {
    /// Create a property definition with no accessors yet
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
            backing_field: None,
            getter: None,
            setter: None,
            readable: true,
            writable: true,
            intercept: None,
            markers: Vec::new(),
        }
    }

    /// Back the property by the named field
    pub fn backed_by(mut self, field: impl Into<String>) -> Self {
        self.backing_field = Some(field.into());
        self
    }

    /// Supply a custom getter
    pub fn getter(
        mut self,
        body: impl Fn(&Instance) -> Result<Value, Exception> + Send + Sync + 'static,
    ) -> Self {
        self.getter = Some(Arc::new(body));
        self
    }

    /// Supply a custom setter
    pub fn setter(
        mut self,
        body: impl Fn(&Instance, Value) -> Result<(), Exception> + Send + Sync + 'static,
    ) -> Self {
        self.setter = Some(Arc::new(body));
        self
    }

    /// Reject writes
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Reject reads
    pub fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    /// Mark the property interceptable
    pub fn intercepted(mut self) -> Self {
        self.intercept = Some(Intercept::new());
        self
    }

    /// Attach a trigger marker instance
    pub fn marker(mut self, marker: impl Marker) -> Self {
        self.markers.push(Arc::new(marker));
        self
    }
}

impl std::fmt::Debug for PropertyDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyDef")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .field("backing_field", &self.backing_field)
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .field("intercept", &self.intercept)
            .field(
                "markers",
                &self.markers.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Complete definition of one class, ready for the weaver.
#[derive(Clone)]
pub struct ClassDef {
    /// Class name, the identity under which the woven class is cached
    pub name: String,
    /// Instance fields in declaration order
    pub fields: Vec<FieldDef>,
    /// Constructors in declaration order; index 0 is the default
    pub constructors: Vec<ConstructorDef>,
    /// Methods in declaration order
    pub methods: Vec<MethodDef>,
    /// Properties in declaration order
    pub properties: Vec<PropertyDef>,
}

impl ClassDef {
    /// Create an empty class definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Add a field
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a constructor
    pub fn constructor(mut self, ctor: ConstructorDef) -> Self {
        self.constructors.push(ctor);
        self
    }

    /// Add a method
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a property
    pub fn property(mut self, property: PropertyDef) -> Self {
        self.properties.push(property);
        self
    }

    /// Index of a field by name
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Whether any member carries an interception declaration
    pub fn has_intercepted_members(&self) -> bool {
        self.methods.iter().any(|m| m.intercept.is_some())
            || self.properties.iter().any(|p| p.intercept.is_some())
    }
}

impl std::fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("constructors", &self.constructors.len())
            .field("methods", &self.methods)
            .field("properties", &self.properties)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_builder() {
        let method = MethodDef::new("echo", |_, args| Ok(args[0].clone()))
            .param("text", TypeTag::named("string"))
            .returns(TypeTag::named("string"))
            .intercepted();

        assert_eq!(method.name, "echo");
        assert_eq!(method.params.len(), 1);
        assert!(method.intercept.is_some());
        assert!(method.intercept.unwrap().raw_target().is_none());
    }

    #[test]
    fn test_method_raw_target() {
        let method = MethodDef::new("echo", |_, _| Ok(Value::Null))
            .intercepted_via("raw_echo");
        assert_eq!(method.intercept.unwrap().raw_target(), Some("raw_echo"));
    }

    #[test]
    fn test_property_builder() {
        let prop = PropertyDef::new("speed", TypeTag::named("int"))
            .backed_by("speed")
            .read_only();

        assert_eq!(prop.backing_field.as_deref(), Some("speed"));
        assert!(!prop.writable);
        assert!(prop.readable);
    }

    #[test]
    fn test_class_builder() {
        let def = ClassDef::new("Counter")
            .field(FieldDef::new("ticks", TypeTag::named("int")).default_value(Value::int(0)))
            .constructor(ConstructorDef::empty())
            .method(MethodDef::new("bump", |_, _| Ok(Value::Null)).intercepted());

        assert_eq!(def.name, "Counter");
        assert_eq!(def.field_index("ticks"), Some(0));
        assert_eq!(def.field_index("missing"), None);
        assert!(def.has_intercepted_members());
    }
}
