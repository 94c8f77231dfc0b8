//! Class reports
//!
//! Serializable descriptions of woven classes for debugging and tooling:
//! which members exist, which are intercepted, what markers they carry and
//! whether their declared types accept null.

use serde::{Deserialize, Serialize};

use crate::weave::WovenClass;

/// Report kind of one member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberReportKind {
    /// A method
    Method,
    /// A property
    Property,
}

/// Report of one member of a woven class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberReport {
    /// Member name
    pub name: String,
    /// Member kind
    pub kind: MemberReportKind,
    /// Declared result/property type name
    pub declared_type: String,
    /// Whether the declared type accepts null
    pub accepts_null: bool,
    /// Whether calls route through a member proxy
    pub intercepted: bool,
    /// Names of the marker instances on the member
    pub markers: Vec<String>,
    /// Whether the property can be read (properties only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readable: Option<bool>,
    /// Whether the property can be written (properties only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
}

/// Report of a woven class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    /// Class name
    pub class: String,
    /// Whether no member is intercepted
    pub passthrough: bool,
    /// Members in declaration order, methods first
    pub members: Vec<MemberReport>,
}

impl ClassReport {
    /// Serialize as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl WovenClass {
    /// Describe this class as a serializable report.
    pub fn describe(&self) -> ClassReport {
        let mut members = Vec::with_capacity(self.methods.len() + self.properties.len());

        for method in &self.methods {
            members.push(MemberReport {
                name: method.descriptor.name().to_string(),
                kind: MemberReportKind::Method,
                declared_type: method.descriptor.declared().name.clone(),
                accepts_null: method.accepts_null,
                intercepted: method.intercepted,
                markers: method
                    .descriptor
                    .markers()
                    .iter()
                    .map(|m| m.name().to_string())
                    .collect(),
                readable: None,
                writable: None,
            });
        }

        for property in &self.properties {
            members.push(MemberReport {
                name: property.descriptor.name().to_string(),
                kind: MemberReportKind::Property,
                declared_type: property.descriptor.declared().name.clone(),
                accepts_null: property.accepts_null,
                intercepted: property.intercepted,
                markers: property
                    .descriptor
                    .markers()
                    .iter()
                    .map(|m| m.name().to_string())
                    .collect(),
                readable: Some(property.getter.is_some()),
                writable: Some(property.setter.is_some()),
            });
        }

        ClassReport {
            class: self.name.clone(),
            passthrough: self.passthrough,
            members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassDef, ConstructorDef, FieldDef, MethodDef, PropertyDef};
    use crate::weave::Weaver;
    use weft_sdk::{Marker, TypeTag, Value};

    struct Audited;

    impl Marker for Audited {
        fn name(&self) -> &str {
            "Audited"
        }
    }

    fn sample() -> ClassDef {
        ClassDef::new("Ticket")
            .field(FieldDef::new("id", TypeTag::named("int")).default_value(Value::int(0)))
            .constructor(ConstructorDef::empty())
            .method(
                MethodDef::new("renew", |_, _| Ok(Value::Null))
                    .returns(TypeTag::optional("int"))
                    .intercepted()
                    .marker(Audited),
            )
            .property(
                PropertyDef::new("id", TypeTag::named("int"))
                    .backed_by("id")
                    .read_only(),
            )
    }

    #[test]
    fn test_describe() {
        let woven = Weaver::new().weave(sample()).unwrap();
        let report = woven.describe();

        assert_eq!(report.class, "Ticket");
        assert!(!report.passthrough);
        assert_eq!(report.members.len(), 2);

        let renew = &report.members[0];
        assert_eq!(renew.kind, MemberReportKind::Method);
        assert!(renew.intercepted);
        assert!(renew.accepts_null);
        assert_eq!(renew.markers, vec!["Audited".to_string()]);
        assert_eq!(renew.readable, None);

        let id = &report.members[1];
        assert_eq!(id.kind, MemberReportKind::Property);
        assert_eq!(id.readable, Some(true));
        assert_eq!(id.writable, Some(false));
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let woven = Weaver::new().weave(sample()).unwrap();
        let report = woven.describe();

        let json = report.to_json().unwrap();
        assert!(json.contains("\"Ticket\""));
        let parsed: ClassReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }
}
