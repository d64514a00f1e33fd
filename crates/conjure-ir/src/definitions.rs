//! Type, error and root definitions.

use serde::{Deserialize, Serialize};

use crate::enums::ErrorCode;
use crate::names::{Documentation, ErrorNamespace, FieldName, TypeName};
use crate::services::ServiceDefinition;
use crate::types::Type;
use crate::{IrError, SUPPORTED_IR_VERSION};

tagged_union! {
    /// A user-defined type.
    pub enum TypeDefinition {
        Alias(AliasDefinition) = "alias",
        Enum(EnumDefinition) = "enum",
        Object(ObjectDefinition) = "object",
        Union(UnionDefinition) = "union",
    }
}

impl TypeDefinition {
    /// Name of the defined type, if the variant is known.
    pub fn type_name(&self) -> Option<&TypeName> {
        match self {
            TypeDefinition::Alias(def) => Some(&def.type_name),
            TypeDefinition::Enum(def) => Some(&def.type_name),
            TypeDefinition::Object(def) => Some(&def.type_name),
            TypeDefinition::Union(def) => Some(&def.type_name),
            TypeDefinition::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasDefinition {
    pub type_name: TypeName,
    pub alias: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDefinition {
    pub type_name: TypeName,
    #[serde(default)]
    pub values: Vec<EnumValueDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
}

impl EnumDefinition {
    pub fn has_value(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.value == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDefinition {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDefinition {
    pub type_name: TypeName,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnionDefinition {
    pub type_name: TypeName,
    #[serde(default)]
    pub union: Vec<FieldDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
}

/// A named, typed member of an object, union or error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub field_name: FieldName,
    #[serde(rename = "type")]
    pub field_type: Type,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
}

impl FieldDefinition {
    pub fn new(field_name: impl Into<FieldName>, field_type: Type) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            docs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDefinition {
    pub error_name: TypeName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
    pub namespace: ErrorNamespace,
    pub code: ErrorCode,
    #[serde(default)]
    pub safe_args: Vec<FieldDefinition>,
    #[serde(default)]
    pub unsafe_args: Vec<FieldDefinition>,
}

impl ErrorDefinition {
    /// Safe args followed by unsafe args.
    pub fn args(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.safe_args.iter().chain(self.unsafe_args.iter())
    }
}

/// Root of the IR produced by one compile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConjureDefinition {
    pub version: i32,
    #[serde(default)]
    pub errors: Vec<ErrorDefinition>,
    #[serde(default)]
    pub types: Vec<TypeDefinition>,
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
}

impl ConjureDefinition {
    /// An empty definition stamped with the supported IR version.
    pub fn new() -> Self {
        Self {
            version: SUPPORTED_IR_VERSION,
            errors: Vec::new(),
            types: Vec::new(),
            services: Vec::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, IrError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, IrError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for ConjureDefinition {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::PrimitiveType;
    use serde_json::json;

    #[test]
    fn test_object_wire_format() {
        let def = TypeDefinition::Object(ObjectDefinition {
            type_name: TypeName::new("Widget", "com.example"),
            fields: vec![FieldDefinition::new("id", Type::primitive(PrimitiveType::Rid))],
            docs: Some(Documentation::new("A widget.")),
        });
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "object",
                "object": {
                    "typeName": {"name": "Widget", "package": "com.example"},
                    "fields": [{
                        "fieldName": "id",
                        "type": {"type": "primitive", "primitive": "RID"}
                    }],
                    "docs": "A widget."
                }
            })
        );
    }

    #[test]
    fn test_error_wire_format() {
        let error = ErrorDefinition {
            error_name: TypeName::new("WidgetNotFound", "com.example"),
            docs: None,
            namespace: ErrorNamespace::new("Widgets"),
            code: ErrorCode::NotFound,
            safe_args: vec![FieldDefinition::new("widgetId", Type::primitive(PrimitiveType::Rid))],
            unsafe_args: vec![],
        };
        let json = serde_json::to_value(&error).unwrap();
        assert_eq!(json["errorName"]["name"], "WidgetNotFound");
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["safeArgs"][0]["fieldName"], "widgetId");
        assert_eq!(json["unsafeArgs"], json!([]));
        assert_eq!(error.args().count(), 1);
    }

    #[test]
    fn test_unknown_type_definition_round_trips() {
        let json = json!({
            "version": 1,
            "errors": [],
            "types": [{"type": "record", "record": {"typeName": {"name": "R", "package": "p"}}}],
            "services": []
        });
        let def: ConjureDefinition = serde_json::from_value(json.clone()).unwrap();
        assert!(def.types[0].is_unknown());
        assert_eq!(def.types[0].type_name(), None);
        assert_eq!(serde_json::to_value(&def).unwrap(), json);
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let def = ConjureDefinition::from_json(r#"{"version": 1}"#).unwrap();
        assert_eq!(def, ConjureDefinition::new());
    }
}
