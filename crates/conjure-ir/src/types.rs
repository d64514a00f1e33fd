//! The `Type` sum type and its container payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::enums::PrimitiveType;
use crate::names::TypeName;
use crate::IrError;

tagged_union! {
    /// A type expression after resolution.
    pub enum Type {
        Primitive(PrimitiveType) = "primitive",
        Optional(OptionalType) = "optional",
        List(ListType) = "list",
        Set(SetType) = "set",
        Map(MapType) = "map",
        Reference(TypeName) = "reference",
        External(ExternalReference) = "external",
    }
}

impl Type {
    pub fn primitive(primitive: PrimitiveType) -> Self {
        Type::Primitive(primitive)
    }

    /// Wrap `item_type` in an optional.
    ///
    /// Fails when `item_type` is itself an optional.
    pub fn optional(item_type: Type) -> Result<Self, IrError> {
        OptionalType::new(item_type).map(Type::Optional)
    }

    pub fn list(item_type: Type) -> Self {
        Type::List(ListType {
            item_type: Box::new(item_type),
        })
    }

    pub fn set(item_type: Type) -> Self {
        Type::Set(SetType {
            item_type: Box::new(item_type),
        })
    }

    pub fn map(key_type: Type, value_type: Type) -> Self {
        Type::Map(MapType {
            key_type: Box::new(key_type),
            value_type: Box::new(value_type),
        })
    }

    pub fn reference(name: TypeName) -> Self {
        Type::Reference(name)
    }

    pub fn external(external_reference: TypeName, fallback: Type) -> Self {
        Type::External(ExternalReference {
            external_reference,
            fallback: Box::new(fallback),
        })
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Type::Optional(_))
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(primitive) => f.write_str(&primitive.as_str().to_ascii_lowercase()),
            Type::Optional(optional) => write!(f, "optional<{}>", optional.item_type()),
            Type::List(list) => write!(f, "list<{}>", list.item_type),
            Type::Set(set) => write!(f, "set<{}>", set.item_type),
            Type::Map(map) => write!(f, "map<{}, {}>", map.key_type, map.value_type),
            Type::Reference(name) => write!(f, "{}", name),
            Type::External(external) => write!(f, "{}", external.external_reference),
            Type::Unknown(unknown) => write!(f, "unknown<{}>", unknown.type_name),
        }
    }
}

/// Payload of `optional`. Never wraps another optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOptionalType")]
#[serde(rename_all = "camelCase")]
pub struct OptionalType {
    item_type: Box<Type>,
}

impl OptionalType {
    pub fn new(item_type: Type) -> Result<Self, IrError> {
        if item_type.is_optional() {
            return Err(IrError::NestedOptional(item_type.to_string()));
        }
        Ok(Self {
            item_type: Box::new(item_type),
        })
    }

    pub fn item_type(&self) -> &Type {
        &self.item_type
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOptionalType {
    item_type: Type,
}

impl TryFrom<RawOptionalType> for OptionalType {
    type Error = IrError;

    fn try_from(raw: RawOptionalType) -> Result<Self, Self::Error> {
        OptionalType::new(raw.item_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListType {
    pub item_type: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetType {
    pub item_type: Box<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapType {
    pub key_type: Box<Type>,
    pub value_type: Box<Type>,
}

/// A type defined outside the IDL, with a structural fallback for
/// generators that cannot resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalReference {
    pub external_reference: TypeName,
    pub fallback: Box<Type>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn string() -> Type {
        Type::primitive(PrimitiveType::String)
    }

    #[test]
    fn test_primitive_wire_format() {
        let json = serde_json::to_value(string()).unwrap();
        assert_eq!(json, json!({"type": "primitive", "primitive": "STRING"}));
    }

    #[test]
    fn test_container_wire_format() {
        let ty = Type::map(string(), Type::optional(Type::list(string())).unwrap());
        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "map",
                "map": {
                    "keyType": {"type": "primitive", "primitive": "STRING"},
                    "valueType": {
                        "type": "optional",
                        "optional": {
                            "itemType": {
                                "type": "list",
                                "list": {"itemType": {"type": "primitive", "primitive": "STRING"}}
                            }
                        }
                    }
                }
            })
        );
        let back: Type = serde_json::from_value(json).unwrap();
        assert_eq!(back, ty);
    }

    #[test]
    fn test_external_wire_format() {
        let ty = Type::external(
            TypeName::new("Long", "java.lang"),
            Type::primitive(PrimitiveType::Safelong),
        );
        let json = serde_json::to_value(&ty).unwrap();
        assert_eq!(
            json,
            json!({
                "type": "external",
                "external": {
                    "externalReference": {"name": "Long", "package": "java.lang"},
                    "fallback": {"type": "primitive", "primitive": "SAFELONG"}
                }
            })
        );
    }

    #[test]
    fn test_nested_optional_rejected_on_construction() {
        let inner = Type::optional(string()).unwrap();
        let err = Type::optional(inner).unwrap_err();
        assert!(matches!(err, IrError::NestedOptional(_)));
        assert!(err.to_string().contains("optional<optional<string>>"));
    }

    #[test]
    fn test_nested_optional_rejected_on_deserialize() {
        let json = json!({
            "type": "optional",
            "optional": {"itemType": {
                "type": "optional",
                "optional": {"itemType": {"type": "primitive", "primitive": "STRING"}}
            }}
        });
        assert!(serde_json::from_value::<Type>(json).is_err());
    }

    #[test]
    fn test_unknown_variant_round_trips_verbatim() {
        let json = json!({"type": "tuple", "tuple": {"items": [1, 2]}, "extra": true});
        let ty: Type = serde_json::from_value(json.clone()).unwrap();
        assert!(ty.is_unknown());
        assert_eq!(ty.discriminant(), "tuple");
        assert_eq!(serde_json::to_value(&ty).unwrap(), json);
    }

    #[test]
    fn test_missing_discriminant_is_an_error() {
        let json = json!({"primitive": "STRING"});
        assert!(serde_json::from_value::<Type>(json).is_err());
    }
}
