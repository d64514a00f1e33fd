//! Default value literals.
//!
//! Only primitives with a textual literal form and enums may carry a default.
//!
//! | Type | Accepted literal |
//! |---|---|
//! | string | any text, verbatim |
//! | rid | `ri.<service>.<instance>.<type>.<locator>` |
//! | uuid | canonical 8-4-4-4-12 hex form |
//! | integer | 32-bit signed integer |
//! | safelong | integer within ±(2^53 - 1) |
//! | double | decimal or exponent form, `NaN` or `Infinity`, optionally signed |
//! | boolean | `true`, `yes` or `1` (any case) is true, anything else false |
//! | enum | one of the declared values |

use conjure_ir::{PrimitiveType, Type, TypeDefinition, TypeName};

use crate::dealias::{Dealiased, Dealiaser};
use crate::error::{ConjureError, DefaultValueError};
use crate::patterns::{DOUBLE, RID, UUID};

/// Largest magnitude a safelong may hold.
pub const SAFELONG_MAX: i64 = 9_007_199_254_740_991;

/// A typed default value.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    String(String),
    Rid(String),
    Uuid(String),
    Integer(i32),
    Safelong(i64),
    Double(f64),
    Boolean(bool),
    Enum { type_name: TypeName, value: String },
}

/// Parses default literals against types visible through a [`Dealiaser`].
pub struct DefaultValueParser<'a> {
    dealiaser: &'a Dealiaser,
}

impl<'a> DefaultValueParser<'a> {
    pub fn new(dealiaser: &'a Dealiaser) -> Self {
        Self { dealiaser }
    }

    /// Parse `literal` as a default for a value of type `ty`.
    pub fn parse(&self, ty: &Type, literal: &str) -> Result<DefaultValue, ConjureError> {
        match ty {
            Type::Primitive(primitive) => parse_primitive(primitive, literal),
            Type::Reference(name) => match self.dealiaser.resolve(ty)? {
                Dealiased::Definition(TypeDefinition::Enum(def)) => {
                    if def.has_value(literal) {
                        Ok(DefaultValue::Enum {
                            type_name: def.type_name.clone(),
                            value: literal.to_string(),
                        })
                    } else {
                        Err(illegal(
                            literal,
                            name,
                            format!(
                                "declared values are [{}]",
                                def.values
                                    .iter()
                                    .map(|v| v.value.as_str())
                                    .collect::<Vec<_>>()
                                    .join(", ")
                            ),
                        ))
                    }
                }
                Dealiased::Definition(_) => Err(unsupported(name)),
                Dealiased::Type(aliased) => self.parse(&aliased, literal),
            },
            Type::Unknown(unknown) => Err(ConjureError::UnknownSchemaVariant(format!(
                "type '{}' cannot carry a default value",
                unknown.type_name
            ))),
            Type::Optional(_) | Type::List(_) | Type::Set(_) | Type::Map(_) | Type::External(_) => {
                Err(unsupported(ty))
            }
        }
    }
}

fn parse_double(literal: &str) -> Option<f64> {
    if !DOUBLE.is_match(literal) {
        return None;
    }
    let negative = literal.starts_with('-');
    match literal.trim_start_matches(['+', '-']) {
        "NaN" => Some(f64::NAN),
        "Infinity" if negative => Some(f64::NEG_INFINITY),
        "Infinity" => Some(f64::INFINITY),
        _ => literal.parse().ok(),
    }
}

fn parse_primitive(primitive: &PrimitiveType, literal: &str) -> Result<DefaultValue, ConjureError> {
    let type_name = primitive.as_str().to_ascii_lowercase();
    match primitive {
        PrimitiveType::String => Ok(DefaultValue::String(literal.to_string())),
        PrimitiveType::Rid => {
            if RID.is_match(literal) {
                Ok(DefaultValue::Rid(literal.to_string()))
            } else {
                Err(illegal(literal, &type_name, "not a resource identifier"))
            }
        }
        PrimitiveType::Uuid => {
            if UUID.is_match(literal) {
                Ok(DefaultValue::Uuid(literal.to_ascii_lowercase()))
            } else {
                Err(illegal(literal, &type_name, "not a UUID"))
            }
        }
        PrimitiveType::Integer => literal
            .trim()
            .parse::<i32>()
            .map(DefaultValue::Integer)
            .map_err(|e| illegal(literal, &type_name, e.to_string())),
        PrimitiveType::Safelong => {
            let value = literal
                .trim()
                .parse::<i64>()
                .map_err(|e| illegal(literal, &type_name, e.to_string()))?;
            if (-SAFELONG_MAX..=SAFELONG_MAX).contains(&value) {
                Ok(DefaultValue::Safelong(value))
            } else {
                Err(illegal(
                    literal,
                    &type_name,
                    format!("outside the safe range ±{}", SAFELONG_MAX),
                ))
            }
        }
        PrimitiveType::Double => parse_double(literal.trim())
            .map(DefaultValue::Double)
            .ok_or_else(|| illegal(literal, &type_name, "not a decimal number")),
        PrimitiveType::Boolean => {
            let lowered = literal.trim().to_ascii_lowercase();
            Ok(DefaultValue::Boolean(matches!(lowered.as_str(), "true" | "yes" | "1")))
        }
        PrimitiveType::Any
        | PrimitiveType::Binary
        | PrimitiveType::Datetime
        | PrimitiveType::Bearertoken => Err(unsupported(&type_name)),
        PrimitiveType::Unknown(raw) => Err(ConjureError::UnknownSchemaVariant(format!(
            "primitive '{}' cannot carry a default value",
            raw
        ))),
    }
}

fn unsupported(ty: impl ToString) -> ConjureError {
    DefaultValueError::UnsupportedType {
        type_description: ty.to_string(),
    }
    .into()
}

fn illegal(literal: &str, ty: impl ToString, reason: impl Into<String>) -> ConjureError {
    DefaultValueError::IllegalLiteral {
        literal: literal.to_string(),
        type_description: ty.to_string(),
        reason: reason.into(),
    }
    .into()
}
