//! # conjure-ir
//!
//! The versioned intermediate representation produced by the Conjure compiler
//! and consumed by code generators.
//!
//! This crate provides:
//! - **IR types**: immutable, structurally-equal value types for types, errors and services
//! - **JSON schema**: serde impls matching the wire format generators expect
//! - **Forward compatibility**: `Unknown` variants for sum types and open enums
//!
//! ## Design Principle
//!
//! **The IR does not define semantics.**
//!
//! Resolution and validation live in `conjure-core`. The only invariant this
//! crate enforces itself is structural: an `optional` never directly wraps
//! another `optional`, whether built in code or read from JSON.
//!
//! ## Wire Format
//!
//! Every sum type is a JSON object with a `"type"` discriminant and a property
//! of the same name holding the payload:
//!
//! ```text
//! {"type": "optional", "optional": {"itemType": {"type": "primitive", "primitive": "STRING"}}}
//! ```

#[macro_use]
mod tagged;

pub mod definitions;
pub mod enums;
pub mod names;
pub mod services;
pub mod types;

pub use definitions::{
    AliasDefinition, ConjureDefinition, EnumDefinition, EnumValueDefinition, ErrorDefinition,
    FieldDefinition, ObjectDefinition, TypeDefinition, UnionDefinition,
};
pub use enums::{ErrorCode, HttpMethod, PrimitiveType};
pub use names::{
    ArgumentName, Documentation, EndpointName, ErrorNamespace, FieldName, HttpPath, ParameterId,
    TypeName,
};
pub use services::{
    ArgumentDefinition, AuthType, BodyParameterType, CookieAuthType, EndpointDefinition,
    HeaderAuthType, HeaderParameterType, ParameterType, PathParameterType, QueryParameterType,
    ServiceDefinition,
};
pub use tagged::UnknownVariant;
pub use types::{ExternalReference, ListType, MapType, OptionalType, SetType, Type};

use thiserror::Error;

/// IR schema revision produced by this release.
pub const SUPPORTED_IR_VERSION: i32 = 1;

/// Errors raised while constructing or decoding IR values.
#[derive(Error, Debug)]
pub enum IrError {
    #[error("Illegal nested optional type: optional<{0}>")]
    NestedOptional(String),

    #[error("Failed to parse IR JSON: {0}")]
    Json(#[from] serde_json::Error),
}
