//! Semantic validators.
//!
//! Each IR node category owns a fixed, ordered registry of validators. A
//! validator is a named rule plus a pure check function; registries are
//! plain static slices run front to back, and the first violation aborts.
//!
//! ## Registries
//!
//! | Category | Registry | Context |
//! |---|---|---|
//! | Definition | [`DEFINITION_VALIDATORS`] | [`Dealiaser`] over every type |
//! | Object | [`OBJECT_VALIDATORS`] | none |
//! | Enum | [`ENUM_VALIDATORS`] | none |
//! | Union | [`UNION_VALIDATORS`] | none |
//! | Alias | [`ALIAS_VALIDATORS`] | none |
//! | Error | [`ERROR_VALIDATORS`] | none |
//! | Service | [`SERVICE_VALIDATORS`] | none |
//! | Endpoint | [`ENDPOINT_VALIDATORS`] | [`Dealiaser`] visible to the file |

mod definition;
mod services;
mod types;

pub use definition::DEFINITION_VALIDATORS;
pub use services::{validate_endpoint, ENDPOINT_VALIDATORS, SERVICE_VALIDATORS};
pub use types::{
    NamedDefinition, ALIAS_VALIDATORS, ENUM_VALIDATORS, ERROR_VALIDATORS, OBJECT_VALIDATORS,
    UNION_VALIDATORS,
};

use conjure_ir::TypeDefinition;
use std::fmt;

use crate::dealias::Dealiaser;
use crate::error::{ConjureError, Rule};

/// Why a check did not pass.
#[derive(Debug)]
pub enum Violation {
    /// The rule does not hold for `subject`.
    Broken { subject: String, message: String },
    /// The check could not run to completion.
    Aborted(ConjureError),
}

impl Violation {
    pub fn new(subject: impl fmt::Display, message: impl Into<String>) -> Self {
        Violation::Broken {
            subject: subject.to_string(),
            message: message.into(),
        }
    }
}

impl From<ConjureError> for Violation {
    fn from(err: ConjureError) -> Self {
        Violation::Aborted(err)
    }
}

/// A named rule over nodes of type `T`, evaluated with context `C`.
pub struct Validator<T: ?Sized, C: ?Sized = ()> {
    pub rule: Rule,
    check: fn(&T, &C) -> Result<(), Violation>,
}

impl<T: ?Sized, C: ?Sized> Validator<T, C> {
    pub const fn new(rule: Rule, check: fn(&T, &C) -> Result<(), Violation>) -> Self {
        Self { rule, check }
    }

    pub fn validate(&self, node: &T, context: &C) -> Result<(), ConjureError> {
        match (self.check)(node, context) {
            Ok(()) => Ok(()),
            Err(Violation::Broken { subject, message }) => Err(ConjureError::Validation {
                rule: self.rule,
                subject,
                message,
            }),
            Err(Violation::Aborted(err)) => Err(err),
        }
    }
}

/// Run `validators` in order, stopping at the first failure.
pub fn validate_all<T: ?Sized, C: ?Sized>(
    validators: &[Validator<T, C>],
    node: &T,
    context: &C,
) -> Result<(), ConjureError> {
    for validator in validators {
        validator.validate(node, context)?;
    }
    Ok(())
}

/// Run the registry matching the definition's category.
pub fn validate_type_definition(definition: &TypeDefinition) -> Result<(), ConjureError> {
    match definition {
        TypeDefinition::Alias(def) => validate_all(ALIAS_VALIDATORS, def, &()),
        TypeDefinition::Enum(def) => validate_all(ENUM_VALIDATORS, def, &()),
        TypeDefinition::Object(def) => validate_all(OBJECT_VALIDATORS, def, &()),
        TypeDefinition::Union(def) => validate_all(UNION_VALIDATORS, def, &()),
        TypeDefinition::Unknown(unknown) => Err(ConjureError::UnknownSchemaVariant(format!(
            "type definition '{}' cannot be validated",
            unknown.type_name
        ))),
    }
}

/// Run the definition-level registry over a merged definition.
pub fn validate_definition(
    definition: &conjure_ir::ConjureDefinition,
    dealiaser: &Dealiaser,
) -> Result<(), ConjureError> {
    validate_all(DEFINITION_VALIDATORS, definition, dealiaser)
}
