//! Alias chain resolution.
//!
//! Dealiasing follows `Reference -> Alias -> ...` to the first type that is
//! not an alias. A chain ending at an enum, object or union yields that
//! definition instead of a type. Chains are walked iteratively with the
//! visited names kept, so a cyclic alias graph is reported rather than
//! looping.

use conjure_ir::{Type, TypeDefinition, TypeName};
use std::collections::BTreeMap;

use crate::error::{ConjureError, ResolutionError, Rule};

/// Result of following an alias chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Dealiased<'a> {
    /// A non-reference type.
    Type(Type),
    /// The chain ended at an enum, object or union.
    Definition(&'a TypeDefinition),
}

/// Lookup table of type definitions visible to one file.
#[derive(Debug, Clone, Default)]
pub struct Dealiaser {
    definitions: BTreeMap<TypeName, TypeDefinition>,
}

impl Dealiaser {
    pub fn new(definitions: impl IntoIterator<Item = TypeDefinition>) -> Self {
        let mut dealiaser = Self::default();
        dealiaser.extend(definitions);
        dealiaser
    }

    pub fn extend(&mut self, definitions: impl IntoIterator<Item = TypeDefinition>) {
        for definition in definitions {
            if let Some(name) = definition.type_name() {
                self.definitions.insert(name.clone(), definition);
            }
        }
    }

    pub fn definition(&self, name: &TypeName) -> Option<&TypeDefinition> {
        self.definitions.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Dealias `ty`, returning `None` when the chain ends at an enum, object
    /// or union.
    pub fn dealias(&self, ty: &Type) -> Result<Option<Type>, ConjureError> {
        Ok(match self.resolve(ty)? {
            Dealiased::Type(ty) => Some(ty),
            Dealiased::Definition(_) => None,
        })
    }

    /// Follow the alias chain starting at `ty`.
    pub fn resolve<'a>(&'a self, ty: &'a Type) -> Result<Dealiased<'a>, ConjureError> {
        let mut chain: Vec<&TypeName> = Vec::new();
        let mut current = ty;
        loop {
            match current {
                Type::Reference(name) => {
                    if chain.contains(&name) {
                        return Err(cycle_error(&chain, name));
                    }
                    chain.push(name);
                    match self.definitions.get(name) {
                        Some(TypeDefinition::Alias(alias)) => current = &alias.alias,
                        Some(TypeDefinition::Unknown(unknown)) => {
                            return Err(ConjureError::UnknownSchemaVariant(format!(
                                "type definition '{}' referenced by {}",
                                unknown.type_name, name
                            )))
                        }
                        Some(definition) => return Ok(Dealiased::Definition(definition)),
                        None => return Err(ResolutionError::UndefinedType(name.clone()).into()),
                    }
                }
                Type::Unknown(unknown) => {
                    return Err(ConjureError::UnknownSchemaVariant(format!(
                        "type '{}' cannot be dealiased",
                        unknown.type_name
                    )))
                }
                other => return Ok(Dealiased::Type(other.clone())),
            }
        }
    }

    /// Whether `ty` dealiases to an enum.
    pub fn is_enum(&self, ty: &Type) -> Result<bool, ConjureError> {
        Ok(matches!(
            self.resolve(ty)?,
            Dealiased::Definition(TypeDefinition::Enum(_))
        ))
    }
}

fn cycle_error(chain: &[&TypeName], repeated: &TypeName) -> ConjureError {
    let mut path: Vec<String> = chain.iter().map(|name| name.to_string()).collect();
    path.push(repeated.to_string());
    ConjureError::validation(
        Rule::AcyclicAliases,
        repeated,
        format!("alias cycle {}", path.join(" -> ")),
    )
}
