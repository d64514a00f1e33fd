//! Validators run once over the merged definition.

use conjure_ir::{ConjureDefinition, Type, TypeDefinition, TypeName, SUPPORTED_IR_VERSION};
use std::collections::BTreeMap;

use super::{Validator, Violation};
use crate::dealias::{Dealiased, Dealiaser};
use crate::error::{ConjureError, Rule};

/// Suffix reserved for generated service variants.
const RESERVED_SERVICE_SUFFIX: &str = "Retrofit";

pub static DEFINITION_VALIDATORS: &[Validator<ConjureDefinition, Dealiaser>] = &[
    Validator::new(Rule::UniqueServiceNames, unique_service_names),
    Validator::new(Rule::ServiceSuffix, service_suffix),
    Validator::new(Rule::IllegalVersion, illegal_version),
    Validator::new(Rule::UniqueNames, unique_names),
    Validator::new(Rule::NoNestedOptional, no_nested_optional),
    Validator::new(Rule::AcyclicAliases, acyclic_aliases),
];

fn unique_service_names(definition: &ConjureDefinition, _: &Dealiaser) -> Result<(), Violation> {
    let mut seen: BTreeMap<&str, &TypeName> = BTreeMap::new();
    for service in &definition.services {
        let name = &service.service_name;
        if let Some(previous) = seen.insert(name.name.as_str(), name) {
            return Err(Violation::new(
                &name.name,
                format!("service name declared by both {} and {}", previous, name),
            ));
        }
    }
    Ok(())
}

fn service_suffix(definition: &ConjureDefinition, _: &Dealiaser) -> Result<(), Violation> {
    match definition
        .services
        .iter()
        .find(|service| service.service_name.name.ends_with(RESERVED_SERVICE_SUFFIX))
    {
        Some(service) => Err(Violation::new(
            &service.service_name,
            format!("service names must not end in '{}'", RESERVED_SERVICE_SUFFIX),
        )),
        None => Ok(()),
    }
}

fn illegal_version(definition: &ConjureDefinition, _: &Dealiaser) -> Result<(), Violation> {
    if definition.version == SUPPORTED_IR_VERSION {
        Ok(())
    } else {
        Err(Violation::new(
            "definition",
            format!(
                "version {} is not supported, expected {}",
                definition.version, SUPPORTED_IR_VERSION
            ),
        ))
    }
}

fn unique_names(definition: &ConjureDefinition, _: &Dealiaser) -> Result<(), Violation> {
    let types = definition
        .types
        .iter()
        .filter_map(|def| def.type_name().map(|name| (name, "type")));
    let errors = definition.errors.iter().map(|def| (&def.error_name, "error"));
    let services = definition
        .services
        .iter()
        .map(|def| (&def.service_name, "service"));

    let mut seen: BTreeMap<&TypeName, &str> = BTreeMap::new();
    for (name, kind) in types.chain(errors).chain(services) {
        if let Some(previous) = seen.insert(name, kind) {
            return Err(Violation::new(
                name,
                format!("name used by both a {} and a {}", previous, kind),
            ));
        }
    }
    Ok(())
}

fn no_nested_optional(
    definition: &ConjureDefinition,
    dealiaser: &Dealiaser,
) -> Result<(), Violation> {
    for def in &definition.types {
        let name = def.type_name();
        let types: Vec<&Type> = match def {
            TypeDefinition::Alias(alias) => vec![&alias.alias],
            TypeDefinition::Object(object) => object.fields.iter().map(|f| &f.field_type).collect(),
            TypeDefinition::Union(union) => union.union.iter().map(|f| &f.field_type).collect(),
            TypeDefinition::Enum(_) | TypeDefinition::Unknown(_) => Vec::new(),
        };
        for ty in types {
            if let Some(offending) = nested_optional(ty, dealiaser)? {
                return Err(Violation::new(
                    name.map(ToString::to_string).unwrap_or_default(),
                    format!("optional<{}> wraps an optional", offending),
                ));
            }
        }
    }
    for error in &definition.errors {
        for arg in error.args() {
            if let Some(offending) = nested_optional(&arg.field_type, dealiaser)? {
                return Err(Violation::new(
                    &error.error_name,
                    format!("optional<{}> wraps an optional", offending),
                ));
            }
        }
    }
    for service in &definition.services {
        for endpoint in &service.endpoints {
            let types = endpoint
                .args
                .iter()
                .map(|arg| &arg.arg_type)
                .chain(endpoint.returns.as_ref());
            for ty in types {
                if let Some(offending) = nested_optional(ty, dealiaser)? {
                    return Err(Violation::new(
                        format!("{}.{}", service.service_name, endpoint.endpoint_name),
                        format!("optional<{}> wraps an optional", offending),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Item type of the first optional, at any depth, whose item dealiases to an
/// optional.
fn nested_optional<'a>(
    ty: &'a Type,
    dealiaser: &Dealiaser,
) -> Result<Option<&'a Type>, ConjureError> {
    match ty {
        Type::Optional(optional) => {
            let item = optional.item_type();
            if let Dealiased::Type(Type::Optional(_)) = dealiaser.resolve(item)? {
                return Ok(Some(item));
            }
            nested_optional(item, dealiaser)
        }
        Type::List(list) => nested_optional(&list.item_type, dealiaser),
        Type::Set(set) => nested_optional(&set.item_type, dealiaser),
        Type::Map(map) => match nested_optional(&map.key_type, dealiaser)? {
            Some(found) => Ok(Some(found)),
            None => nested_optional(&map.value_type, dealiaser),
        },
        Type::Primitive(_) | Type::Reference(_) | Type::External(_) | Type::Unknown(_) => Ok(None),
    }
}

fn acyclic_aliases(definition: &ConjureDefinition, dealiaser: &Dealiaser) -> Result<(), Violation> {
    for def in &definition.types {
        if let TypeDefinition::Alias(alias) = def {
            let start = Type::reference(alias.type_name.clone());
            dealiaser.resolve(&start)?;
        }
    }
    Ok(())
}
