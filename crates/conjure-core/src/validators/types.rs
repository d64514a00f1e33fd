//! Validators for type and error definitions.

use conjure_ir::{
    AliasDefinition, EnumDefinition, ErrorDefinition, FieldDefinition, ObjectDefinition, Type,
    TypeName, UnionDefinition,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use super::{Validator, Violation};
use crate::error::Rule;
use crate::patterns::{self, Case, ENUM_VALUE, ERROR_NAMESPACE, PACKAGE, TYPE_NAME};

/// A definition with a name and, possibly, named fields.
pub trait NamedDefinition {
    fn name(&self) -> &TypeName;

    /// Fields in declaration order; empty for enums and aliases.
    fn fields(&self) -> Vec<&FieldDefinition> {
        Vec::new()
    }
}

impl NamedDefinition for ObjectDefinition {
    fn name(&self) -> &TypeName {
        &self.type_name
    }

    fn fields(&self) -> Vec<&FieldDefinition> {
        self.fields.iter().collect()
    }
}

impl NamedDefinition for UnionDefinition {
    fn name(&self) -> &TypeName {
        &self.type_name
    }

    fn fields(&self) -> Vec<&FieldDefinition> {
        self.union.iter().collect()
    }
}

impl NamedDefinition for EnumDefinition {
    fn name(&self) -> &TypeName {
        &self.type_name
    }
}

impl NamedDefinition for AliasDefinition {
    fn name(&self) -> &TypeName {
        &self.type_name
    }
}

impl NamedDefinition for ErrorDefinition {
    fn name(&self) -> &TypeName {
        &self.error_name
    }

    fn fields(&self) -> Vec<&FieldDefinition> {
        self.args().collect()
    }
}

pub static OBJECT_VALIDATORS: &[Validator<ObjectDefinition>] = &[
    Validator::new(Rule::TypeNameFormat, type_name_format::<ObjectDefinition>),
    Validator::new(Rule::PackageFormat, package_format::<ObjectDefinition>),
    Validator::new(Rule::FieldNameFormat, field_name_format::<ObjectDefinition>),
    Validator::new(Rule::UniqueFieldNames, unique_field_names::<ObjectDefinition>),
    Validator::new(Rule::NoComplexMapKeys, no_complex_map_keys::<ObjectDefinition>),
];

pub static ENUM_VALIDATORS: &[Validator<EnumDefinition>] = &[
    Validator::new(Rule::TypeNameFormat, type_name_format::<EnumDefinition>),
    Validator::new(Rule::PackageFormat, package_format::<EnumDefinition>),
    Validator::new(Rule::UniqueEnumValues, unique_enum_values),
    Validator::new(Rule::EnumValueFormat, enum_value_format),
];

pub static UNION_VALIDATORS: &[Validator<UnionDefinition>] = &[
    Validator::new(Rule::TypeNameFormat, type_name_format::<UnionDefinition>),
    Validator::new(Rule::PackageFormat, package_format::<UnionDefinition>),
    Validator::new(Rule::UnionKeyFormat, union_key_format),
    Validator::new(Rule::UnionKeySuffix, union_key_suffix),
    Validator::new(Rule::NoComplexMapKeys, no_complex_map_keys::<UnionDefinition>),
];

pub static ALIAS_VALIDATORS: &[Validator<AliasDefinition>] = &[
    Validator::new(Rule::TypeNameFormat, type_name_format::<AliasDefinition>),
    Validator::new(Rule::PackageFormat, package_format::<AliasDefinition>),
];

pub static ERROR_VALIDATORS: &[Validator<ErrorDefinition>] = &[
    Validator::new(Rule::TypeNameFormat, type_name_format::<ErrorDefinition>),
    Validator::new(Rule::PackageFormat, package_format::<ErrorDefinition>),
    Validator::new(Rule::ErrorNamespaceFormat, error_namespace_format),
    Validator::new(Rule::FieldNameFormat, field_name_format::<ErrorDefinition>),
    Validator::new(Rule::UniqueFieldNames, unique_field_names::<ErrorDefinition>),
    Validator::new(Rule::NoComplexMapKeys, no_complex_map_keys::<ErrorDefinition>),
];

fn type_name_format<D: NamedDefinition>(def: &D, _: &()) -> Result<(), Violation> {
    let name = def.name();
    if TYPE_NAME.is_match(&name.name) {
        Ok(())
    } else {
        Err(Violation::new(
            name,
            format!("type names must match pattern {}", TYPE_NAME.as_str()),
        ))
    }
}

fn package_format<D: NamedDefinition>(def: &D, _: &()) -> Result<(), Violation> {
    let name = def.name();
    if PACKAGE.is_match(&name.package) {
        Ok(())
    } else {
        Err(Violation::new(
            name,
            format!(
                "package '{}' must match pattern {}",
                name.package,
                PACKAGE.as_str()
            ),
        ))
    }
}

fn field_name_format<D: NamedDefinition>(def: &D, _: &()) -> Result<(), Violation> {
    for field in def.fields() {
        let field_name = field.field_name.as_str();
        match Case::of(field_name) {
            Some(Case::LowerCamel) => {}
            Some(case) => {
                warn!(
                    definition = %def.name(),
                    field = field_name,
                    ?case,
                    "Field names should be lowerCamelCase"
                );
            }
            None => {
                return Err(Violation::new(
                    format!("{}.{}", def.name(), field_name),
                    "field names must be lowerCamelCase, kebab-case or snake_case",
                ))
            }
        }
    }
    Ok(())
}

fn unique_field_names<D: NamedDefinition>(def: &D, _: &()) -> Result<(), Violation> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for field in def.fields() {
        let original = field.field_name.as_str();
        let normalized = patterns::to_lower_camel(original);
        if let Some(previous) = seen.insert(normalized.clone(), original) {
            return Err(Violation::new(
                def.name(),
                format!(
                    "fields '{}' and '{}' collide as '{}'",
                    previous, original, normalized
                ),
            ));
        }
    }
    Ok(())
}

fn no_complex_map_keys<D: NamedDefinition>(def: &D, _: &()) -> Result<(), Violation> {
    for field in def.fields() {
        if let Some(key) = complex_map_key(&field.field_type) {
            return Err(Violation::new(
                format!("{}.{}", def.name(), field.field_name),
                format!("complex type '{}' not allowed as map key", key),
            ));
        }
    }
    Ok(())
}

/// First map key, at any depth, that is not a primitive or reference.
fn complex_map_key(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Optional(optional) => complex_map_key(optional.item_type()),
        Type::List(list) => complex_map_key(&list.item_type),
        Type::Set(set) => complex_map_key(&set.item_type),
        Type::Map(map) => match map.key_type.as_ref() {
            Type::Primitive(_) | Type::Reference(_) => complex_map_key(&map.value_type),
            key => Some(key),
        },
        Type::Primitive(_) | Type::Reference(_) | Type::External(_) | Type::Unknown(_) => None,
    }
}

fn unique_enum_values(def: &EnumDefinition, _: &()) -> Result<(), Violation> {
    let mut seen = BTreeSet::new();
    for value in &def.values {
        if !seen.insert(value.value.as_str()) {
            return Err(Violation::new(
                &def.type_name,
                format!("duplicate enum value '{}'", value.value),
            ));
        }
    }
    Ok(())
}

fn enum_value_format(def: &EnumDefinition, _: &()) -> Result<(), Violation> {
    for value in &def.values {
        let subject = format!("{}.{}", def.type_name, value.value);
        if value.value.eq_ignore_ascii_case("UNKNOWN") {
            return Err(Violation::new(subject, "UNKNOWN is a reserved enum value"));
        }
        if !ENUM_VALUE.is_match(&value.value) {
            return Err(Violation::new(
                subject,
                format!("enum values must match pattern {}", ENUM_VALUE.as_str()),
            ));
        }
    }
    Ok(())
}

fn union_key_format(def: &UnionDefinition, _: &()) -> Result<(), Violation> {
    for member in &def.union {
        let key = member.field_name.as_str();
        if key.is_empty() {
            return Err(Violation::new(&def.type_name, "union member key must not be empty"));
        }
        if !is_identifier(key) {
            return Err(Violation::new(
                format!("{}.{}", def.type_name, key),
                "union member key must be a valid identifier",
            ));
        }
    }
    Ok(())
}

fn union_key_suffix(def: &UnionDefinition, _: &()) -> Result<(), Violation> {
    match def.union.iter().find(|m| m.field_name.as_str().ends_with('_')) {
        Some(member) => Err(Violation::new(
            format!("{}.{}", def.type_name, member.field_name),
            "union member key must not end with an underscore",
        )),
        None => Ok(()),
    }
}

/// Identifier start followed by identifier continue characters.
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

fn error_namespace_format(def: &ErrorDefinition, _: &()) -> Result<(), Violation> {
    if ERROR_NAMESPACE.is_match(def.namespace.as_str()) {
        Ok(())
    } else {
        Err(Violation::new(
            &def.error_name,
            format!(
                "error namespace '{}' must be UpperCamelCase",
                def.namespace
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConjureError;
    use crate::validators::validate_all;
    use conjure_ir::{EnumValueDefinition, ErrorCode, ErrorNamespace, PrimitiveType};

    fn name(n: &str) -> TypeName {
        TypeName::new(n, "com.example")
    }

    fn string() -> Type {
        Type::primitive(PrimitiveType::String)
    }

    fn object(fields: &[&str]) -> ObjectDefinition {
        ObjectDefinition {
            type_name: name("Widget"),
            fields: fields.iter().map(|f| FieldDefinition::new(*f, string())).collect(),
            docs: None,
        }
    }

    fn enumeration(values: &[&str]) -> EnumDefinition {
        EnumDefinition {
            type_name: name("Color"),
            values: values
                .iter()
                .map(|v| EnumValueDefinition {
                    value: v.to_string(),
                    docs: None,
                })
                .collect(),
            docs: None,
        }
    }

    fn union(keys: &[&str]) -> UnionDefinition {
        UnionDefinition {
            type_name: name("Shape"),
            union: keys.iter().map(|k| FieldDefinition::new(*k, string())).collect(),
            docs: None,
        }
    }

    fn rule_of(result: Result<(), ConjureError>) -> Option<Rule> {
        result.err().and_then(|e| e.rule())
    }

    #[test]
    fn test_field_names_unique_modulo_case() {
        assert_eq!(
            rule_of(validate_all(OBJECT_VALIDATORS, &object(&["fooBar", "foo-bar"]), &())),
            Some(Rule::UniqueFieldNames)
        );
        assert_eq!(
            rule_of(validate_all(OBJECT_VALIDATORS, &object(&["foo_bar", "fooBar"]), &())),
            Some(Rule::UniqueFieldNames)
        );
        assert!(validate_all(OBJECT_VALIDATORS, &object(&["fooBar", "fooBaz"]), &()).is_ok());
    }

    #[test]
    fn test_field_name_format() {
        let mixed = object(&["kebab-case", "snake_case"]);
        assert!(validate_all(OBJECT_VALIDATORS, &mixed, &()).is_ok());
        assert_eq!(
            rule_of(validate_all(OBJECT_VALIDATORS, &object(&["FooBar"]), &())),
            Some(Rule::FieldNameFormat)
        );
    }

    #[test]
    fn test_type_name_and_package_format() {
        let mut def = object(&["id"]);
        def.type_name = TypeName::new("widget", "com.example");
        assert_eq!(rule_of(validate_all(OBJECT_VALIDATORS, &def, &())), Some(Rule::TypeNameFormat));

        def.type_name = TypeName::new("Widget", "com.Example");
        assert_eq!(rule_of(validate_all(OBJECT_VALIDATORS, &def, &())), Some(Rule::PackageFormat));
    }

    #[test]
    fn test_complex_map_keys() {
        let mut def = object(&[]);
        def.fields.push(FieldDefinition::new(
            "index",
            Type::list(Type::map(Type::list(string()), string())),
        ));
        assert_eq!(
            rule_of(validate_all(OBJECT_VALIDATORS, &def, &())),
            Some(Rule::NoComplexMapKeys)
        );

        let mut def = object(&[]);
        def.fields.push(FieldDefinition::new(
            "index",
            Type::map(Type::reference(name("Color")), Type::map(string(), string())),
        ));
        assert!(validate_all(OBJECT_VALIDATORS, &def, &()).is_ok());
    }

    #[test]
    fn test_enum_value_format() {
        assert!(validate_all(ENUM_VALIDATORS, &enumeration(&["ONE", "TWO_A"]), &()).is_ok());
        for bad in ["one", "UNKNOWN", "unknown", "1A", "TWO__A"] {
            assert_eq!(
                rule_of(validate_all(ENUM_VALIDATORS, &enumeration(&[bad]), &())),
                Some(Rule::EnumValueFormat),
                "expected {:?} to be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_enum_values_unique() {
        assert_eq!(
            rule_of(validate_all(ENUM_VALIDATORS, &enumeration(&["ONE", "ONE"]), &())),
            Some(Rule::UniqueEnumValues)
        );
    }

    #[test]
    fn test_union_keys() {
        assert!(validate_all(UNION_VALIDATORS, &union(&["new", "circle"]), &()).is_ok());
        assert_eq!(
            rule_of(validate_all(UNION_VALIDATORS, &union(&[""]), &())),
            Some(Rule::UnionKeyFormat)
        );
        assert_eq!(
            rule_of(validate_all(UNION_VALIDATORS, &union(&["foo-bar"]), &())),
            Some(Rule::UnionKeyFormat)
        );
        assert_eq!(
            rule_of(validate_all(UNION_VALIDATORS, &union(&["foo_"]), &())),
            Some(Rule::UnionKeySuffix)
        );
    }

    #[test]
    fn test_error_definition() {
        let mut error = ErrorDefinition {
            error_name: name("WidgetNotFound"),
            docs: None,
            namespace: ErrorNamespace::new("Widgets"),
            code: ErrorCode::NotFound,
            safe_args: vec![FieldDefinition::new("widgetId", string())],
            unsafe_args: vec![FieldDefinition::new("widget-id", string())],
        };
        assert_eq!(
            rule_of(validate_all(ERROR_VALIDATORS, &error, &())),
            Some(Rule::UniqueFieldNames)
        );

        error.unsafe_args.clear();
        error.namespace = ErrorNamespace::new("widgets");
        assert_eq!(
            rule_of(validate_all(ERROR_VALIDATORS, &error, &())),
            Some(Rule::ErrorNamespaceFormat)
        );
    }
}
