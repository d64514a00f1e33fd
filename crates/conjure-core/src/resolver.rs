//! Reference resolution.
//!
//! A [`ReferenceResolver`] is a two-level lookup: the file's own [`Scope`],
//! then one hop through the namespace table to an imported file's scope.
//! Scopes carry no imports of their own, so an imported file's imports are
//! never reachable from the importer.

use conjure_ir::{Type, TypeName};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{ConjureError, ResolutionError, Rule};
use crate::patterns::IMPORT_NAMESPACE;
use crate::source::raw::{RawExternalImport, RawTypes};
use crate::source::{SourceFile, SourceSet, TypeExpr};

/// The names one file defines: local definitions and external imports.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a> {
    types: &'a RawTypes,
}

impl<'a> Scope<'a> {
    pub fn new(types: &'a RawTypes) -> Self {
        Self { types }
    }

    /// `TypeName` of a locally defined object, enum, union or alias.
    pub fn type_name(&self, name: &str) -> Result<Option<TypeName>, ConjureError> {
        let definitions = &self.types.definitions;
        match definitions.objects.get(name) {
            Some(def) => {
                let package = definitions.package_of(def.package()).ok_or_else(|| {
                    ConjureError::Parse(format!(
                        "type '{}' declares no package and the file has no default-package",
                        name
                    ))
                })?;
                Ok(Some(TypeName::new(name, package)))
            }
            None => Ok(None),
        }
    }

    /// Resolve a simple name: local definitions first, then external imports.
    pub fn resolve_local(&self, name: &str) -> Result<Option<Type>, ConjureError> {
        if let Some(type_name) = self.type_name(name)? {
            return Ok(Some(Type::reference(type_name)));
        }
        match self.types.imports.get(name) {
            Some(import) => external_type(name, import).map(Some),
            None => Ok(None),
        }
    }
}

fn external_type(name: &str, import: &RawExternalImport) -> Result<Type, ConjureError> {
    let qualified = import
        .external
        .get("java")
        .or_else(|| import.external.values().next())
        .ok_or_else(|| {
            ConjureError::Parse(format!("external import '{}' declares no external name", name))
        })?;
    let external_reference = match qualified.rsplit_once('.') {
        Some((package, simple)) => TypeName::new(simple, package),
        None => TypeName::new(qualified.as_str(), ""),
    };

    let fallback = match import.base_type.parse::<TypeExpr>()? {
        TypeExpr::Primitive(primitive) => Type::primitive(primitive),
        other => {
            return Err(ConjureError::Parse(format!(
                "base-type of external import '{}' must be a primitive, found '{}'",
                name, other
            )))
        }
    };
    Ok(Type::external(external_reference, fallback))
}

/// Resolves type expressions written in one file.
#[derive(Debug, Clone)]
pub struct ReferenceResolver<'a> {
    local: Scope<'a>,
    namespaces: BTreeMap<String, Scope<'a>>,
}

impl<'a> ReferenceResolver<'a> {
    /// A resolver for a file with no imports.
    pub fn local(types: &'a RawTypes) -> Self {
        Self {
            local: Scope::new(types),
            namespaces: BTreeMap::new(),
        }
    }

    /// A resolver for `file`, seeded with its direct imports from `sources`.
    pub fn for_file(file: &'a SourceFile, sources: &'a SourceSet) -> Result<Self, ConjureError> {
        let mut resolver = Self::local(&file.definition.types);
        for (namespace, path) in file.imports() {
            if !IMPORT_NAMESPACE.is_match(namespace) {
                return Err(ResolutionError::IllegalNamespace(namespace.to_string()).into());
            }
            let imported = sources.get(&path).ok_or_else(|| ResolutionError::MissingImport {
                namespace: namespace.to_string(),
                path: path.display().to_string(),
            })?;
            debug!(namespace, path = %path.display(), "Registered import");
            resolver
                .namespaces
                .insert(namespace.to_string(), Scope::new(&imported.definition.types));
        }
        Ok(resolver)
    }

    /// The file's own scope.
    pub fn scope(&self) -> Scope<'a> {
        self.local
    }

    /// Parse and resolve a type expression.
    pub fn resolve_str(&self, expr: &str) -> Result<Type, ConjureError> {
        self.resolve(&expr.parse::<TypeExpr>()?)
    }

    /// Resolve a parsed type expression.
    pub fn resolve(&self, expr: &TypeExpr) -> Result<Type, ConjureError> {
        match expr {
            TypeExpr::Primitive(primitive) => Ok(Type::primitive(primitive.clone())),
            TypeExpr::Optional(inner) => {
                let item = self.resolve(inner)?;
                Type::optional(item).map_err(|e| {
                    ConjureError::validation(Rule::NoNestedOptional, expr, e.to_string())
                })
            }
            TypeExpr::List(inner) => Ok(Type::list(self.resolve(inner)?)),
            TypeExpr::Set(inner) => Ok(Type::set(self.resolve(inner)?)),
            TypeExpr::Map(key, value) => Ok(Type::map(self.resolve(key)?, self.resolve(value)?)),
            TypeExpr::Local(name) => self.local.resolve_local(name)?.ok_or_else(|| {
                ResolutionError::UnknownType {
                    reference: name.clone(),
                }
                .into()
            }),
            TypeExpr::Foreign { namespace, name } => {
                let scope = self.namespaces.get(namespace).ok_or_else(|| {
                    ResolutionError::UnknownNamespace {
                        namespace: namespace.clone(),
                        reference: expr.to_string(),
                    }
                })?;
                scope.resolve_local(name)?.ok_or_else(|| {
                    ResolutionError::UnknownType {
                        reference: expr.to_string(),
                    }
                    .into()
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RawDefinition;
    use conjure_ir::PrimitiveType;
    use std::path::Path;

    const COMMON: &str = r#"
types:
  conjure-imports:
    deep: deep.yml
  definitions:
    default-package: com.example.common
    objects:
      Money:
        fields:
          amount: double
"#;

    const DEEP: &str = r#"
types:
  definitions:
    default-package: com.example.deep
    objects:
      Secret:
        alias: string
"#;

    const API: &str = r#"
types:
  conjure-imports:
    common: common.yml
  imports:
    Long:
      base-type: safelong
      external:
        java: java.lang.Long
  definitions:
    default-package: com.example.api
    objects:
      Widget:
        fields:
          price: common.Money
      Ledger:
        package: com.example.ledger
        alias: list<Widget>
"#;

    fn sources() -> SourceSet {
        let mut set = SourceSet::new();
        set.add_target(SourceFile::from_yaml("api.yml", API).unwrap());
        set.add_import(SourceFile::from_yaml("common.yml", COMMON).unwrap());
        set.add_import(SourceFile::from_yaml("deep.yml", DEEP).unwrap());
        set
    }

    #[test]
    fn test_local_reference_uses_own_or_default_package() {
        let set = sources();
        let api = set.get(Path::new("api.yml")).unwrap();
        let resolver = ReferenceResolver::for_file(api, &set).unwrap();

        assert_eq!(
            resolver.resolve_str("Widget").unwrap(),
            Type::reference(TypeName::new("Widget", "com.example.api"))
        );
        assert_eq!(
            resolver.resolve_str("optional<Ledger>").unwrap(),
            Type::optional(Type::reference(TypeName::new("Ledger", "com.example.ledger"))).unwrap()
        );
    }

    #[test]
    fn test_external_import_resolves_with_fallback() {
        let set = sources();
        let api = set.get(Path::new("api.yml")).unwrap();
        let resolver = ReferenceResolver::for_file(api, &set).unwrap();

        assert_eq!(
            resolver.resolve_str("Long").unwrap(),
            Type::external(
                TypeName::new("Long", "java.lang"),
                Type::primitive(PrimitiveType::Safelong)
            )
        );
    }

    #[test]
    fn test_foreign_reference_resolves_one_level_deep() {
        let set = sources();
        let api = set.get(Path::new("api.yml")).unwrap();
        let resolver = ReferenceResolver::for_file(api, &set).unwrap();

        assert_eq!(
            resolver.resolve_str("map<string, common.Money>").unwrap(),
            Type::map(
                Type::primitive(PrimitiveType::String),
                Type::reference(TypeName::new("Money", "com.example.common"))
            )
        );

        // common.yml imports deep.yml, but api.yml cannot see it
        let err = resolver.resolve_str("deep.Secret").unwrap_err();
        assert!(matches!(
            err,
            ConjureError::ReferenceResolution(ResolutionError::UnknownNamespace { .. })
        ));
    }

    #[test]
    fn test_unknown_local_type() {
        let set = sources();
        let api = set.get(Path::new("api.yml")).unwrap();
        let resolver = ReferenceResolver::for_file(api, &set).unwrap();

        let err = resolver.resolve_str("list<Gadget>").unwrap_err();
        assert!(matches!(
            err,
            ConjureError::ReferenceResolution(ResolutionError::UnknownType { ref reference })
                if reference == "Gadget"
        ));
        let err = resolver.resolve_str("common.Gadget").unwrap_err();
        assert!(err.to_string().contains("common.Gadget"));
    }

    #[test]
    fn test_nested_optional_rejected() {
        let definition = RawDefinition::default();
        let resolver = ReferenceResolver::local(&definition.types);
        let err = resolver.resolve_str("optional<optional<string>>").unwrap_err();
        assert_eq!(err.rule(), Some(Rule::NoNestedOptional));
    }

    #[test]
    fn test_illegal_and_missing_imports() {
        let bad_namespace = SourceFile::from_yaml(
            "bad.yml",
            "types:\n  conjure-imports:\n    Common: common.yml\n",
        )
        .unwrap();
        let missing = SourceFile::from_yaml(
            "missing.yml",
            "types:\n  conjure-imports:\n    other: nowhere.yml\n",
        )
        .unwrap();
        let set = SourceSet::from_targets(vec![bad_namespace.clone(), missing.clone()]);

        assert!(matches!(
            ReferenceResolver::for_file(&bad_namespace, &set),
            Err(ConjureError::ReferenceResolution(ResolutionError::IllegalNamespace(_)))
        ));
        assert!(matches!(
            ReferenceResolver::for_file(&missing, &set),
            Err(ConjureError::ReferenceResolution(ResolutionError::MissingImport { .. }))
        ));
    }
}
