//! Raw definition documents, as authored in YAML.
//!
//! Maps are `IndexMap`s so declaration order survives into the IR. Type
//! expressions stay strings here and are parsed during resolution, which
//! keeps malformed expressions reportable with their context.

use indexmap::IndexMap;
use serde::Deserialize;

/// One definition file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDefinition {
    #[serde(default)]
    pub types: RawTypes,

    #[serde(default)]
    pub services: IndexMap<String, RawService>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawTypes {
    /// Namespace alias -> path of the imported file, relative to this file
    #[serde(default)]
    pub conjure_imports: IndexMap<String, String>,

    /// Types defined outside the IDL
    #[serde(default)]
    pub imports: IndexMap<String, RawExternalImport>,

    #[serde(default)]
    pub definitions: RawDefinitions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawExternalImport {
    pub base_type: String,

    /// Target language -> fully qualified name
    #[serde(default)]
    pub external: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawDefinitions {
    #[serde(default)]
    pub default_package: Option<String>,

    #[serde(default)]
    pub objects: IndexMap<String, RawTypeDefinition>,

    #[serde(default)]
    pub errors: IndexMap<String, RawErrorDefinition>,
}

impl RawDefinitions {
    /// Package of a definition: its own, else the file default.
    pub fn package_of<'a>(&'a self, own: Option<&'a str>) -> Option<&'a str> {
        own.or(self.default_package.as_deref())
    }
}

/// An object, enum, union or alias, told apart by which key is present.
///
/// Each shape rejects keys of the others, so a definition mixing two shapes
/// matches none.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawTypeDefinition {
    Object(RawObject),
    Enum(RawEnum),
    Union(RawUnion),
    Alias(RawAlias),
}

impl RawTypeDefinition {
    pub fn package(&self) -> Option<&str> {
        match self {
            RawTypeDefinition::Object(def) => def.package.as_deref(),
            RawTypeDefinition::Enum(def) => def.package.as_deref(),
            RawTypeDefinition::Union(def) => def.package.as_deref(),
            RawTypeDefinition::Alias(def) => def.package.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawObject {
    pub fields: IndexMap<String, RawField>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawEnum {
    pub values: Vec<RawEnumValue>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawUnion {
    pub union: IndexMap<String, RawField>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawAlias {
    pub alias: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawEnumValue {
    Short(String),
    Full {
        value: String,
        #[serde(default)]
        docs: Option<String>,
    },
}

impl RawEnumValue {
    pub fn value(&self) -> &str {
        match self {
            RawEnumValue::Short(value) => value,
            RawEnumValue::Full { value, .. } => value,
        }
    }

    pub fn docs(&self) -> Option<&str> {
        match self {
            RawEnumValue::Short(_) => None,
            RawEnumValue::Full { docs, .. } => docs.as_deref(),
        }
    }
}

/// An object field, union member or error argument.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Short(String),
    Full(RawFieldDefinition),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFieldDefinition {
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
}

impl RawField {
    pub fn type_expr(&self) -> &str {
        match self {
            RawField::Short(ty) => ty,
            RawField::Full(def) => &def.field_type,
        }
    }

    pub fn docs(&self) -> Option<&str> {
        match self {
            RawField::Short(_) => None,
            RawField::Full(def) => def.docs.as_deref(),
        }
    }

    pub fn default(&self) -> Option<&serde_yaml::Value> {
        match self {
            RawField::Short(_) => None,
            RawField::Full(def) => def.default.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawErrorDefinition {
    pub namespace: String,
    pub code: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub safe_args: IndexMap<String, RawField>,
    #[serde(default)]
    pub unsafe_args: IndexMap<String, RawField>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawService {
    /// Human readable name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
    /// `none`, `header` or `cookie:<name>`
    #[serde(default)]
    pub default_auth: Option<String>,
    #[serde(default)]
    pub base_path: Option<String>,
    #[serde(default)]
    pub endpoints: IndexMap<String, RawEndpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEndpoint {
    /// `<METHOD> <path>`
    pub http: String,
    #[serde(default)]
    pub auth: Option<String>,
    #[serde(default)]
    pub args: IndexMap<String, RawArgument>,
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub deprecated: Option<String>,
    #[serde(default)]
    pub markers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawArgument {
    Short(String),
    Full(RawArgumentDefinition),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawArgumentDefinition {
    #[serde(rename = "type")]
    pub arg_type: String,
    #[serde(default)]
    pub param_type: Option<String>,
    #[serde(default)]
    pub param_id: Option<String>,
    #[serde(default)]
    pub docs: Option<String>,
    #[serde(default)]
    pub markers: Vec<String>,
    #[serde(default)]
    pub default: Option<serde_yaml::Value>,
}

impl RawArgument {
    /// Normalize the short form into a full definition.
    pub fn to_definition(&self) -> RawArgumentDefinition {
        match self {
            RawArgument::Short(ty) => RawArgumentDefinition {
                arg_type: ty.clone(),
                param_type: None,
                param_id: None,
                docs: None,
                markers: Vec::new(),
                default: None,
            },
            RawArgument::Full(def) => def.clone(),
        }
    }
}
