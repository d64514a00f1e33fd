//! Error taxonomy for the compile pipeline.
//!
//! Every error is terminal: the first one raised aborts the compile and no
//! partial IR is returned.

use conjure_ir::TypeName;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Errors that can occur while compiling definitions.
#[derive(Error, Debug)]
pub enum ConjureError {
    #[error("Failed to read definition file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Malformed definition: {0}")]
    Parse(String),

    #[error("Reference resolution failed: {0}")]
    ReferenceResolution(#[from] ResolutionError),

    #[error("{rule} violated by {subject}: {message}")]
    Validation {
        rule: Rule,
        subject: String,
        message: String,
    },

    #[error("Invalid default value: {0}")]
    DefaultValue(#[from] DefaultValueError),

    #[error("Unsupported schema variant: {0}")]
    UnknownSchemaVariant(String),
}

impl ConjureError {
    pub fn validation(rule: Rule, subject: impl fmt::Display, message: impl Into<String>) -> Self {
        ConjureError::Validation {
            rule,
            subject: subject.to_string(),
            message: message.into(),
        }
    }

    /// The violated rule, if this is a validation error.
    pub fn rule(&self) -> Option<Rule> {
        match self {
            ConjureError::Validation { rule, .. } => Some(*rule),
            _ => None,
        }
    }
}

/// A reference that could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Unknown LocalReferenceType '{reference}'")]
    UnknownType { reference: String },

    #[error("Unknown namespace '{namespace}' in reference '{reference}'")]
    UnknownNamespace { namespace: String, reference: String },

    #[error("Import namespace '{0}' must match [a-z]{{2,10}}")]
    IllegalNamespace(String),

    #[error("Import '{namespace}' points at '{path}', which is not among the loaded files")]
    MissingImport { namespace: String, path: String },

    #[error("No definition for type '{0}'")]
    UndefinedType(TypeName),
}

/// A default value that cannot be attached to its declared type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefaultValueError {
    #[error("Fields of type '{type_description}' do not support default values")]
    UnsupportedType { type_description: String },

    #[error("'{literal}' is not a legal default value for type '{type_description}': {reason}")]
    IllegalLiteral {
        literal: String,
        type_description: String,
        reason: String,
    },
}

/// Named semantic rules enforced by the validator set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    // Definition level
    UniqueServiceNames,
    ServiceSuffix,
    IllegalVersion,
    UniqueNames,
    NoNestedOptional,
    AcyclicAliases,

    // Type definitions
    TypeNameFormat,
    PackageFormat,
    FieldNameFormat,
    UniqueFieldNames,
    NoComplexMapKeys,
    UniqueEnumValues,
    EnumValueFormat,
    UnionKeyFormat,
    UnionKeySuffix,
    ErrorNamespaceFormat,

    // Services
    UniquePathMethods,

    // Endpoints
    NoUnknownHttpMethod,
    HttpPathFormat,
    SingleBodyParam,
    PathParamsMatch,
    NoBinaryOrAnyNonBody,
    NoBearerTokenPathOrQuery,
    PathParamTypes,
    HeaderParamTypes,
    QueryParamTypes,
    NoGetBody,
    NoOptionalBinaryBody,
    ParameterNameFormat,
    HeaderParamIdFormat,
    QueryParamIdFormat,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::UniqueServiceNames => "UNIQUE_SERVICE_NAMES",
            Rule::IllegalVersion => "ILLEGAL_VERSION",
            Rule::UniqueNames => "UNIQUE_NAMES",
            Rule::NoNestedOptional => "NO_NESTED_OPTIONAL",
            Rule::AcyclicAliases => "ACYCLIC_ALIASES",
            Rule::TypeNameFormat => "TYPE_NAME_FORMAT",
            Rule::PackageFormat => "PACKAGE_FORMAT",
            Rule::FieldNameFormat => "FIELD_NAME_FORMAT",
            Rule::UniqueFieldNames => "UNIQUE_FIELD_NAMES",
            Rule::NoComplexMapKeys => "NO_COMPLEX_MAP_KEYS",
            Rule::UniqueEnumValues => "UNIQUE_ENUM_VALUES",
            Rule::EnumValueFormat => "ENUM_VALUE_FORMAT",
            Rule::UnionKeyFormat => "UNION_KEY_FORMAT",
            Rule::UnionKeySuffix => "UNION_KEY_SUFFIX",
            Rule::ErrorNamespaceFormat => "ERROR_NAMESPACE_FORMAT",
            Rule::ServiceSuffix => "SERVICE_SUFFIX",
            Rule::UniquePathMethods => "UNIQUE_PATH_METHODS",
            Rule::NoUnknownHttpMethod => "NO_UNKNOWN_HTTP_METHOD",
            Rule::HttpPathFormat => "HTTP_PATH_FORMAT",
            Rule::SingleBodyParam => "SINGLE_BODY_PARAM",
            Rule::PathParamsMatch => "PATH_PARAMS_MATCH",
            Rule::NoBinaryOrAnyNonBody => "NO_BINARY_OR_ANY_NON_BODY",
            Rule::NoBearerTokenPathOrQuery => "NO_BEARER_TOKEN_PATH_OR_QUERY",
            Rule::PathParamTypes => "PATH_PARAM_TYPES",
            Rule::HeaderParamTypes => "HEADER_PARAM_TYPES",
            Rule::QueryParamTypes => "QUERY_PARAM_TYPES",
            Rule::NoGetBody => "NO_GET_BODY",
            Rule::NoOptionalBinaryBody => "NO_OPTIONAL_BINARY_BODY",
            Rule::ParameterNameFormat => "PARAMETER_NAME_FORMAT",
            Rule::HeaderParamIdFormat => "HEADER_PARAM_ID_FORMAT",
            Rule::QueryParamIdFormat => "QUERY_PARAM_ID_FORMAT",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ConjureError::validation(
            Rule::ServiceSuffix,
            "com.example.FooRetrofit",
            "reserved suffix",
        );
        assert_eq!(
            err.to_string(),
            "SERVICE_SUFFIX violated by com.example.FooRetrofit: reserved suffix"
        );
        assert_eq!(err.rule(), Some(Rule::ServiceSuffix));
    }

    #[test]
    fn test_rule_serializes_like_display() {
        let json = serde_json::to_string(&Rule::NoNestedOptional).unwrap();
        assert_eq!(json, format!("\"{}\"", Rule::NoNestedOptional));
    }
}
