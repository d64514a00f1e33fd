//! Endpoint argument classification.

use conjure_ir::ParameterType;
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::ConjureError;
use crate::patterns::PATH_VARIABLE;

/// Parameter kind as declared in a definition file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamKind {
    /// Path if the name appears in the path template, otherwise body.
    #[default]
    Auto,
    Path,
    Body,
    Header,
    Query,
}

impl FromStr for ParamKind {
    type Err = ConjureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ParamKind::Auto),
            "path" => Ok(ParamKind::Path),
            "body" => Ok(ParamKind::Body),
            "header" => Ok(ParamKind::Header),
            "query" => Ok(ParamKind::Query),
            _ => Err(ConjureError::Parse(format!(
                "unknown param-type '{}', expected one of auto, path, body, header, query",
                s
            ))),
        }
    }
}

/// Names of the variables in a path template, e.g. `id` and `rest` in
/// `/widgets/{id}/{rest:.*}`.
pub fn path_variables(path: &str) -> BTreeSet<String> {
    PATH_VARIABLE
        .captures_iter(path)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Resolve an argument's declared kind to its wire parameter type.
///
/// Header and query parameters travel under `param_id` when given, otherwise
/// under the argument's own name.
pub fn classify(
    arg_name: &str,
    kind: ParamKind,
    param_id: Option<&str>,
    path_variables: &BTreeSet<String>,
) -> ParameterType {
    let wire_name = param_id.unwrap_or(arg_name);
    match kind {
        ParamKind::Auto if path_variables.contains(arg_name) => ParameterType::path(),
        ParamKind::Auto => ParameterType::body(),
        ParamKind::Path => ParameterType::path(),
        ParamKind::Body => ParameterType::body(),
        ParamKind::Header => ParameterType::header(wire_name),
        ParamKind::Query => ParameterType::query(wire_name),
    }
}
