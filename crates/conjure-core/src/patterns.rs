//! Naming patterns and case conversion shared by the validators.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    pub static ref LOWER_CAMEL_CASE: Regex =
        Regex::new(r"^[a-z]([A-Z]{1,2}[a-z0-9]|[a-z0-9])*[A-Z]?$").unwrap();
    pub static ref KEBAB_CASE: Regex =
        Regex::new(r"^[a-z]((-[a-z]){1,2}[a-z0-9]|[a-z0-9])*(-[a-z])?$").unwrap();
    pub static ref SNAKE_CASE: Regex =
        Regex::new(r"^[a-z]((_[a-z]){1,2}[a-z0-9]|[a-z0-9])*(_[a-z])?$").unwrap();

    pub static ref TYPE_NAME: Regex = Regex::new(r"^[A-Z][a-z0-9]+([A-Z][a-z0-9]+)*$").unwrap();
    pub static ref PACKAGE: Regex = Regex::new(r"^([a-z][a-z0-9]+(\.[a-z][a-z0-9]*)*)?$").unwrap();
    pub static ref IMPORT_NAMESPACE: Regex = Regex::new(r"^[a-z]{2,10}$").unwrap();
    pub static ref ERROR_NAMESPACE: Regex = Regex::new(r"^([A-Z][a-z0-9]+)+$").unwrap();
    pub static ref ENUM_VALUE: Regex = Regex::new(r"^[A-Z][A-Z0-9]*(_[A-Z0-9]+)*$").unwrap();
    pub static ref HEADER_PARAM_ID: Regex =
        Regex::new(r"^[A-Z][a-zA-Z0-9]*(-[A-Z][a-zA-Z0-9]*)*$").unwrap();

    // HTTP path segments
    pub static ref PATH_SEGMENT: Regex = Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").unwrap();
    pub static ref PATH_PARAM_SEGMENT: Regex =
        Regex::new(r"^\{[a-z][a-z0-9]*([A-Z0-9][a-z0-9]+)*\}$").unwrap();
    pub static ref PATH_PARAM_REGEX_SEGMENT: Regex =
        Regex::new(r"^\{[a-z][a-z0-9]*([A-Z0-9][a-z0-9]+)*(:\.\+|:\.\*)\}$").unwrap();
    pub static ref PATH_VARIABLE: Regex = Regex::new(r"\{([^}:]+)(:[^}]*)?\}").unwrap();

    // Default value literals
    pub static ref DOUBLE: Regex =
        Regex::new(r"^[+-]?(NaN|Infinity|(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?)$").unwrap();
    pub static ref UUID: Regex = Regex::new(
        r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"
    )
    .unwrap();
    pub static ref RID: Regex = Regex::new(
        r"^ri\.[a-z][a-z0-9\-]*\.([a-z0-9][a-z0-9\-]*)?\.[a-z][a-z0-9\-]*\.[a-zA-Z0-9_\-\.]+$"
    )
    .unwrap();
}

/// Naming conventions accepted for field names and query parameter ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    LowerCamel,
    Kebab,
    Snake,
}

impl Case {
    /// Detect the convention a name follows, if any.
    pub fn of(name: &str) -> Option<Case> {
        if LOWER_CAMEL_CASE.is_match(name) {
            Some(Case::LowerCamel)
        } else if KEBAB_CASE.is_match(name) {
            Some(Case::Kebab)
        } else if SNAKE_CASE.is_match(name) {
            Some(Case::Snake)
        } else {
            None
        }
    }
}

/// Normalize a kebab or snake case name to lowerCamelCase.
///
/// Names already in lowerCamelCase, or in no recognized convention, are
/// returned unchanged.
pub fn to_lower_camel(name: &str) -> String {
    let separator = match Case::of(name) {
        Some(Case::Kebab) => '-',
        Some(Case::Snake) => '_',
        _ => return name.to_string(),
    };

    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if c == separator {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}
