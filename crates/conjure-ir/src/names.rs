//! Names and string-wrapped identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique name of a user-defined type, error or service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeName {
    /// UpperCamelCase simple name
    pub name: String,

    /// Dotted lowercase package
    pub package: String,
}

impl TypeName {
    pub fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_newtype!(
    /// Name of an object field, union member or error argument.
    FieldName
);
string_newtype!(EndpointName);
string_newtype!(ArgumentName);
string_newtype!(
    /// Free-form documentation attached to a definition.
    Documentation
);
string_newtype!(
    /// Full HTTP path template of an endpoint, e.g. `/widgets/{id}`.
    HttpPath
);
string_newtype!(
    /// Wire name of a header or query parameter.
    ParameterId
);
string_newtype!(ErrorNamespace);
