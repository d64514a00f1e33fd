//! Enumerated value types with unknown-value support.
//!
//! Values serialize as their upper-cased name. Any other string, including a
//! known name in another case, deserializes to `Unknown` and keeps its text
//! so it is written back unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $variant:ident = $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $variant, )+
            /// A value this release does not recognize.
            Unknown(String),
        }

        impl $name {
            /// Every value known to this release, in declaration order.
            pub const VALUES: &'static [$name] = &[ $( $name::$variant, )+ ];

            /// The wire name of this value.
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $wire, )+
                    $name::Unknown(raw) => raw.as_str(),
                }
            }

            pub fn is_unknown(&self) -> bool {
                matches!(self, $name::Unknown(_))
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                match raw {
                    $( $wire => $name::$variant, )+
                    _ => $name::Unknown(raw.to_string()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Ok($name::from(raw.as_str()))
            }
        }
    };
}

open_enum! {
    /// Built-in scalar types.
    pub enum PrimitiveType {
        String = "STRING",
        Datetime = "DATETIME",
        Integer = "INTEGER",
        Double = "DOUBLE",
        Safelong = "SAFELONG",
        Binary = "BINARY",
        Any = "ANY",
        Boolean = "BOOLEAN",
        Uuid = "UUID",
        Rid = "RID",
        Bearertoken = "BEARERTOKEN",
    }
}

open_enum! {
    /// HTTP methods an endpoint may declare.
    pub enum HttpMethod {
        Get = "GET",
        Post = "POST",
        Put = "PUT",
        Delete = "DELETE",
    }
}

open_enum! {
    /// Error codes, each mapping to a fixed HTTP status.
    pub enum ErrorCode {
        PermissionDenied = "PERMISSION_DENIED",
        InvalidArgument = "INVALID_ARGUMENT",
        NotFound = "NOT_FOUND",
        Conflict = "CONFLICT",
        RequestEntityTooLarge = "REQUEST_ENTITY_TOO_LARGE",
        FailedPrecondition = "FAILED_PRECONDITION",
        Internal = "INTERNAL",
        Timeout = "TIMEOUT",
        CustomClient = "CUSTOM_CLIENT",
        CustomServer = "CUSTOM_SERVER",
    }
}

impl ErrorCode {
    /// HTTP status code carried by errors of this code.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ErrorCode::PermissionDenied => Some(403),
            ErrorCode::InvalidArgument => Some(400),
            ErrorCode::NotFound => Some(404),
            ErrorCode::Conflict => Some(409),
            ErrorCode::RequestEntityTooLarge => Some(413),
            ErrorCode::FailedPrecondition => Some(500),
            ErrorCode::Internal => Some(500),
            ErrorCode::Timeout => Some(500),
            ErrorCode::CustomClient => Some(400),
            ErrorCode::CustomServer => Some(500),
            ErrorCode::Unknown(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_match_exact_spelling() {
        assert_eq!(HttpMethod::from("GET"), HttpMethod::Get);
        assert_eq!(PrimitiveType::from("BEARERTOKEN"), PrimitiveType::Bearertoken);
        assert_eq!(ErrorCode::from("NOT_FOUND"), ErrorCode::NotFound);
        assert_eq!(HttpMethod::from("get"), HttpMethod::Unknown("get".to_string()));
    }

    #[test]
    fn test_non_canonical_spelling_round_trips() {
        let method: HttpMethod = serde_json::from_str("\"get\"").unwrap();
        assert!(method.is_unknown());
        assert_eq!(serde_json::to_string(&method).unwrap(), "\"get\"");

        let code: ErrorCode = serde_json::from_str("\"Not_Found\"").unwrap();
        assert_eq!(code.http_status(), None);
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"Not_Found\"");
    }

    #[test]
    fn test_unknown_value_keeps_original_text() {
        let method: HttpMethod = serde_json::from_str("\"PATCH\"").unwrap();
        assert_eq!(method, HttpMethod::Unknown("PATCH".to_string()));
        assert!(method.is_unknown());
        assert_eq!(serde_json::to_string(&method).unwrap(), "\"PATCH\"");
    }

    #[test]
    fn test_serializes_upper_case_name() {
        let json = serde_json::to_string(&PrimitiveType::Safelong).unwrap();
        assert_eq!(json, "\"SAFELONG\"");
        assert_eq!(ErrorCode::Conflict.http_status(), Some(409));
    }
}
