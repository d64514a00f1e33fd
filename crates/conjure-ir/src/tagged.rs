//! Serde plumbing for `"type"`-discriminated sum types.
//!
//! `#[serde(tag = "type")]` cannot express the payload-under-a-same-named-key
//! layout nor keep unrecognized variants, so each sum type is declared with
//! [`tagged_union!`] which generates both impls against the helpers here.

use serde::de::{self, DeserializeOwned};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A sum-type variant this release does not recognize.
///
/// The discriminant and every other property are retained so the value
/// serializes back exactly as it was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// The unrecognized `"type"` discriminant.
    pub type_name: String,

    /// All remaining properties, in their original order.
    pub fields: Map<String, Value>,
}

impl UnknownVariant {
    pub(crate) fn serialize_fields<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("type", &self.type_name)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

pub(crate) fn serialize_variant<S, T>(
    serializer: S,
    tag: &str,
    payload: &T,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + ?Sized,
{
    let mut map = serializer.serialize_map(Some(2))?;
    map.serialize_entry("type", tag)?;
    map.serialize_entry(tag, payload)?;
    map.end()
}

/// Split a tagged object into its discriminant and remaining properties.
pub(crate) fn split<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<(String, Map<String, Value>), D::Error> {
    let mut fields = Map::deserialize(deserializer)?;
    match fields.remove("type") {
        Some(Value::String(tag)) => Ok((tag, fields)),
        Some(other) => Err(de::Error::custom(format!(
            "discriminant \"type\" must be a string, found {}",
            other
        ))),
        None => Err(de::Error::missing_field("type")),
    }
}

pub(crate) fn payload<T, E>(fields: &mut Map<String, Value>, tag: &'static str) -> Result<T, E>
where
    T: DeserializeOwned,
    E: de::Error,
{
    let value = fields.remove(tag).ok_or_else(|| E::missing_field(tag))?;
    serde_json::from_value(value).map_err(E::custom)
}

/// Declare a sum type serialized as `{"type": tag, tag: payload}` with an
/// implicit `Unknown(UnknownVariant)` catch-all.
macro_rules! tagged_union {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident($payload:ty) = $tag:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant($payload),
            )+
            /// A variant written by a newer schema revision.
            Unknown($crate::tagged::UnknownVariant),
        }

        impl $name {
            /// The `"type"` discriminant of this value.
            pub fn discriminant(&self) -> &str {
                match self {
                    $( $name::$variant(_) => $tag, )+
                    $name::Unknown(unknown) => unknown.type_name.as_str(),
                }
            }

            /// Whether this value is a variant unknown to this release.
            pub fn is_unknown(&self) -> bool {
                matches!(self, $name::Unknown(_))
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                match self {
                    $( $name::$variant(payload) => {
                        $crate::tagged::serialize_variant(serializer, $tag, payload)
                    } )+
                    $name::Unknown(unknown) => unknown.serialize_fields(serializer),
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let (tag, mut fields) = $crate::tagged::split(deserializer)?;
                match tag.as_str() {
                    $( $tag => $crate::tagged::payload(&mut fields, $tag).map($name::$variant), )+
                    _ => Ok($name::Unknown($crate::tagged::UnknownVariant {
                        type_name: tag,
                        fields,
                    })),
                }
            }
        }
    };
}
