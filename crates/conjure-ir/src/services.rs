//! Services, endpoints and their arguments.

use serde::{Deserialize, Serialize};

use crate::enums::HttpMethod;
use crate::names::{ArgumentName, Documentation, EndpointName, HttpPath, ParameterId, TypeName};
use crate::types::Type;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub service_name: TypeName,
    #[serde(default)]
    pub endpoints: Vec<EndpointDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointDefinition {
    pub endpoint_name: EndpointName,
    pub http_method: HttpMethod,
    pub http_path: HttpPath,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthType>,
    #[serde(default)]
    pub args: Vec<ArgumentDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Type>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Documentation>,
    #[serde(default)]
    pub markers: Vec<Type>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentDefinition {
    pub arg_name: ArgumentName,
    #[serde(rename = "type")]
    pub arg_type: Type,
    pub param_type: ParameterType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Documentation>,
    #[serde(default)]
    pub markers: Vec<Type>,
}

tagged_union! {
    /// Where on the wire an argument travels.
    pub enum ParameterType {
        Body(BodyParameterType) = "body",
        Header(HeaderParameterType) = "header",
        Path(PathParameterType) = "path",
        Query(QueryParameterType) = "query",
    }
}

impl ParameterType {
    pub fn body() -> Self {
        ParameterType::Body(BodyParameterType {})
    }

    pub fn path() -> Self {
        ParameterType::Path(PathParameterType {})
    }

    pub fn header(param_id: impl Into<ParameterId>) -> Self {
        ParameterType::Header(HeaderParameterType {
            param_id: param_id.into(),
        })
    }

    pub fn query(param_id: impl Into<ParameterId>) -> Self {
        ParameterType::Query(QueryParameterType {
            param_id: param_id.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyParameterType {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParameterType {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderParameterType {
    pub param_id: ParameterId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameterType {
    pub param_id: ParameterId,
}

tagged_union! {
    /// How callers authenticate against an endpoint.
    pub enum AuthType {
        Header(HeaderAuthType) = "header",
        Cookie(CookieAuthType) = "cookie",
    }
}

impl AuthType {
    pub fn header() -> Self {
        AuthType::Header(HeaderAuthType {})
    }

    pub fn cookie(cookie_name: impl Into<String>) -> Self {
        AuthType::Cookie(CookieAuthType {
            cookie_name: cookie_name.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderAuthType {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieAuthType {
    pub cookie_name: String,
}
