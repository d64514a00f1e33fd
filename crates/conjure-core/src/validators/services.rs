//! Validators for services and their endpoints.

use conjure_ir::{
    ArgumentDefinition, EndpointDefinition, HttpMethod, ParameterType, PrimitiveType,
    ServiceDefinition, Type, TypeDefinition, TypeName,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

use super::{validate_all, Validator, Violation};
use crate::dealias::{Dealiased, Dealiaser};
use crate::error::{ConjureError, Rule};
use crate::params::path_variables;
use crate::patterns::{
    Case, HEADER_PARAM_ID, LOWER_CAMEL_CASE, PATH_PARAM_REGEX_SEGMENT, PATH_PARAM_SEGMENT,
    PATH_SEGMENT, PATH_VARIABLE,
};

/// Headers owned by the transport layer.
const PROTOCOL_HEADERS: &[&str] = &["Host", "Accept", "Content-Type"];

pub static SERVICE_VALIDATORS: &[Validator<ServiceDefinition>] =
    &[Validator::new(Rule::UniquePathMethods, unique_path_methods)];

pub static ENDPOINT_VALIDATORS: &[Validator<EndpointDefinition, Dealiaser>] = &[
    Validator::new(Rule::NoUnknownHttpMethod, no_unknown_http_method),
    Validator::new(Rule::HttpPathFormat, http_path_format),
    Validator::new(Rule::SingleBodyParam, single_body_param),
    Validator::new(Rule::PathParamsMatch, path_params_match),
    Validator::new(Rule::NoBinaryOrAnyNonBody, no_binary_or_any_non_body),
    Validator::new(Rule::NoBearerTokenPathOrQuery, no_bearer_token_path_or_query),
    Validator::new(Rule::PathParamTypes, path_param_types),
    Validator::new(Rule::HeaderParamTypes, header_param_types),
    Validator::new(Rule::QueryParamTypes, query_param_types),
    Validator::new(Rule::NoGetBody, no_get_body),
    Validator::new(Rule::NoOptionalBinaryBody, no_optional_binary_body),
    Validator::new(Rule::ParameterNameFormat, parameter_name_format),
    Validator::new(Rule::HeaderParamIdFormat, header_param_id_format),
    Validator::new(Rule::QueryParamIdFormat, query_param_id_format),
];

/// Run [`ENDPOINT_VALIDATORS`], naming violations `<service>.<endpoint>`.
pub fn validate_endpoint(
    service: &TypeName,
    endpoint: &EndpointDefinition,
    dealiaser: &Dealiaser,
) -> Result<(), ConjureError> {
    validate_all(ENDPOINT_VALIDATORS, endpoint, dealiaser).map_err(|err| match err {
        ConjureError::Validation {
            rule,
            subject,
            message,
        } => ConjureError::Validation {
            rule,
            subject: format!("{}.{}", service, subject),
            message,
        },
        other => other,
    })
}

fn unique_path_methods(service: &ServiceDefinition, _: &()) -> Result<(), Violation> {
    let mut seen: BTreeMap<(String, String), &str> = BTreeMap::new();
    for endpoint in &service.endpoints {
        let path = PATH_VARIABLE
            .replace_all(endpoint.http_path.as_str(), "{arg}")
            .into_owned();
        let key = (endpoint.http_method.as_str().to_string(), path);
        if let Some(previous) = seen.insert(key.clone(), endpoint.endpoint_name.as_str()) {
            return Err(Violation::new(
                &service.service_name,
                format!(
                    "endpoints '{}' and '{}' both map to {} {}",
                    previous, endpoint.endpoint_name, key.0, key.1
                ),
            ));
        }
    }
    Ok(())
}

fn no_unknown_http_method(
    endpoint: &EndpointDefinition,
    _: &Dealiaser,
) -> Result<(), Violation> {
    if endpoint.http_method.is_unknown() {
        Err(Violation::new(
            &endpoint.endpoint_name,
            format!(
                "unsupported HTTP method '{}', expected one of {}",
                endpoint.http_method,
                HttpMethod::VALUES
                    .iter()
                    .map(|m| m.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ))
    } else {
        Ok(())
    }
}

fn http_path_format(endpoint: &EndpointDefinition, _: &Dealiaser) -> Result<(), Violation> {
    let path = endpoint.http_path.as_str();
    let broken = |message: String| Err(Violation::new(&endpoint.endpoint_name, message));

    if !path.starts_with('/') {
        return broken(format!("path '{}' must begin with '/'", path));
    }
    if path == "/" {
        return Ok(());
    }
    if path.ends_with('/') {
        return broken(format!("path '{}' must not end with '/'", path));
    }

    let segments: Vec<&str> = path[1..].split('/').collect();
    let mut variables = BTreeSet::new();
    for (index, segment) in segments.iter().enumerate() {
        if PATH_SEGMENT.is_match(segment) {
            continue;
        }
        let greedy = PATH_PARAM_REGEX_SEGMENT.is_match(segment);
        if !greedy && !PATH_PARAM_SEGMENT.is_match(segment) {
            return broken(format!("segment '{}' of path '{}' is not valid", segment, path));
        }
        if segment.ends_with(":.*}") && index + 1 != segments.len() {
            return broken(format!(
                "segment '{}' may only appear at the end of path '{}'",
                segment, path
            ));
        }
        if let Some(name) = PATH_VARIABLE
            .captures(segment)
            .and_then(|captures| captures.get(1))
        {
            if !variables.insert(name.as_str()) {
                return broken(format!(
                    "variable '{}' appears more than once in path '{}'",
                    name.as_str(),
                    path
                ));
            }
        }
    }
    Ok(())
}

fn single_body_param(endpoint: &EndpointDefinition, _: &Dealiaser) -> Result<(), Violation> {
    let bodies: Vec<&str> = args_of(endpoint, is_body).map(|arg| arg.arg_name.as_str()).collect();
    if bodies.len() > 1 {
        Err(Violation::new(
            &endpoint.endpoint_name,
            format!("only one body argument allowed, found [{}]", bodies.join(", ")),
        ))
    } else {
        Ok(())
    }
}

fn path_params_match(endpoint: &EndpointDefinition, _: &Dealiaser) -> Result<(), Violation> {
    let declared: BTreeSet<String> = args_of(endpoint, is_path)
        .map(|arg| arg.arg_name.as_str().to_string())
        .collect();
    let templated = path_variables(endpoint.http_path.as_str());
    if declared == templated {
        return Ok(());
    }

    let missing: Vec<&str> = templated.difference(&declared).map(String::as_str).collect();
    let extra: Vec<&str> = declared.difference(&templated).map(String::as_str).collect();
    Err(Violation::new(
        &endpoint.endpoint_name,
        format!(
            "path arguments do not match path '{}': undeclared [{}], not in path [{}]",
            endpoint.http_path,
            missing.join(", "),
            extra.join(", ")
        ),
    ))
}

fn no_binary_or_any_non_body(
    endpoint: &EndpointDefinition,
    dealiaser: &Dealiaser,
) -> Result<(), Violation> {
    for arg in args_of(endpoint, |p| !is_body(p)) {
        let ty = unwrap_optional(dealiaser, &arg.arg_type)?;
        if is_primitive(&ty, PrimitiveType::Binary) || is_primitive(&ty, PrimitiveType::Any) {
            return Err(Violation::new(
                &endpoint.endpoint_name,
                format!(
                    "argument '{}' of type {} may only be sent as the body",
                    arg.arg_name, arg.arg_type
                ),
            ));
        }
    }
    Ok(())
}

fn no_bearer_token_path_or_query(
    endpoint: &EndpointDefinition,
    dealiaser: &Dealiaser,
) -> Result<(), Violation> {
    for arg in args_of(endpoint, |p| is_path(p) || is_query(p)) {
        let ty = unwrap_collection(dealiaser, &arg.arg_type)?;
        if is_primitive(&ty, PrimitiveType::Bearertoken) {
            return Err(Violation::new(
                &endpoint.endpoint_name,
                format!(
                    "argument '{}' would leak a bearer token in the URL",
                    arg.arg_name
                ),
            ));
        }
    }
    Ok(())
}

fn path_param_types(endpoint: &EndpointDefinition, dealiaser: &Dealiaser) -> Result<(), Violation> {
    for arg in args_of(endpoint, is_path) {
        if !is_primitive_or_enum(dealiaser, &arg.arg_type)? {
            return Err(illegal_param_type(endpoint, arg, "path", "a primitive or enum"));
        }
    }
    Ok(())
}

fn header_param_types(
    endpoint: &EndpointDefinition,
    dealiaser: &Dealiaser,
) -> Result<(), Violation> {
    for arg in args_of(endpoint, is_header) {
        let ty = unwrap_optional(dealiaser, &arg.arg_type)?;
        if !is_primitive_or_enum(dealiaser, &ty)? {
            return Err(illegal_param_type(
                endpoint,
                arg,
                "header",
                "a primitive, an enum or an optional of either",
            ));
        }
    }
    Ok(())
}

fn query_param_types(
    endpoint: &EndpointDefinition,
    dealiaser: &Dealiaser,
) -> Result<(), Violation> {
    for arg in args_of(endpoint, is_query) {
        let ty = unwrap_collection(dealiaser, &arg.arg_type)?;
        if is_primitive(&ty, PrimitiveType::Any) || !is_primitive_or_enum(dealiaser, &ty)? {
            return Err(illegal_param_type(
                endpoint,
                arg,
                "query",
                "a primitive other than any, an enum, or an optional, list or set of those",
            ));
        }
    }
    Ok(())
}

fn no_get_body(endpoint: &EndpointDefinition, _: &Dealiaser) -> Result<(), Violation> {
    if endpoint.http_method != HttpMethod::Get {
        return Ok(());
    }
    match args_of(endpoint, is_body).next() {
        Some(arg) => Err(Violation::new(
            &endpoint.endpoint_name,
            format!("GET endpoints cannot take body argument '{}'", arg.arg_name),
        )),
        None => Ok(()),
    }
}

fn no_optional_binary_body(
    endpoint: &EndpointDefinition,
    dealiaser: &Dealiaser,
) -> Result<(), Violation> {
    for arg in args_of(endpoint, is_body) {
        if let Dealiased::Type(Type::Optional(optional)) = dealiaser.resolve(&arg.arg_type)? {
            let item = dealias_type(dealiaser, optional.item_type())?;
            if is_primitive(&item, PrimitiveType::Binary) {
                return Err(Violation::new(
                    &endpoint.endpoint_name,
                    format!("body argument '{}' cannot be an optional binary", arg.arg_name),
                ));
            }
        }
    }
    Ok(())
}

fn parameter_name_format(
    endpoint: &EndpointDefinition,
    _: &Dealiaser,
) -> Result<(), Violation> {
    match endpoint
        .args
        .iter()
        .find(|arg| !LOWER_CAMEL_CASE.is_match(arg.arg_name.as_str()))
    {
        Some(arg) => Err(Violation::new(
            &endpoint.endpoint_name,
            format!("argument name '{}' must be lowerCamelCase", arg.arg_name),
        )),
        None => Ok(()),
    }
}

fn header_param_id_format(
    endpoint: &EndpointDefinition,
    _: &Dealiaser,
) -> Result<(), Violation> {
    for arg in &endpoint.args {
        let ParameterType::Header(header) = &arg.param_type else {
            continue;
        };
        let id = header.param_id.as_str();
        if !HEADER_PARAM_ID.is_match(id) {
            return Err(Violation::new(
                &endpoint.endpoint_name,
                format!(
                    "header param-id '{}' must match pattern {}",
                    id,
                    HEADER_PARAM_ID.as_str()
                ),
            ));
        }
        if PROTOCOL_HEADERS.iter().any(|h| h.eq_ignore_ascii_case(id)) {
            return Err(Violation::new(
                &endpoint.endpoint_name,
                format!("header '{}' is reserved", id),
            ));
        }
    }
    Ok(())
}

fn query_param_id_format(
    endpoint: &EndpointDefinition,
    _: &Dealiaser,
) -> Result<(), Violation> {
    for arg in &endpoint.args {
        let ParameterType::Query(query) = &arg.param_type else {
            continue;
        };
        let id = query.param_id.as_str();
        match Case::of(id) {
            Some(Case::LowerCamel) => {}
            Some(case) => {
                warn!(
                    endpoint = %endpoint.endpoint_name,
                    param_id = id,
                    ?case,
                    "Query param-ids should be lowerCamelCase"
                );
            }
            None => {
                return Err(Violation::new(
                    &endpoint.endpoint_name,
                    format!(
                        "query param-id '{}' must be lowerCamelCase, kebab-case or snake_case",
                        id
                    ),
                ))
            }
        }
    }
    Ok(())
}

fn args_of(
    endpoint: &EndpointDefinition,
    predicate: impl Fn(&ParameterType) -> bool,
) -> impl Iterator<Item = &ArgumentDefinition> {
    endpoint.args.iter().filter(move |arg| predicate(&arg.param_type))
}

fn is_body(param: &ParameterType) -> bool {
    matches!(param, ParameterType::Body(_))
}

fn is_path(param: &ParameterType) -> bool {
    matches!(param, ParameterType::Path(_))
}

fn is_header(param: &ParameterType) -> bool {
    matches!(param, ParameterType::Header(_))
}

fn is_query(param: &ParameterType) -> bool {
    matches!(param, ParameterType::Query(_))
}

fn is_primitive(ty: &Type, primitive: PrimitiveType) -> bool {
    matches!(ty, Type::Primitive(p) if *p == primitive)
}

/// Dealias `ty`, keeping references to enums, objects and unions as they are.
fn dealias_type(dealiaser: &Dealiaser, ty: &Type) -> Result<Type, ConjureError> {
    Ok(match dealiaser.resolve(ty)? {
        Dealiased::Type(ty) => ty,
        Dealiased::Definition(_) => ty.clone(),
    })
}

/// Dealias `ty` and look through one level of optional.
fn unwrap_optional(dealiaser: &Dealiaser, ty: &Type) -> Result<Type, ConjureError> {
    match dealias_type(dealiaser, ty)? {
        Type::Optional(optional) => dealias_type(dealiaser, optional.item_type()),
        other => Ok(other),
    }
}

/// Dealias `ty` and look through one level of optional, list or set.
fn unwrap_collection(dealiaser: &Dealiaser, ty: &Type) -> Result<Type, ConjureError> {
    match dealias_type(dealiaser, ty)? {
        Type::Optional(optional) => dealias_type(dealiaser, optional.item_type()),
        Type::List(list) => dealias_type(dealiaser, &list.item_type),
        Type::Set(set) => dealias_type(dealiaser, &set.item_type),
        other => Ok(other),
    }
}

/// Primitives, external types with a primitive fallback, and enums.
fn is_primitive_or_enum(dealiaser: &Dealiaser, ty: &Type) -> Result<bool, ConjureError> {
    Ok(match dealiaser.resolve(ty)? {
        Dealiased::Type(Type::Primitive(_)) | Dealiased::Type(Type::External(_)) => true,
        Dealiased::Definition(TypeDefinition::Enum(_)) => true,
        _ => false,
    })
}

fn illegal_param_type(
    endpoint: &EndpointDefinition,
    arg: &ArgumentDefinition,
    kind: &str,
    expected: &str,
) -> Violation {
    Violation::new(
        &endpoint.endpoint_name,
        format!(
            "{} argument '{}' has type {}, expected {}",
            kind, arg.arg_name, arg.arg_type, expected
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use conjure_ir::{AliasDefinition, EnumDefinition, EnumValueDefinition, ObjectDefinition};

    fn name(n: &str) -> TypeName {
        TypeName::new(n, "com.example")
    }

    fn dealiaser() -> Dealiaser {
        Dealiaser::new(vec![
            TypeDefinition::Alias(AliasDefinition {
                type_name: name("Token"),
                alias: Type::primitive(PrimitiveType::Bearertoken),
                docs: None,
            }),
            TypeDefinition::Alias(AliasDefinition {
                type_name: name("MaybeBytes"),
                alias: Type::optional(Type::primitive(PrimitiveType::Binary)).unwrap(),
                docs: None,
            }),
            TypeDefinition::Enum(EnumDefinition {
                type_name: name("Color"),
                values: vec![EnumValueDefinition {
                    value: "RED".to_string(),
                    docs: None,
                }],
                docs: None,
            }),
            TypeDefinition::Object(ObjectDefinition {
                type_name: name("Widget"),
                fields: vec![],
                docs: None,
            }),
        ])
    }

    fn arg(arg_name: &str, arg_type: Type, param_type: ParameterType) -> ArgumentDefinition {
        ArgumentDefinition {
            arg_name: arg_name.into(),
            arg_type,
            param_type,
            docs: None,
            markers: vec![],
        }
    }

    fn endpoint(
        method: HttpMethod,
        path: &str,
        args: Vec<ArgumentDefinition>,
    ) -> EndpointDefinition {
        EndpointDefinition {
            endpoint_name: "getWidget".into(),
            http_method: method,
            http_path: path.into(),
            auth: None,
            args,
            returns: None,
            docs: None,
            deprecated: None,
            markers: vec![],
        }
    }

    fn check(endpoint: &EndpointDefinition) -> Option<Rule> {
        validate_endpoint(&name("WidgetService"), endpoint, &dealiaser())
            .err()
            .and_then(|e| e.rule())
    }

    fn string() -> Type {
        Type::primitive(PrimitiveType::String)
    }

    #[test]
    fn test_valid_endpoint() {
        let endpoint = endpoint(
            HttpMethod::Get,
            "/widgets/{id}/{rest:.*}",
            vec![
                arg("id", Type::reference(name("Color")), ParameterType::path()),
                arg("rest", string(), ParameterType::path()),
                arg("auth", Type::reference(name("Token")), ParameterType::header("Authorization")),
                arg(
                    "limit",
                    Type::optional(Type::primitive(PrimitiveType::Integer)).unwrap(),
                    ParameterType::query("limit"),
                ),
                arg(
                    "tags",
                    Type::set(Type::reference(name("Color"))),
                    ParameterType::query("tag-names"),
                ),
            ],
        );
        assert_eq!(check(&endpoint), None);
    }

    #[test]
    fn test_http_path_format() {
        for path in [
            "widgets",
            "/widgets/",
            "/widgets//parts",
            "/{rest:.*}/parts",
            "/{id}/{id}",
            "/1widgets",
        ] {
            let endpoint = endpoint(HttpMethod::Get, path, vec![]);
            assert_eq!(check(&endpoint), Some(Rule::HttpPathFormat), "path {:?}", path);
        }
        assert_eq!(check(&endpoint(HttpMethod::Get, "/", vec![])), None);
    }

    #[test]
    fn test_unknown_http_method() {
        let endpoint = endpoint(HttpMethod::from("PATCH"), "/widgets", vec![]);
        assert_eq!(check(&endpoint), Some(Rule::NoUnknownHttpMethod));
    }

    #[test]
    fn test_body_rules() {
        let two_bodies = endpoint(
            HttpMethod::Post,
            "/widgets",
            vec![
                arg("a", string(), ParameterType::body()),
                arg("b", string(), ParameterType::body()),
            ],
        );
        assert_eq!(check(&two_bodies), Some(Rule::SingleBodyParam));

        let get_body = endpoint(
            HttpMethod::Get,
            "/widgets",
            vec![arg("a", string(), ParameterType::body())],
        );
        assert_eq!(check(&get_body), Some(Rule::NoGetBody));

        let optional_binary = endpoint(
            HttpMethod::Post,
            "/widgets",
            vec![arg("data", Type::reference(name("MaybeBytes")), ParameterType::body())],
        );
        assert_eq!(check(&optional_binary), Some(Rule::NoOptionalBinaryBody));
    }

    #[test]
    fn test_path_params_match_template() {
        let missing = endpoint(HttpMethod::Get, "/widgets/{id}", vec![]);
        assert_eq!(check(&missing), Some(Rule::PathParamsMatch));

        let extra = endpoint(
            HttpMethod::Get,
            "/widgets",
            vec![arg("id", string(), ParameterType::path())],
        );
        assert_eq!(check(&extra), Some(Rule::PathParamsMatch));
    }

    #[test]
    fn test_param_types() {
        let binary_query = endpoint(
            HttpMethod::Get,
            "/widgets",
            vec![arg("data", Type::primitive(PrimitiveType::Binary), ParameterType::query("data"))],
        );
        assert_eq!(check(&binary_query), Some(Rule::NoBinaryOrAnyNonBody));

        let token_in_path = endpoint(
            HttpMethod::Get,
            "/widgets/{token}",
            vec![arg("token", Type::reference(name("Token")), ParameterType::path())],
        );
        assert_eq!(check(&token_in_path), Some(Rule::NoBearerTokenPathOrQuery));

        let object_in_path = endpoint(
            HttpMethod::Get,
            "/widgets/{widget}",
            vec![arg("widget", Type::reference(name("Widget")), ParameterType::path())],
        );
        assert_eq!(check(&object_in_path), Some(Rule::PathParamTypes));

        let list_header = endpoint(
            HttpMethod::Get,
            "/widgets",
            vec![arg("ids", Type::list(string()), ParameterType::header("X-Ids"))],
        );
        assert_eq!(check(&list_header), Some(Rule::HeaderParamTypes));

        let nested_query = endpoint(
            HttpMethod::Get,
            "/widgets",
            vec![arg("ids", Type::list(Type::list(string())), ParameterType::query("ids"))],
        );
        assert_eq!(check(&nested_query), Some(Rule::QueryParamTypes));
    }

    #[test]
    fn test_param_name_and_id_formats() {
        let single = |method, arg| endpoint(method, "/widgets", vec![arg]);

        let bad_name = single(
            HttpMethod::Post,
            arg("widget_id", string(), ParameterType::body()),
        );
        assert_eq!(check(&bad_name), Some(Rule::ParameterNameFormat));

        let bad_header = single(
            HttpMethod::Get,
            arg("trace", string(), ParameterType::header("x-trace")),
        );
        assert_eq!(check(&bad_header), Some(Rule::HeaderParamIdFormat));

        let reserved = single(
            HttpMethod::Get,
            arg("kind", string(), ParameterType::header("Content-Type")),
        );
        assert_eq!(check(&reserved), Some(Rule::HeaderParamIdFormat));

        let bad_query = single(
            HttpMethod::Get,
            arg("page", string(), ParameterType::query("Page")),
        );
        assert_eq!(check(&bad_query), Some(Rule::QueryParamIdFormat));
    }

    #[test]
    fn test_unique_path_methods() {
        let mut first = endpoint(HttpMethod::Get, "/widgets/{id}", vec![]);
        first.endpoint_name = "getWidget".into();
        let mut second = endpoint(HttpMethod::Get, "/widgets/{widgetId}", vec![]);
        second.endpoint_name = "fetchWidget".into();
        let mut service = ServiceDefinition {
            service_name: name("WidgetService"),
            endpoints: vec![first, second],
            docs: None,
        };
        let err = validate_all(SERVICE_VALIDATORS, &service, &()).unwrap_err();
        assert_eq!(err.rule(), Some(Rule::UniquePathMethods));

        service.endpoints[1].http_method = HttpMethod::Delete;
        assert!(validate_all(SERVICE_VALIDATORS, &service, &()).is_ok());
    }
}
