//! Definition assembly.
//!
//! Assembly runs in two passes over a [`SourceSet`]:
//!
//! 1. Every loaded file's objects, enums, unions and aliases are translated
//!    and validated, so imported files are available for dealiasing.
//! 2. Each compile target, in insertion order, gets a dealiasing table of its
//!    own types plus everything reachable through its imports. Declared
//!    defaults are checked against it, then errors and services are
//!    translated and validated.
//!
//! Files reached only through imports follow the targets, breadth first.
//! Their types and errors are copied into the output once each; their
//! services are not. The definition-level validators then run once over the
//! merged result, so a name declared by both a target and an imported file is
//! reported there.

use conjure_ir::{
    AliasDefinition, ArgumentDefinition, AuthType, ConjureDefinition, Documentation,
    EndpointDefinition, EnumDefinition, EnumValueDefinition, ErrorCode, ErrorDefinition,
    ErrorNamespace, FieldDefinition, HttpMethod, HttpPath, ObjectDefinition, ServiceDefinition,
    Type, TypeDefinition, TypeName, UnionDefinition, SUPPORTED_IR_VERSION,
};
use indexmap::IndexMap;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::dealias::Dealiaser;
use crate::defaults::{DefaultValue, DefaultValueParser};
use crate::error::ConjureError;
use crate::params::{classify, path_variables, ParamKind};
use crate::resolver::ReferenceResolver;
use crate::source::raw::{
    RawDefinitions, RawErrorDefinition, RawField, RawService, RawTypeDefinition,
};
use crate::source::{SourceFile, SourceSet};
use crate::validators::{
    self, validate_all, validate_endpoint, ERROR_VALIDATORS, SERVICE_VALIDATORS,
};

/// A default value declared on a field or argument.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredDefault {
    /// `package.Type.field`, `package.Error.arg` or `package.Service.endpoint.arg`
    pub subject: String,
    pub value: DefaultValue,
}

/// Output of a successful compile.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub definition: ConjureDefinition,
    /// Typed defaults of every emitted definition, in emission order.
    pub defaults: Vec<DeclaredDefault>,
}

/// Compile every target of `sources` into one definition.
pub fn compile(sources: &SourceSet) -> Result<ConjureDefinition, ConjureError> {
    Assembler::new(sources).run().map(|compilation| compilation.definition)
}

/// Compile `files`, treating each one as a target.
pub fn assemble(files: &[SourceFile]) -> Result<ConjureDefinition, ConjureError> {
    compile(&SourceSet::from_targets(files.iter().cloned()))
}

struct PendingDefault {
    subject: String,
    ty: Type,
    literal: String,
}

#[derive(Default)]
struct FileTypes {
    types: Vec<TypeDefinition>,
    defaults: Vec<PendingDefault>,
}

/// Assembles a [`SourceSet`] into a [`Compilation`].
pub struct Assembler<'a> {
    sources: &'a SourceSet,
}

impl<'a> Assembler<'a> {
    pub fn new(sources: &'a SourceSet) -> Self {
        Self { sources }
    }

    pub fn run(&self) -> Result<Compilation, ConjureError> {
        let mut translated: BTreeMap<PathBuf, FileTypes> = BTreeMap::new();
        for file in self.sources.files() {
            let resolver = ReferenceResolver::for_file(file, self.sources)?;
            translated.insert(file.path.clone(), translate_types(file, &resolver)?);
        }

        let mut output = Output {
            definition: ConjureDefinition::new(),
            defaults: Vec::new(),
        };
        output.definition.version = SUPPORTED_IR_VERSION;

        for file in self.sources.targets() {
            debug!(path = %file.path.display(), "Assembling file");
            self.emit(file, &translated, true, &mut output)?;
        }
        for file in self.imported_files() {
            debug!(path = %file.path.display(), "Copying imported definitions");
            self.emit(file, &translated, false, &mut output)?;
        }

        let Output {
            definition,
            defaults,
        } = output;
        let everything = Dealiaser::new(translated.into_values().flat_map(|file| file.types));
        validators::validate_definition(&definition, &everything)?;
        debug!(
            types = definition.types.len(),
            errors = definition.errors.len(),
            services = definition.services.len(),
            "Assembled definition"
        );

        Ok(Compilation {
            definition,
            defaults,
        })
    }

    /// Add the types and errors of `file`, and its services when `services`
    /// is set, checking every declared default on the way.
    fn emit(
        &self,
        file: &SourceFile,
        translated: &BTreeMap<PathBuf, FileTypes>,
        services: bool,
        output: &mut Output,
    ) -> Result<(), ConjureError> {
        let resolver = ReferenceResolver::for_file(file, self.sources)?;
        let dealiaser = self.visible_types(file, translated);
        let parser = DefaultValueParser::new(&dealiaser);

        if let Some(own) = translated.get(&file.path) {
            for pending in &own.defaults {
                output.defaults.push(DeclaredDefault {
                    subject: pending.subject.clone(),
                    value: parser.parse(&pending.ty, &pending.literal)?,
                });
            }
            output.definition.types.extend(own.types.iter().cloned());
        }

        let raw = &file.definition;
        for (name, error) in &raw.types.definitions.errors {
            let (error, error_defaults) =
                translate_error(name, error, &raw.types.definitions, &resolver)?;
            output.check_defaults(&parser, error_defaults)?;
            output.definition.errors.push(error);
        }

        if !services {
            return Ok(());
        }
        for (name, service) in &raw.services {
            let (service, service_defaults) = translate_service(
                name,
                service,
                &raw.types.definitions,
                &resolver,
                &dealiaser,
            )?;
            output.check_defaults(&parser, service_defaults)?;
            output.definition.services.push(service);
        }
        Ok(())
    }

    /// Files reachable through the imports of the targets that are not
    /// targets themselves, breadth first in target order.
    fn imported_files(&self) -> Vec<&'a SourceFile> {
        let mut seen: BTreeSet<PathBuf> =
            self.sources.targets().map(|file| file.path.clone()).collect();
        let mut queue: VecDeque<PathBuf> = self
            .sources
            .targets()
            .flat_map(|file| file.imports().map(|(_, import)| import))
            .collect();
        let mut files = Vec::new();
        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }
            if let Some(file) = self.sources.get(&path) {
                queue.extend(file.imports().map(|(_, import)| import));
                files.push(file);
            }
        }
        files
    }

    /// Types of `file` and of every file reachable through its imports.
    fn visible_types(
        &self,
        file: &SourceFile,
        translated: &BTreeMap<PathBuf, FileTypes>,
    ) -> Dealiaser {
        let mut dealiaser = Dealiaser::default();
        let mut visited = BTreeSet::new();
        let mut pending = vec![file.path.clone()];
        while let Some(path) = pending.pop() {
            if !visited.insert(path.clone()) {
                continue;
            }
            if let (Some(source), Some(types)) = (self.sources.get(&path), translated.get(&path)) {
                dealiaser.extend(types.types.iter().cloned());
                pending.extend(source.imports().map(|(_, import)| import));
            }
        }
        dealiaser
    }
}

struct Output {
    definition: ConjureDefinition,
    defaults: Vec<DeclaredDefault>,
}

impl Output {
    fn check_defaults(
        &mut self,
        parser: &DefaultValueParser<'_>,
        pending: Vec<PendingDefault>,
    ) -> Result<(), ConjureError> {
        for pending in pending {
            self.defaults.push(DeclaredDefault {
                value: parser.parse(&pending.ty, &pending.literal)?,
                subject: pending.subject,
            });
        }
        Ok(())
    }
}

fn translate_types(
    file: &SourceFile,
    resolver: &ReferenceResolver<'_>,
) -> Result<FileTypes, ConjureError> {
    let mut out = FileTypes::default();
    for (name, raw) in &file.definition.types.definitions.objects {
        let type_name = resolver.scope().type_name(name)?.ok_or_else(|| {
            ConjureError::Parse(format!(
                "type '{}' is not defined in {}",
                name,
                file.path.display()
            ))
        })?;
        let docs = |text: &Option<String>| text.as_deref().map(Documentation::new);

        let definition = match raw {
            RawTypeDefinition::Object(object) => TypeDefinition::Object(ObjectDefinition {
                fields: translate_fields(&type_name, &object.fields, resolver, &mut out.defaults)?,
                docs: docs(&object.docs),
                type_name: type_name.clone(),
            }),
            RawTypeDefinition::Enum(enumeration) => TypeDefinition::Enum(EnumDefinition {
                values: enumeration
                    .values
                    .iter()
                    .map(|value| EnumValueDefinition {
                        value: value.value().to_string(),
                        docs: value.docs().map(Documentation::new),
                    })
                    .collect(),
                docs: docs(&enumeration.docs),
                type_name: type_name.clone(),
            }),
            RawTypeDefinition::Union(union) => TypeDefinition::Union(UnionDefinition {
                union: translate_fields(&type_name, &union.union, resolver, &mut out.defaults)?,
                docs: docs(&union.docs),
                type_name: type_name.clone(),
            }),
            RawTypeDefinition::Alias(alias) => TypeDefinition::Alias(AliasDefinition {
                alias: resolve(resolver, &alias.alias, &type_name)?,
                docs: docs(&alias.docs),
                type_name: type_name.clone(),
            }),
        };

        validators::validate_type_definition(&definition)?;
        debug!(type_name = %type_name, "Translated type");
        out.types.push(definition);
    }
    Ok(out)
}

fn translate_fields(
    owner: &TypeName,
    fields: &IndexMap<String, RawField>,
    resolver: &ReferenceResolver<'_>,
    defaults: &mut Vec<PendingDefault>,
) -> Result<Vec<FieldDefinition>, ConjureError> {
    let mut out = Vec::with_capacity(fields.len());
    for (name, raw) in fields {
        let subject = format!("{}.{}", owner, name);
        let field_type = resolve(resolver, raw.type_expr(), &subject)?;
        if let Some(value) = raw.default() {
            defaults.push(PendingDefault {
                literal: literal(value, &subject)?,
                ty: field_type.clone(),
                subject,
            });
        }
        out.push(FieldDefinition {
            field_name: name.as_str().into(),
            field_type,
            docs: raw.docs().map(Documentation::new),
        });
    }
    Ok(out)
}

fn translate_error(
    name: &str,
    raw: &RawErrorDefinition,
    definitions: &RawDefinitions,
    resolver: &ReferenceResolver<'_>,
) -> Result<(ErrorDefinition, Vec<PendingDefault>), ConjureError> {
    let package = definitions.package_of(raw.package.as_deref()).ok_or_else(|| {
        ConjureError::Parse(format!(
            "error '{}' declares no package and the file has no default-package",
            name
        ))
    })?;
    let error_name = TypeName::new(name, package);

    let code = ErrorCode::from(raw.code.to_ascii_uppercase().as_str());
    if code.is_unknown() {
        return Err(ConjureError::Parse(format!(
            "error '{}' has unknown code '{}'",
            error_name, raw.code
        )));
    }

    let mut defaults = Vec::new();
    let error = ErrorDefinition {
        safe_args: translate_fields(&error_name, &raw.safe_args, resolver, &mut defaults)?,
        unsafe_args: translate_fields(&error_name, &raw.unsafe_args, resolver, &mut defaults)?,
        docs: raw.docs.as_deref().map(Documentation::new),
        namespace: ErrorNamespace::new(raw.namespace.as_str()),
        code,
        error_name,
    };

    validate_all(ERROR_VALIDATORS, &error, &())?;
    debug!(error_name = %error.error_name, "Translated error");
    Ok((error, defaults))
}

fn translate_service(
    name: &str,
    raw: &RawService,
    definitions: &RawDefinitions,
    resolver: &ReferenceResolver<'_>,
    dealiaser: &Dealiaser,
) -> Result<(ServiceDefinition, Vec<PendingDefault>), ConjureError> {
    let package = raw
        .package
        .as_deref()
        .or(definitions.default_package.as_deref())
        .ok_or_else(|| {
            ConjureError::Parse(format!(
                "service '{}' declares no package and the file has no default-package",
                name
            ))
        })?;
    let service_name = TypeName::new(name, package);
    let default_auth = parse_auth(raw.default_auth.as_deref())?;

    let mut defaults = Vec::new();
    let mut endpoints = Vec::with_capacity(raw.endpoints.len());
    for (endpoint_name, raw_endpoint) in &raw.endpoints {
        let subject = format!("{}.{}", service_name, endpoint_name);
        let (http_method, path) = parse_http(&raw_endpoint.http, &subject)?;
        let http_path = join_path(raw.base_path.as_deref(), path);
        let variables = path_variables(&http_path);

        let mut args = Vec::with_capacity(raw_endpoint.args.len());
        for (arg_name, raw_arg) in &raw_endpoint.args {
            let arg = raw_arg.to_definition();
            let arg_subject = format!("{}.{}", subject, arg_name);
            let arg_type = resolve(resolver, &arg.arg_type, &arg_subject)?;
            let kind = match arg.param_type.as_deref() {
                Some(kind) => kind.parse::<ParamKind>()?,
                None => ParamKind::default(),
            };
            if let Some(value) = &arg.default {
                defaults.push(PendingDefault {
                    literal: literal(value, &arg_subject)?,
                    ty: arg_type.clone(),
                    subject: arg_subject.clone(),
                });
            }
            args.push(ArgumentDefinition {
                arg_name: arg_name.as_str().into(),
                param_type: classify(arg_name, kind, arg.param_id.as_deref(), &variables),
                markers: resolve_all(resolver, &arg.markers, &arg_subject)?,
                docs: arg.docs.as_deref().map(Documentation::new),
                arg_type,
            });
        }

        let auth = match raw_endpoint.auth.as_deref() {
            Some(auth) => parse_auth(Some(auth))?,
            None => default_auth.clone(),
        };
        let endpoint = EndpointDefinition {
            endpoint_name: endpoint_name.as_str().into(),
            http_method,
            http_path: HttpPath::new(http_path),
            auth,
            args,
            returns: raw_endpoint
                .returns
                .as_deref()
                .map(|returns| resolve(resolver, returns, &subject))
                .transpose()?,
            docs: raw_endpoint.docs.as_deref().map(Documentation::new),
            deprecated: raw_endpoint.deprecated.as_deref().map(Documentation::new),
            markers: resolve_all(resolver, &raw_endpoint.markers, &subject)?,
        };

        validate_endpoint(&service_name, &endpoint, dealiaser)?;
        endpoints.push(endpoint);
    }

    let service = ServiceDefinition {
        docs: raw.docs.as_deref().map(Documentation::new),
        service_name,
        endpoints,
    };
    validate_all(SERVICE_VALIDATORS, &service, &())?;
    debug!(
        service_name = %service.service_name,
        endpoints = service.endpoints.len(),
        "Translated service"
    );
    Ok((service, defaults))
}

/// Resolve a type expression, naming `subject` in parse errors.
fn resolve(
    resolver: &ReferenceResolver<'_>,
    expr: &str,
    subject: &impl fmt::Display,
) -> Result<Type, ConjureError> {
    resolver.resolve_str(expr).map_err(|err| match err {
        ConjureError::Parse(message) => {
            ConjureError::Parse(format!("{} (in {})", message, subject))
        }
        other => other,
    })
}

fn resolve_all(
    resolver: &ReferenceResolver<'_>,
    exprs: &[String],
    subject: &impl fmt::Display,
) -> Result<Vec<Type>, ConjureError> {
    exprs.iter().map(|expr| resolve(resolver, expr, subject)).collect()
}

/// Split `GET /path` into method and path.
fn parse_http<'s>(http: &'s str, subject: &str) -> Result<(HttpMethod, &'s str), ConjureError> {
    match http.trim().split_once(char::is_whitespace) {
        Some((method, path)) if !path.trim().is_empty() => {
            let method = HttpMethod::from(method.to_ascii_uppercase().as_str());
            Ok((method, path.trim()))
        }
        _ => Err(ConjureError::Parse(format!(
            "http of {} must be '<METHOD> <path>', found '{}'",
            subject, http
        ))),
    }
}

fn join_path(base: Option<&str>, path: &str) -> String {
    let base = base.unwrap_or("").trim_end_matches('/');
    match (base.is_empty(), path) {
        (true, _) => path.to_string(),
        (false, "/") => base.to_string(),
        (false, _) => format!("{}{}", base, path),
    }
}

/// `none`, `header` or `cookie:<name>`; absent means no auth.
fn parse_auth(auth: Option<&str>) -> Result<Option<AuthType>, ConjureError> {
    let Some(auth) = auth.map(str::trim) else {
        return Ok(None);
    };
    if auth.eq_ignore_ascii_case("none") {
        Ok(None)
    } else if auth.eq_ignore_ascii_case("header") {
        Ok(Some(AuthType::header()))
    } else {
        match auth.split_once(':') {
            Some((kind, cookie)) if kind.eq_ignore_ascii_case("cookie") && !cookie.is_empty() => {
                Ok(Some(AuthType::cookie(cookie)))
            }
            _ => Err(ConjureError::Parse(format!(
                "unknown auth '{}', expected none, header or cookie:<name>",
                auth
            ))),
        }
    }
}

/// Text of a scalar default literal.
fn literal(value: &serde_yaml::Value, subject: &str) -> Result<String, ConjureError> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ConjureError::Parse(format!(
            "default of {} must be a scalar",
            subject
        ))),
    }
}
