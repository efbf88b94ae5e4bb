use super::registry::DefinitionRegistry;
use super::security::SecurityTable;
use super::types::{Document, Operation, Parameter, Response};
use super::walker::SchemaGenerator;
use crate::classify;
use crate::config::ContractConfig;
use crate::router::{FileUpload, RouteDescriptor};
use http::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Build the API document for `routes`.
///
/// Every call walks the types again with a fresh [`DefinitionRegistry`].
pub fn emit_document<'a, I>(config: &ContractConfig, generator: &SchemaGenerator, routes: I) -> Document
where
    I: IntoIterator<Item = &'a RouteDescriptor>,
{
    let mut document = Document::new(config.info());
    document.host = config.host.clone();
    document.base_path = config.base_path.clone();

    let mut registry = DefinitionRegistry::new(generator.clone());
    let mut security = SecurityTable::default();

    for route in routes {
        let mut operation = match route.method {
            Method::GET | Method::DELETE | Method::HEAD | Method::OPTIONS => {
                query_operation(route, &mut registry)
            }
            Method::POST | Method::PUT | Method::PATCH => body_operation(route, &mut registry),
            _ => {
                debug!(method = %route.method, path = %route.path, "method is not documented");
                continue;
            }
        };
        for scheme in &route.parameters.auth {
            operation.security.push(scheme.requirement());
            security.merge(scheme);
        }

        let path = classify::normalize_path(&route.path);
        let item = document.paths.entry(path).or_default();
        if let Some(slot) = item.slot_mut(&route.method) {
            *slot = Some(operation);
        }
    }

    document.definitions = registry.into_definitions();
    document.security_definitions = security.into_definitions();
    info!(
        paths = document.paths.len(),
        definitions = document.definitions.len(),
        "emitted API document"
    );
    document
}

fn base_operation(route: &RouteDescriptor) -> Operation {
    let parameters = classify::path_variables(&route.path)
        .iter()
        .map(|name| Parameter::path(name))
        .collect();
    Operation {
        tags: route.tags.clone(),
        summary: route.parameters.summary.clone(),
        parameters,
        ..Operation::default()
    }
}

/// Query-style routes: the request record surfaces only as path and query
/// parameters.
fn query_operation(route: &RouteDescriptor, registry: &mut DefinitionRegistry) -> Operation {
    let mut op = base_operation(route);
    if route.request.is_some() {
        for field in &route.classification.query {
            if op.parameters.iter().any(|p| p.name == field.param) {
                continue;
            }
            op.parameters.push(Parameter::query(field.param));
        }
    }
    add_response(&mut op, route, registry);
    op
}

/// Body-style routes: explicit query parameters, then either a JSON body or
/// multipart file parts plus a `request` form field.
fn body_operation(route: &RouteDescriptor, registry: &mut DefinitionRegistry) -> Operation {
    let mut op = base_operation(route);
    if let Some(request) = &route.request {
        for field in &route.classification.query {
            op.parameters.push(Parameter::query(field.param));
        }
        let skip = route.classification.skip_set();
        registry.add_skip_fields(request, skip.iter().cloned());
        registry.register(request);

        let uploads = file_uploads(route);
        if uploads.is_empty() {
            if let Some(ident) = request.ident {
                op.parameters
                    .push(Parameter::body(ident.name, &ident.qualified()));
            }
        } else {
            for upload in &uploads {
                op.parameters.push(if upload.multiple {
                    Parameter::files(&upload.name)
                } else {
                    Parameter::file(&upload.name)
                });
            }
            let mut default = route.zero_value.clone().unwrap_or(Value::Null);
            if let Value::Object(map) = &mut default {
                map.retain(|key, _| !skip.contains(key));
            }
            op.parameters.push(Parameter::form_value("request", default));
        }
    }
    add_response(&mut op, route, registry);
    op
}

/// Declared uploads first, then file fields of the request type not already
/// declared under the same name.
fn file_uploads(route: &RouteDescriptor) -> Vec<FileUpload> {
    let mut uploads = route.parameters.file_uploads.clone();
    for field in &route.classification.files {
        if uploads.iter().all(|u| u.name != field.param) {
            uploads.push(FileUpload {
                name: field.param.to_string(),
                multiple: field.multiple,
            });
        }
    }
    uploads
}

fn add_response(op: &mut Operation, route: &RouteDescriptor, registry: &mut DefinitionRegistry) {
    let Some(response) = &route.response else {
        return;
    };
    if let Some(schema) = registry.register(response) {
        op.responses = BTreeMap::from([(
            "200".to_string(),
            Response {
                description: "OK".to_string(),
                schema: Some(schema),
            },
        )]);
    }
}
