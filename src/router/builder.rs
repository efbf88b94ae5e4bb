use super::core::{Route, Router};
use crate::classify::Classification;
use crate::config::ContractConfig;
use crate::describe::TypeDescriptor;
use crate::dispatcher::{BindingPlan, TypedEndpoint};
use crate::schema::{AuthScheme, SchemaGenerator};
use crate::typed::{self, ContractError, Handler, RequestRecord, ResponseRecord};
use http::Method;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// A form part documented as a file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub name: String,
    /// Several parts under the same name
    pub multiple: bool,
}

impl FileUpload {
    pub fn single(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiple: false,
        }
    }

    pub fn multiple(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            multiple: true,
        }
    }
}

/// Per-route documentation parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParameters {
    pub summary: String,
    pub auth: Vec<AuthScheme>,
    /// Uploads documented in addition to the request type's file fields
    pub file_uploads: Vec<FileUpload>,
}

impl RouteParameters {
    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_auth(mut self, scheme: AuthScheme) -> Self {
        self.auth.push(scheme);
        self
    }

    #[must_use]
    pub fn with_file_upload(mut self, upload: FileUpload) -> Self {
        self.file_uploads.push(upload);
        self
    }
}

/// Everything the document needs to know about one route.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    pub method: Method,
    /// Full path template with `:name` variables
    pub path: String,
    pub tags: Vec<String>,
    pub parameters: RouteParameters,
    /// Request record; `None` when the route documents no handler types
    pub request: Option<TypeDescriptor>,
    /// Response record of record-returning handlers
    pub response: Option<TypeDescriptor>,
    pub classification: Classification,
    /// JSON of the request type's zero value, for the multipart `request` default
    pub zero_value: Option<Value>,
}

/// Outcome of a registration that did not abort.
#[derive(Debug, Clone)]
pub struct RouteRegistration {
    /// `METHOD~/full/path`
    pub key: String,
    pub method: Method,
    pub path: String,
    /// Whether the route appears in the emitted document
    pub documented: bool,
    /// Soft contract failure that kept the route out of the document
    pub schema_error: Option<ContractError>,
}

/// Collects routes during startup.
pub struct RouterBuilder {
    config: ContractConfig,
    generator: SchemaGenerator,
    routes: Vec<Route>,
    index: HashMap<String, usize>,
}

impl RouterBuilder {
    #[must_use]
    pub fn new(config: ContractConfig) -> Self {
        Self {
            config,
            generator: SchemaGenerator::new(),
            routes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Use `generator` (for extra well-known types) when emitting the document.
    #[must_use]
    pub fn with_generator(mut self, generator: SchemaGenerator) -> Self {
        self.generator = generator;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Top-level group; every route registered through it is tagged `tag`.
    pub fn group(&mut self, prefix: &str, tag: &str) -> RouteGroup<'_> {
        RouteGroup {
            builder: self,
            prefix: prefix.to_string(),
            tags: vec![tag.to_string()],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finish registration.
    #[must_use]
    pub fn seal(self) -> Router {
        info!(routes = self.routes.len(), "router sealed");
        Router::new(self.config, self.generator, self.routes)
    }

    fn insert(&mut self, route: Route) {
        match self.index.get(route.key()) {
            Some(&position) => {
                warn!(route = %route.key(), "route registered again; replacing previous handler");
                self.routes[position] = route;
            }
            None => {
                self.index.insert(route.key().to_string(), self.routes.len());
                self.routes.push(route);
            }
        }
    }
}

/// Routes sharing a path prefix and a tag.
pub struct RouteGroup<'a> {
    builder: &'a mut RouterBuilder,
    prefix: String,
    tags: Vec<String>,
}

macro_rules! method_routes {
    ($($(#[$doc:meta])* $name:ident => $method:expr;)*) => {
        $(
            $(#[$doc])*
            ///
            /// # Errors
            ///
            /// Returns a fatal [`ContractError`] when the handler's output shape is
            /// invalid; the route is not mounted then.
            pub fn $name<Req: RequestRecord, Resp: ResponseRecord>(
                &mut self,
                path: &str,
                params: RouteParameters,
                handler: Handler<Req, Resp>,
            ) -> Result<RouteRegistration, ContractError> {
                self.route($method, path, params, handler)
            }
        )*
    };
}

impl<'a> RouteGroup<'a> {
    /// Nested group: prefixes concatenate, the tag replaces the parent's.
    pub fn group(&mut self, prefix: &str, tag: &str) -> RouteGroup<'_> {
        RouteGroup {
            builder: &mut *self.builder,
            prefix: format!("{}{}", self.prefix, prefix),
            tags: vec![tag.to_string()],
        }
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    method_routes! {
        get => Method::GET;
        /// Register a body-bearing route.
        post => Method::POST;
        /// Register a body-bearing route.
        put => Method::PUT;
        /// Register a body-bearing route.
        patch => Method::PATCH;
        delete => Method::DELETE;
        /// Register a route documented without request or response types.
        head => Method::HEAD;
        /// Register a route documented without request or response types.
        options => Method::OPTIONS;
        /// Register a route that is dispatched but never documented.
        connect => Method::CONNECT;
        /// Register a route that is dispatched but never documented.
        trace => Method::TRACE;
    }

    /// Register `handler` for `method` on `prefix + path`.
    ///
    /// The handler contract is validated first. Input-shape problems are
    /// reported in [`RouteRegistration::schema_error`] and keep the route out of
    /// the document while still mounting it.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`ContractError`] (output shape) without mounting the
    /// route.
    pub fn route<Req: RequestRecord, Resp: ResponseRecord>(
        &mut self,
        method: Method,
        path: &str,
        params: RouteParameters,
        handler: Handler<Req, Resp>,
    ) -> Result<RouteRegistration, ContractError> {
        let full_path = join_path(&self.prefix, path);
        let key = format!("{}~{}", method, full_path);

        let (contract, schema_error) = match typed::validate(&handler.signature()) {
            Ok(contract) => (Some(contract), None),
            Err(e) if e.is_fatal() => {
                error!(route = %key, error = %e, "invalid handler");
                return Err(e);
            }
            Err(e) => {
                warn!(route = %key, error = %e, "handler left out of the API document");
                (None, Some(e))
            }
        };

        let request = Req::describe();
        let plan = BindingPlan::new(&method, &full_path, &request, params.file_uploads.len());

        let (request, response) = match method {
            Method::HEAD | Method::OPTIONS => (None, None),
            _ => match contract {
                Some(c) => (Some(c.request), c.response),
                None => (None, None),
            },
        };
        let documented = match method {
            Method::CONNECT | Method::TRACE => false,
            Method::HEAD | Method::OPTIONS => true,
            _ => request.is_some(),
        };
        let descriptor = documented.then(|| RouteDescriptor {
            method: method.clone(),
            path: full_path.clone(),
            tags: self.tags.clone(),
            parameters: params,
            request,
            response,
            classification: plan.classification.clone(),
            zero_value: serde_json::to_value(Req::default()).ok(),
        });

        let failure_status = self.builder.config.failure_status;
        let endpoint = TypedEndpoint::new(handler, plan, failure_status);
        self.builder.insert(Route::new(
            key.clone(),
            method.clone(),
            full_path.clone(),
            Box::new(endpoint),
            descriptor,
        ));
        info!(route = %key, documented, "registered route");

        Ok(RouteRegistration {
            key,
            method,
            path: full_path,
            documented,
            schema_error,
        })
    }
}

/// `prefix + path` with a trailing `/` removed, keeping the root path.
fn join_path(prefix: &str, path: &str) -> String {
    let full = format!("{}{}", prefix, path.strip_suffix('/').unwrap_or(path));
    if full.is_empty() {
        "/".to_string()
    } else {
        full
    }
}

#[cfg(test)]
mod tests {
    use super::join_path;

    #[test]
    fn test_join_path_trims_trailing_slash() {
        assert_eq!(join_path("/users", "/create/"), "/users/create");
        assert_eq!(join_path("/users", "/"), "/users");
        assert_eq!(join_path("", "/"), "/");
        assert_eq!(join_path("/users", "/get/:id"), "/users/get/:id");
    }
}
