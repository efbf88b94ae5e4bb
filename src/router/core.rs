use super::builder::RouteDescriptor;
use crate::config::ContractConfig;
use crate::dispatcher::{render_error, BindingPlan, Endpoint};
use crate::schema::{emit_document, Document, SchemaGenerator};
use crate::server::{Context, MultipartForm, ParamVec, RawRequest, ResponseWriter};
use http::Method;
use regex::Regex;
use std::sync::Arc;
use tracing::debug;

/// A mounted route.
pub struct Route {
    key: String,
    method: Method,
    path: String,
    matcher: Regex,
    param_names: Vec<Arc<str>>,
    endpoint: Box<dyn Endpoint>,
    descriptor: Option<RouteDescriptor>,
}

impl Route {
    pub(crate) fn new(
        key: String,
        method: Method,
        path: String,
        endpoint: Box<dyn Endpoint>,
        descriptor: Option<RouteDescriptor>,
    ) -> Self {
        let (matcher, param_names) = path_to_regex(&path);
        Self {
            key,
            method,
            path,
            matcher,
            param_names,
            endpoint,
            descriptor,
        }
    }

    /// `METHOD~/full/path`
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path template with `:name` variables.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Document entry; `None` for undocumented routes.
    #[must_use]
    pub fn descriptor(&self) -> Option<&RouteDescriptor> {
        self.descriptor.as_ref()
    }

    #[must_use]
    pub fn plan(&self) -> &BindingPlan {
        self.endpoint.plan()
    }

    /// Path variables captured from `path`, or `None` if it does not match.
    fn captures(&self, path: &str) -> Option<ParamVec> {
        let caps = self.matcher.captures(path)?;
        Some(
            self.param_names
                .iter()
                .enumerate()
                .filter_map(|(i, name)| {
                    caps.get(i + 1)
                        .map(|m| (Arc::clone(name), m.as_str().to_string()))
                })
                .collect(),
        )
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("key", &self.key)
            .field("documented", &self.descriptor.is_some())
            .finish_non_exhaustive()
    }
}

/// A matched route plus the path variables captured from the request path.
#[derive(Debug)]
pub struct RouteMatch<'r> {
    pub route: &'r Route,
    pub path_params: ParamVec,
}

/// Sealed route table. Read-only; shared across serving threads.
pub struct Router {
    config: ContractConfig,
    generator: SchemaGenerator,
    routes: Vec<Route>,
}

impl Router {
    pub(crate) fn new(config: ContractConfig, generator: SchemaGenerator, routes: Vec<Route>) -> Self {
        Self {
            config,
            generator,
            routes,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn route(&self, key: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.key == key)
    }

    /// Descriptors of every documented route, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter().filter_map(Route::descriptor)
    }

    /// Build the API document. Each call walks every type again.
    #[must_use]
    pub fn emit_document(&self) -> Document {
        emit_document(&self.config, &self.generator, self.descriptors())
    }

    /// First route with `method` whose template matches `path`.
    #[must_use]
    pub fn find(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|r| &r.method == method)
            .find_map(|route| {
                route.captures(path).map(|path_params| RouteMatch { route, path_params })
            })
    }

    /// Route `raw`, bind it, call the handler and render the outcome.
    ///
    /// Unknown routes render `404 {"error": "route not found"}`.
    pub fn dispatch(&self, ctx: &Context, raw: &dyn RawRequest, out: &mut dyn ResponseWriter) {
        match self.find(raw.method(), raw.path()) {
            Some(m) => {
                debug!(route = %m.route.key, request_id = %ctx.request_id(), "route matched");
                let matched = MatchedRequest::new(raw, m.path_params);
                m.route.endpoint.dispatch(ctx, &matched, out);
            }
            None => {
                debug!(method = %raw.method(), path = %raw.path(), "no route matched");
                render_error(out, 404, "route not found");
            }
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("config", &self.config)
            .field("routes", &self.routes)
            .finish()
    }
}

/// Request view that falls back to variables captured by the router when the
/// host did not supply a path parameter.
pub struct MatchedRequest<'a> {
    inner: &'a dyn RawRequest,
    captured: ParamVec,
}

impl<'a> MatchedRequest<'a> {
    #[must_use]
    pub fn new(inner: &'a dyn RawRequest, captured: ParamVec) -> Self {
        Self { inner, captured }
    }
}

impl RawRequest for MatchedRequest<'_> {
    fn method(&self) -> &Method {
        self.inner.method()
    }

    fn path(&self) -> &str {
        self.inner.path()
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.inner.path_param(name).or_else(|| {
            self.captured
                .iter()
                .find(|(k, _)| k.as_ref() == name)
                .map(|(_, v)| v.as_str())
        })
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.inner.query_param(name)
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.inner.header(name)
    }

    fn body(&self) -> &[u8] {
        self.inner.body()
    }

    fn multipart_form(&self) -> anyhow::Result<MultipartForm> {
        self.inner.multipart_form()
    }
}

/// Compile a `:name` path template into an anchored regex and its variable names.
///
/// `/users/:id` becomes `^/users/([^/]+)$` with names `["id"]`.
pub(crate) fn path_to_regex(path: &str) -> (Regex, Vec<Arc<str>>) {
    let mut pattern = String::with_capacity(path.len() + 8);
    pattern.push('^');
    let mut names = Vec::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        pattern.push('/');
        match segment.strip_prefix(':') {
            Some(name) => {
                pattern.push_str("([^/]+)");
                names.push(Arc::from(name));
            }
            None => pattern.push_str(&regex::escape(segment)),
        }
    }
    if names.is_empty() && pattern == "^" {
        pattern.push('/');
    }
    pattern.push('$');
    let matcher = Regex::new(&pattern).expect("Failed to compile path regex");
    (matcher, names)
}
