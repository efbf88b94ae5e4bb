use super::core::path_to_regex;
use super::{RouteParameters, RouterBuilder};
use crate::config::ContractConfig;
use crate::server::{BufferedResponse, Context, HttpRequest, RawRequest};
use crate::typed::{EmptyRequest, EmptyResponse, Handler};
use http::Method;
use std::sync::Arc;

#[test]
fn test_root_path() {
    let (re, params) = path_to_regex("/");
    assert!(re.is_match("/"));
    assert!(params.is_empty());
}

#[test]
fn test_parameterized_path() {
    let (re, params) = path_to_regex("/items/:id");
    assert!(re.is_match("/items/123"));
    assert!(!re.is_match("/items/123/extra"));
    assert_eq!(params, vec![Arc::<str>::from("id")]);
}

#[test]
fn test_nested_path() {
    let (re, params) = path_to_regex("/a/:b/c");
    assert!(re.is_match("/a/1/c"));
    assert_eq!(params, vec![Arc::<str>::from("b")]);
}

#[test]
fn test_literal_segments_are_escaped() {
    let (re, _) = path_to_regex("/files/v1.0");
    assert!(re.is_match("/files/v1.0"));
    assert!(!re.is_match("/files/v1x0"));
}

#[test]
fn test_router_is_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<super::Router>();
}

#[test]
fn test_reregistration_overwrites() {
    let mut builder = RouterBuilder::new(ContractConfig::default());
    {
        let mut group = builder.group("/ping", "ping");
        let first = group.get("", RouteParameters::default(), Handler::error_only(|_, _: EmptyRequest| Ok(())));
        assert!(first.is_ok());
        let second = group.get(
            "/",
            RouteParameters::summary("pong"),
            Handler::<EmptyRequest, EmptyResponse>::record(|_, _| Ok(EmptyResponse {})),
        );
        assert_eq!(second.map(|r| r.key).ok(), Some("GET~/ping".to_string()));
    }
    assert_eq!(builder.len(), 1);
    let router = builder.seal();
    let route = router.route("GET~/ping");
    assert_eq!(
        route.and_then(|r| r.descriptor()).map(|d| d.parameters.summary.as_str()),
        Some("pong")
    );
}

#[test]
fn test_dispatch_unknown_route_is_404() {
    let router = RouterBuilder::new(ContractConfig::default()).seal();
    let mut out = BufferedResponse::new();
    router.dispatch(&Context::new(), &HttpRequest::new(Method::GET, "/nowhere"), &mut out);
    assert_eq!(out.status, 404);
    assert_eq!(out.json().unwrap_or_default()["error"], "route not found");
}

#[test]
fn test_find_captures_path_variables() {
    let mut builder = RouterBuilder::new(ContractConfig::default());
    let registered = builder.group("/users", "users").delete(
        "/delete/:id",
        RouteParameters::default(),
        Handler::error_only(|_, _: EmptyRequest| Ok(())),
    );
    assert!(registered.is_ok());
    let router = builder.seal();
    let matched = router.find(&Method::DELETE, "/users/delete/42");
    let params = matched.map(|m| m.path_params);
    assert_eq!(
        params.as_ref().and_then(|p| p.first()).map(|(k, v)| (k.as_ref(), v.as_str())),
        Some(("id", "42"))
    );
    assert!(router.find(&Method::GET, "/users/delete/42").is_none());

    let raw = HttpRequest::new(Method::DELETE, "/users/delete/42");
    let view = super::MatchedRequest::new(&raw, params.unwrap_or_default());
    assert_eq!(view.path_param("id"), Some("42"));
}
