//! Field classification of request records, through the derive.

mod common;

use common::{CreateUserReq, GetUserReq, ListUsersReq, UpdateUserReq};
use http::Method;
use pretty_assertions::assert_eq;
use routecontract::classify::{classify, path_variables, Classification};
use routecontract::dispatcher::BindingPlan;
use routecontract::Describe;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn names(fields: &[routecontract::classify::BoundField]) -> Vec<&str> {
    fields.iter().map(|f| f.name).collect()
}

fn assert_exclusive(c: &Classification) {
    for path in &c.path {
        assert!(!c.is_query_field(path.ident), "{} is path and query", path.ident);
        assert!(!c.is_file_field(path.ident), "{} is path and file", path.ident);
    }
    for query in &c.query {
        assert!(!c.is_file_field(query.ident), "{} is query and file", query.ident);
    }
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct ByIdReq {
    #[param(rename = "id", path)]
    pub id: String,
}

#[test]
fn test_explicit_path_field() {
    let c = classify(&ByIdReq::describe(), &path_variables("/get/:id"), false);
    assert_eq!(names(&c.path), vec!["id"]);
    assert!(c.query.is_empty());
    assert!(c.files.is_empty());
}

#[test]
fn test_query_file_and_multi_file_fields() {
    let c = classify(&CreateUserReq::describe(), &[], true);
    assert_eq!(names(&c.query), vec!["public"]);
    assert!(c.path.is_empty());
    let files: Vec<(&str, bool)> = c.files.iter().map(|f| (f.name, f.multiple)).collect();
    assert_eq!(files, vec![("avatar", false), ("docs", true)]);
    assert_eq!(
        c.skip_set(),
        BTreeSet::from(["public".to_string(), "avatar".to_string(), "docs".to_string()])
    );
    assert_exclusive(&c);
}

#[test]
fn test_path_variable_name_matches_untagged_field() {
    let c = classify(&UpdateUserReq::describe(), &path_variables("/update/:id"), true);
    assert_eq!(names(&c.path), vec!["id"]);
    assert!(c.query.is_empty());
}

#[test]
fn test_query_style_route_defaults_strings_to_query() {
    let c = classify(&ListUsersReq::describe(), &[], false);
    // `page` is numeric and stays out of both lists
    assert_eq!(names(&c.query), vec!["offset", "limit"]);
    assert!(c.path.is_empty());
}

#[test]
fn test_body_route_skip_set_is_path_and_query() {
    let c = classify(&GetUserReq::describe(), &path_variables("/users/:id"), true);
    assert!(!c.has_files());
    let expected: BTreeSet<String> = c
        .path
        .iter()
        .chain(c.query.iter())
        .map(|f| f.name.to_string())
        .collect();
    assert_eq!(c.skip_set(), expected);
    assert_eq!(expected, BTreeSet::from(["id".to_string(), "public".to_string()]));
    assert_exclusive(&c);
}

#[derive(Debug, Default, Serialize, Deserialize, Describe)]
pub struct TaggedReq {
    #[serde(rename = "userId")]
    #[param(rename = "user_id")]
    pub user_id: String,
    #[param(skip)]
    pub internal: String,
    #[param(body)]
    pub note: String,
    hidden: String,
    pub count: i64,
}

#[test]
fn test_param_name_drives_matching_and_wire_name_drives_binding() {
    let c = classify(&TaggedReq::describe(), &path_variables("/u/:user_id"), false);
    assert_eq!(c.path.len(), 1);
    assert_eq!(c.path[0].param, "user_id");
    assert_eq!(c.path[0].name, "userId");
    assert_eq!(c.path[0].ident, "user_id");
    // query-style routes read every remaining string field from the query,
    // whatever its declared location
    assert_eq!(names(&c.query), vec!["note"]);
    assert_exclusive(&c);
}

#[test]
fn test_binding_plan_marks_multipart_routes() {
    let create = BindingPlan::new(&Method::POST, "/create", &CreateUserReq::describe(), 0);
    assert!(create.body_bearing && create.multipart);

    let declared_only = BindingPlan::new(&Method::POST, "/update/:id", &UpdateUserReq::describe(), 1);
    assert!(declared_only.multipart);

    let plain = BindingPlan::new(&Method::PUT, "/update/:id", &UpdateUserReq::describe(), 0);
    assert!(plain.body_bearing && !plain.multipart);

    let get = BindingPlan::new(&Method::GET, "/create", &CreateUserReq::describe(), 0);
    assert!(!get.body_bearing && !get.multipart);
}
