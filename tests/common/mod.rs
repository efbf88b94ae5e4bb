#![allow(dead_code)]

//! Shared fixtures for the integration tests: request/response records shaped
//! like a small users service, plus dispatch and tracing helpers.

use routecontract::server::{HttpRequest, RawRequest};
use routecontract::{BufferedResponse, Context, Describe, FilePart, Router};
use serde::{Deserialize, Serialize};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test subscriber once per test binary; `RUST_LOG` selects the level.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Dispatch `request` through `router` with a fresh context.
pub fn dispatch(router: &Router, request: &HttpRequest) -> BufferedResponse {
    let ctx = Context::new();
    let mut out = BufferedResponse::new();
    router.dispatch(&ctx, request as &dyn RawRequest, &mut out);
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Describe)]
pub struct GetUserReq {
    #[param(path)]
    pub id: String,
    #[param(query)]
    pub public: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Describe)]
pub struct UserRec {
    pub login: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Describe)]
pub struct UpdateUserReq {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Describe)]
pub struct CreateUserReq {
    pub login: String,
    pub name: String,
    #[param(query)]
    pub public: String,
    pub avatar: Option<FilePart>,
    pub docs: Vec<FilePart>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Describe)]
pub struct CreateUserRes {
    pub id: String,
    pub avatar_name: String,
    pub docs_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Describe)]
pub struct ListUsersReq {
    pub offset: String,
    pub limit: String,
    /// Non-string fields never bind from the query string.
    pub page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Describe)]
pub struct ListUsersRes {
    pub users: Vec<UserRec>,
    pub total: u64,
}
