//! # routecontract
//!
//! **routecontract** derives route contracts from typed Rust handlers: a Swagger 2.0
//! document built from the handlers' request and response records, and the runtime
//! binding that turns an incoming request into those records.
//!
//! ## Overview
//!
//! Handlers are plain closures over a request record. Records derive
//! [`Describe`], which gives the crate an explicit, queryable description of
//! their fields and field types. From that description the crate:
//!
//! - classifies every request field as a path, query, file-upload or body field
//! - emits schema definitions, once per distinct type, for request and response
//!   records and everything they reference
//! - binds requests at runtime: zero value, JSON body or multipart form, then
//!   path and query overrides, then the handler call and JSON rendering
//!
//! The HTTP server, its multipart parser and the swagger-UI endpoint live outside
//! this crate. Hosts implement [`RawRequest`](server::RawRequest) and
//! [`ResponseWriter`](server::ResponseWriter) over their own types.
//!
//! ## Architecture
//!
//! - **[`describe`]** - Type descriptions and the `Describe` trait
//! - **[`classify`]** - Field Classifier and path-template helpers
//! - **[`schema`]** - Walker, Definition Registry, security table and document emitter
//! - **[`typed`]** - Handler shapes and the Handler Contract Validator
//! - **[`dispatcher`]** - Request Adapter: binding, invocation, rendering
//! - **[`router`]** - Registration API, sealing and route lookup
//! - **[`server`]** - Host-facing request/response abstractions and request context
//! - **[`config`]** - Document metadata and failure status
//!
//! ### Registration Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant App
//!     participant Group as RouteGroup
//!     participant Validator as typed::validate
//!     participant Classifier as classify
//!     participant Builder as RouterBuilder
//!
//!     App->>Group: post("/create", params, Handler::record(f))
//!     Group->>Validator: handler.signature()
//!     alt output shape invalid
//!         Validator-->>App: Err(ContractError) (fatal)
//!     end
//!     Validator-->>Group: HandlerContract (or soft error)
//!     Group->>Classifier: classify(Req::describe(), path vars, body-bearing)
//!     Classifier-->>Group: Classification
//!     Group->>Builder: insert Route (endpoint + descriptor)
//!     App->>Builder: seal()
//!     Builder-->>App: Router (immutable)
//! ```
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Router
//!     participant Plan as BindingPlan
//!     participant Handler
//!
//!     Host->>Router: dispatch(ctx, raw, out)
//!     Router->>Router: match method + path
//!     Router->>Plan: bind(ctx, raw)
//!     Plan->>Plan: zero value, body/form, path + query overlay
//!     Plan-->>Router: Req
//!     Router->>Handler: call(ctx, req, raw, out)
//!     Handler-->>Router: Ok(resp) / Err(e)
//!     Router-->>Host: 200 JSON / {"error": ...}
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use routecontract::{ContractConfig, Describe, Handler, RouteParameters, RouterBuilder};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Describe)]
//! pub struct GetUserReq {
//!     #[param(path)]
//!     pub id: String,
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Describe)]
//! pub struct GetUserResp {
//!     pub id: String,
//!     pub name: String,
//! }
//!
//! let mut builder = RouterBuilder::new(ContractConfig::from_env());
//! builder.group("/users", "users").get(
//!     "/get/:id",
//!     RouteParameters::summary("Get user"),
//!     Handler::record(|_ctx, req: GetUserReq| {
//!         Ok(GetUserResp { id: req.id, name: "Ann".into() })
//!     }),
//! )?;
//! let router = builder.seal();
//! println!("{}", router.emit_document().to_json_pretty()?);
//! ```

extern crate self as routecontract;

pub mod classify;
pub mod config;
pub mod describe;
pub mod dispatcher;
pub mod ids;
pub mod router;
pub mod schema;
pub mod server;
pub mod typed;

pub use config::ContractConfig;
pub use describe::{Describe, FieldDescriptor, TypeDescriptor, TypeIdent};
pub use dispatcher::{BindFiles, FileSlot};
pub use router::{FileUpload, RouteParameters, RouteRegistration, Router, RouterBuilder};
pub use routecontract_macros::Describe;
pub use schema::{ApiKeyLocation, AuthScheme, Document};
pub use server::{BufferedResponse, Context, FilePart, HttpRequest, MultipartForm};
pub use typed::{ContractError, EmptyRequest, EmptyResponse, ErrorResult, Handler};
