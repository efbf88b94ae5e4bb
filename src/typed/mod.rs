//! # Typed Module
//!
//! Handler shapes and the Handler Contract Validator.
//!
//! ## Overview
//!
//! A handler is a plain closure over a typed request record. Instead of inspecting
//! the closure on every call, each handler is wrapped once, at registration, in one
//! of six [`Handler`] variants:
//!
//! | Variant | Closure |
//! |---|---|
//! | `ErrorOnly` | `Fn(&Context, Req) -> anyhow::Result<()>` |
//! | `ErrorOnlyWithRequest` | `Fn(&Context, Req, &dyn RawRequest) -> anyhow::Result<()>` |
//! | `ErrorOnlyWithWriter` | `Fn(&Context, Req, &dyn RawRequest, &mut dyn ResponseWriter) -> anyhow::Result<()>` |
//! | `Record` | `Fn(&Context, Req) -> anyhow::Result<Resp>` |
//! | `RecordWithRequest` | `Fn(&Context, Req, &dyn RawRequest) -> anyhow::Result<Resp>` |
//! | `RecordWithWriter` | `Fn(&Context, Req, &dyn RawRequest, &mut dyn ResponseWriter) -> anyhow::Result<Resp>` |
//!
//! Error-only handlers write their own output; record handlers have their
//! response serialized as JSON.
//!
//! ## Contracts
//!
//! Every variant reports a [`HandlerSignature`]: its input slots and output slots,
//! with the request and response records described through
//! [`Describe`](crate::describe::Describe). [`validate`] turns a signature into a
//! [`HandlerContract`], or a [`ContractError`]:
//!
//! - input-shape errors (request type is not a record, wrong parameter kinds) are
//!   soft: the route is still dispatched but left out of the document
//! - output-shape errors (response type is not a record, missing error slot) are
//!   fatal and abort registration
//!
//! ```rust,ignore
//! use routecontract::typed::Handler;
//!
//! let handler = Handler::record(|_ctx, req: GetUserReq| {
//!     Ok(GetUserResp { id: req.id, ..Default::default() })
//! });
//! let contract = routecontract::typed::validate(&handler.signature())?;
//! ```

mod contract;
mod core;

pub use contract::*;
pub use core::*;
