//! # Server Module
//!
//! Abstractions over the host HTTP server.
//!
//! routecontract does not own a listener or a routing tree. The host server parses
//! the wire request and hands the adapter something implementing [`RawRequest`];
//! the adapter writes its result into a [`ResponseWriter`]. [`HttpRequest`] and
//! [`BufferedResponse`] are ready-made in-memory implementations used by tests,
//! the demo binary, and hosts that buffer whole requests anyway.
//!
//! Multipart parsing also belongs to the host: it supplies an already parsed
//! [`MultipartForm`] through [`RawRequest::multipart_form`].
//!
//! [`Context`] carries the per-request identity, deadline and cancellation flag
//! through binding and into the handler.

mod context;
mod request;
mod response;

pub use context::{CancelHandle, Context};
pub use request::{
    parse_query_params, FilePart, HeaderVec, HttpRequest, MultipartForm, ParamVec, RawRequest,
    MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
};
pub use response::{BufferedResponse, ResponseWriter};
