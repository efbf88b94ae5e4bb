//! # Dispatcher Module
//!
//! The Request Adapter: turns a raw request into a typed request record, calls the
//! handler, and renders what it returns.
//!
//! ## Request Flow
//!
//! Each dispatch is a single pass with no retries:
//!
//! 1. Fail fast when the request [`Context`](crate::server::Context) is already
//!    cancelled or past its deadline
//! 2. Start from the request type's zero value (`Default`)
//! 3. Body-bearing routes without file uploads decode the JSON body over it
//! 4. Routes with file uploads read the multipart form: the `request` text field
//!    is decoded over the zero value and file parts are bound by name
//! 5. Path and query values overwrite their fields; absent values bind as `""`
//! 6. The handler is invoked with the arguments its shape declares
//! 7. Record handlers get a `200` JSON response; error-only handlers have
//!    written their own output
//!
//! Any failure, binding or handler, is rendered as `{"error": "<description>"}`
//! with the configured failure status.
//!
//! ## Binding Plan
//!
//! The [`BindingPlan`] is computed once per route from the same
//! [`Classification`](crate::classify::Classification) used to build the
//! document, and shared read-only by every dispatch.

mod binding;
mod core;

pub use binding::{deep_merge, is_body_bearing, BindError, BindFiles, BindingPlan, FileSlot};
pub use core::{render_error, render_json, Endpoint, TypedEndpoint};
