//! # Router Module
//!
//! Route registration and request routing.
//!
//! ## Lifecycle
//!
//! Registration and serving are separate phases, enforced by types:
//!
//! 1. **Registration**: a [`RouterBuilder`] is populated through [`RouteGroup`]s
//!    during startup. Every registration validates the handler contract,
//!    classifies the request fields and computes the binding plan once.
//! 2. **Sealing**: [`RouterBuilder::seal`] consumes the builder and returns an
//!    immutable [`Router`]. Nothing can be registered afterwards.
//! 3. **Serving**: the `Router` is `Send + Sync` and is shared freely; each
//!    dispatch allocates its own request value.
//!
//! ## Example
//!
//! ```rust,ignore
//! use routecontract::{ContractConfig, Handler, RouteParameters, RouterBuilder};
//!
//! let mut builder = RouterBuilder::new(ContractConfig::default());
//! let mut users = builder.group("/users", "users");
//! users.get("/get/:id", RouteParameters::summary("Get user"), Handler::record(get_user))?;
//! users.post("/create", RouteParameters::summary("Create user"), Handler::record(create_user))?;
//!
//! let router = builder.seal();
//! let document = router.emit_document();
//! router.dispatch(&ctx, &request, &mut response);
//! ```
//!
//! ## Matching
//!
//! Path templates use `:name` variables. Each template is compiled to a regex
//! once; a request matches the first route with the same method whose regex
//! matches the request path. Captured variables are offered to the binding step
//! when the host server did not supply path parameters itself.

mod builder;
mod core;
#[cfg(test)]
mod tests;

pub use builder::{
    FileUpload, RouteDescriptor, RouteGroup, RouteParameters, RouteRegistration, RouterBuilder,
};
pub use core::{MatchedRequest, Route, RouteMatch, Router};
