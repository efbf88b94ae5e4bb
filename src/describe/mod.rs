//! # Describe Module
//!
//! Explicit, queryable type descriptions for request and response records.
//!
//! Every type that can appear in a route contract implements [`Describe`]. Records
//! normally get their implementation from `#[derive(Describe)]`; primitives,
//! containers and the well-known value types (`chrono::DateTime`, `uuid::Uuid`) are
//! implemented here.
//!
//! ## Field attributes
//!
//! The derive reads the same attributes serde uses for the wire name, plus a
//! `param` attribute for binding location:
//!
//! ```rust,ignore
//! use routecontract::Describe;
//!
//! #[derive(Default, Serialize, Deserialize, Describe)]
//! pub struct UpdateUserAvatarReq {
//!     #[serde(rename = "id")]
//!     pub id: String,
//!     #[param(rename = "force", query)]
//!     pub force: String,
//!     pub avatar: Option<FilePart>,
//! }
//! ```
//!
//! | Attribute | Meaning |
//! |---|---|
//! | `#[serde(rename = "x")]` | JSON wire name |
//! | `#[serde(skip)]` / `#[param(skip)]` | excluded from schema and binding |
//! | `#[serde(flatten)]` | embedded field |
//! | `#[param(rename = "x")]` | parameter name for path/query/file binding |
//! | `#[param(path)]`, `#[param(query)]`, `#[param(body)]` | binding location |
//! | `#[describe(alias)]` (container) | named alias of the single inner type |
//!
//! Field types are captured as function pointers, so a record that refers to
//! itself (directly or through a cycle) can be described without recursing.

mod impls;
mod types;

pub use types::*;
