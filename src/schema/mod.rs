//! # Schema Module
//!
//! Derives a Swagger 2.0 document from registered routes.
//!
//! ## Components
//!
//! - [`SchemaGenerator`] walks a [`TypeDescriptor`](crate::describe::TypeDescriptor)
//!   and produces schema fragments. Primitives keep their width as `format`
//!   (`int8` .. `int64`, `float`, `double`), unsigned integers add `minimum: 0`,
//!   sequences become arrays, string-keyed maps become objects with
//!   `additionalProperties`, optional wrappers are transparent and untyped values
//!   become a union of the scalar types. Records become `$ref`s to their own
//!   definition unless they are well-known value types.
//! - [`DefinitionRegistry`] queues records as they are discovered and expands
//!   each qualified name once, leaving out the route skip sets.
//! - [`SecurityTable`] merges auth schemes by name.
//! - [`emit_document`] ties them together per route.
//!
//! ## Well-known value types
//!
//! | Type | Schema |
//! |---|---|
//! | `chrono::DateTime<Tz>` | `{"type": "string", "format": "date-time"}` |
//! | `uuid::Uuid` | `{"type": "string", "format": "uuid"}` |
//!
//! A record whose only field is an embedded well-known type (a newtype such as
//! `struct CreatedAt(DateTime<Utc>)`) gets the same schema. A named alias
//! (`#[describe(alias)]`) keeps its own identity and is expanded from its shape
//! instead.
//!
//! ## Output
//!
//! Definitions and properties are kept in sorted maps, so the same routes always
//! produce byte-identical JSON and YAML.

mod emit;
mod registry;
mod security;
mod types;
mod walker;

pub use emit::emit_document;
pub use registry::DefinitionRegistry;
pub use security::{ApiKeyLocation, AuthKind, AuthScheme, SecurityTable};
pub use types::*;
pub use walker::SchemaGenerator;
