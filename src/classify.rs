//! Field Classifier.
//!
//! Decides for every field of a request record where its value comes from:
//! a path variable, the query string, an uploaded file, or the body. The same
//! [`Classification`] drives both the emitted parameters and request binding.
//!
//! Rules, in priority order:
//!
//! 1. skipped and non-public fields are ignored
//! 2. `#[param(path)]`, or a parameter name equal to a path variable, makes a path field
//! 3. on body-bearing routes only `#[param(query)]` makes a query field; on other
//!    routes every remaining string field is a query field
//! 4. only string fields are eligible for path and query
//!
//! File uploads are recognised by type alone (`FilePart`, `Option<FilePart>`,
//! `Vec<FilePart>`).

use crate::describe::{FieldDescriptor, Kind, Location, TypeDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static PATH_VARIABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":\w+").expect("path variable pattern is valid")
});

/// Names of the `:name` variables in a path template, in order.
#[must_use]
pub fn path_variables(path: &str) -> Vec<String> {
    PATH_VARIABLE
        .find_iter(path)
        .map(|m| m.as_str()[1..].to_string())
        .collect()
}

/// Rewrite `:name` variables as `{name}`.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    PATH_VARIABLE
        .replace_all(path, |caps: &regex::Captures<'_>| format!("{{{}}}", &caps[0][1..]))
        .into_owned()
}

/// A field bound from a path variable or a query value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundField {
    /// Rust field identifier
    pub ident: &'static str,
    /// JSON wire name; the key overwritten during binding
    pub name: &'static str,
    /// Parameter name looked up on the request
    pub param: &'static str,
}

impl BoundField {
    fn from_descriptor(field: &FieldDescriptor) -> Self {
        Self {
            ident: field.ident,
            name: field.name,
            param: field.param_name(),
        }
    }
}

/// A field bound from uploaded file parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileField {
    pub ident: &'static str,
    pub name: &'static str,
    /// Form part name
    pub param: &'static str,
    /// Sequence of parts rather than a single part
    pub multiple: bool,
}

/// Where each bindable field of a request record comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub path: Vec<BoundField>,
    pub query: Vec<BoundField>,
    pub files: Vec<FileField>,
}

impl Classification {
    /// Wire names left out of the body definition: path, query and file fields.
    #[must_use]
    pub fn skip_set(&self) -> BTreeSet<String> {
        self.path
            .iter()
            .chain(self.query.iter())
            .map(|f| f.name.to_string())
            .chain(self.files.iter().map(|f| f.name.to_string()))
            .collect()
    }

    #[must_use]
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    #[must_use]
    pub fn is_path_field(&self, ident: &str) -> bool {
        self.path.iter().any(|f| f.ident == ident)
    }

    #[must_use]
    pub fn is_query_field(&self, ident: &str) -> bool {
        self.query.iter().any(|f| f.ident == ident)
    }

    #[must_use]
    pub fn is_file_field(&self, ident: &str) -> bool {
        self.files.iter().any(|f| f.ident == ident)
    }
}

/// Classify the fields of `desc` for a route with the given path variables.
#[must_use]
pub fn classify(desc: &TypeDescriptor, path_vars: &[String], body_bearing: bool) -> Classification {
    let mut classification = Classification {
        files: file_fields(desc),
        ..Classification::default()
    };
    for field in desc.fields() {
        if !field.is_exposed() || !field.descriptor().is_string() {
            continue;
        }
        let param = field.param_name();
        let is_path = field.location == Some(Location::Path)
            || path_vars.iter().any(|v| v == param);
        if is_path {
            classification.path.push(BoundField::from_descriptor(&field));
        } else if field.location == Some(Location::Query) || !body_bearing {
            classification.query.push(BoundField::from_descriptor(&field));
        }
    }
    classification
}

/// File-upload fields of `desc`, found by type.
#[must_use]
pub fn file_fields(desc: &TypeDescriptor) -> Vec<FileField> {
    desc.fields()
        .iter()
        .filter(|f| f.is_exposed())
        .filter_map(|f| {
            let multiple = match f.descriptor().kind {
                Kind::FilePart => false,
                Kind::Optional(inner) if matches!(inner.kind, Kind::FilePart) => false,
                Kind::Sequence(inner) if matches!(inner.kind, Kind::FilePart) => true,
                _ => return None,
            };
            Some(FileField {
                ident: f.ident,
                name: f.name,
                param: f.param_name(),
                multiple,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::{Describe, TypeIdent};
    use crate::server::FilePart;

    const NS: &str = "app::handlers";

    fn field(
        owner: TypeIdent,
        name: &'static str,
        location: Option<Location>,
        ty: fn() -> TypeDescriptor,
    ) -> FieldDescriptor {
        FieldDescriptor {
            owner,
            ident: name,
            name,
            param: None,
            location,
            public: true,
            skip: false,
            embedded: false,
            ty,
        }
    }

    #[test]
    fn test_path_variables_and_normalisation() {
        assert_eq!(path_variables("/users/:id/posts/:post_id"), vec!["id", "post_id"]);
        assert_eq!(normalize_path("/users/:id/posts/:post_id"), "/users/{id}/posts/{post_id}");
        assert_eq!(normalize_path("/plain"), "/plain");
    }

    #[test]
    fn test_query_style_route_treats_strings_as_query() {
        const OWNER: TypeIdent = TypeIdent::new(NS, "Search");
        let desc = TypeDescriptor::record(NS, "Search", || {
            vec![
                field(OWNER, "id", None, String::describe),
                field(OWNER, "term", None, String::describe),
                field(OWNER, "limit", None, u32::describe),
            ]
        });
        let c = classify(&desc, &["id".to_string()], false);
        assert_eq!(c.path.len(), 1);
        assert_eq!(c.query.iter().map(|f| f.name).collect::<Vec<_>>(), vec!["term"]);
        assert!(!c.is_query_field("limit"));
    }

    #[test]
    fn test_body_route_needs_explicit_query() {
        const OWNER: TypeIdent = TypeIdent::new(NS, "Create");
        let desc = TypeDescriptor::record(NS, "Create", || {
            vec![
                field(OWNER, "name", None, String::describe),
                field(OWNER, "trace", Some(Location::Query), String::describe),
                field(OWNER, "avatar", None, <Option<FilePart>>::describe),
                field(OWNER, "docs", None, <Vec<FilePart>>::describe),
            ]
        });
        let c = classify(&desc, &[], true);
        assert!(c.path.is_empty());
        assert_eq!(c.query.iter().map(|f| f.name).collect::<Vec<_>>(), vec!["trace"]);
        assert_eq!(
            c.files.iter().map(|f| (f.name, f.multiple)).collect::<Vec<_>>(),
            vec![("avatar", false), ("docs", true)]
        );
        assert_eq!(
            c.skip_set().into_iter().collect::<Vec<_>>(),
            vec!["avatar", "docs", "trace"]
        );
    }
}
