use crate::classify::{self, Classification, FileField};
use crate::describe::TypeDescriptor;
use crate::server::{Context, FilePart, RawRequest};
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

/// Assigns uploaded file parts to the fields of a request record.
///
/// Implemented by `#[derive(Describe)]` for every field typed `FilePart`,
/// `Option<FilePart>` or `Vec<FilePart>`.
pub trait BindFiles {
    /// Fill the field whose Rust identifier is `ident`.
    ///
    /// Returns `false` when the record has no such file field.
    fn bind_files(&mut self, ident: &str, parts: Vec<FilePart>) -> bool;
}

/// A field type that can hold uploaded parts.
pub trait FileSlot {
    fn fill(&mut self, parts: Vec<FilePart>);
}

impl FileSlot for FilePart {
    fn fill(&mut self, parts: Vec<FilePart>) {
        if let Some(first) = parts.into_iter().next() {
            *self = first;
        }
    }
}

impl FileSlot for Option<FilePart> {
    fn fill(&mut self, parts: Vec<FilePart>) {
        if let Some(first) = parts.into_iter().next() {
            *self = Some(first);
        }
    }
}

impl FileSlot for Vec<FilePart> {
    fn fill(&mut self, parts: Vec<FilePart>) {
        *self = parts;
    }
}

/// Request-time binding failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// Context cancelled or deadline exceeded before decoding
    Inactive(String),
    /// Zero value of the request type could not be encoded
    ZeroValue(String),
    /// Request body is not valid JSON for the request type
    Body(String),
    /// Body is not a multipart form
    Multipart(String),
    /// `request` form field is not valid JSON for the request type
    FormRequest(String),
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindError::Inactive(reason) => write!(f, "{}", reason),
            BindError::ZeroValue(e) => write!(f, "cannot build request value: {}", e),
            BindError::Body(e) => write!(f, "could not decode req body json: {}", e),
            BindError::Multipart(e) => write!(f, "cannot get multipart form: {}", e),
            BindError::FormRequest(e) => write!(
                f,
                "cannot process multipart form: could not decode req body json: {}",
                e
            ),
        }
    }
}

impl std::error::Error for BindError {}

/// Merge `patch` into `target`.
///
/// Objects merge key by key, recursively; `null` leaves the target untouched;
/// any other value replaces it.
pub fn deep_merge(target: &mut Value, patch: Value) {
    match (target, patch) {
        (_, Value::Null) => {}
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None if value.is_null() => {}
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// How one route binds its request record.
#[derive(Debug, Clone)]
pub struct BindingPlan {
    /// Body is decoded (POST, PUT, PATCH)
    pub body_bearing: bool,
    /// Body is a multipart form
    pub multipart: bool,
    pub classification: Classification,
}

impl BindingPlan {
    /// Plan for `request` on a route with `method` and `path` template.
    ///
    /// `declared_uploads` names form parts the route documents as uploads
    /// besides those found on the request type; any of them makes the route
    /// multipart.
    #[must_use]
    pub fn new(method: &Method, path: &str, request: &TypeDescriptor, declared_uploads: usize) -> Self {
        let body_bearing = is_body_bearing(method);
        let path_vars = classify::path_variables(path);
        let classification = classify::classify(request, &path_vars, body_bearing);
        let multipart = body_bearing && (classification.has_files() || declared_uploads > 0);
        Self {
            body_bearing,
            multipart,
            classification,
        }
    }

    /// Bind `raw` into a fresh `Req`.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] when the context is no longer active or when the
    /// body or form cannot be decoded.
    pub fn bind<Req>(&self, ctx: &Context, raw: &dyn RawRequest) -> Result<Req, BindError>
    where
        Req: Default + Serialize + DeserializeOwned + BindFiles,
    {
        ctx.ensure_active().map_err(BindError::Inactive)?;

        let mut value =
            serde_json::to_value(Req::default()).map_err(|e| BindError::ZeroValue(e.to_string()))?;
        let mut uploads = Vec::new();

        if self.multipart {
            let form = raw
                .multipart_form()
                .map_err(|e| BindError::Multipart(format!("{e:#}")))?;
            if let Some(text) = form.value("request") {
                let decoded: Value = serde_json::from_str(text)
                    .map_err(|e| BindError::FormRequest(e.to_string()))?;
                deep_merge(&mut value, decoded);
            }
            for field in &self.classification.files {
                if let Some(parts) = form.files.get(field.param) {
                    uploads.push((field.clone(), parts.clone()));
                }
            }
        } else if self.body_bearing {
            let decoded: Value =
                serde_json::from_slice(raw.body()).map_err(|e| BindError::Body(e.to_string()))?;
            deep_merge(&mut value, decoded);
        }

        if let Value::Object(map) = &mut value {
            self.overlay_params(map, raw);
        }

        let mut req: Req = serde_json::from_value(value).map_err(|e| {
            if self.multipart {
                BindError::FormRequest(e.to_string())
            } else {
                BindError::Body(e.to_string())
            }
        })?;

        for (field, parts) in uploads {
            bind_upload(&mut req, &field, parts);
        }
        Ok(req)
    }

    /// Path and query values win over anything decoded from the body.
    fn overlay_params(&self, map: &mut Map<String, Value>, raw: &dyn RawRequest) {
        for field in &self.classification.path {
            let v = raw.path_param(field.param).unwrap_or_default();
            map.insert(field.name.to_string(), Value::String(v.to_string()));
        }
        for field in &self.classification.query {
            let v = raw.query_param(field.param).unwrap_or_default();
            map.insert(field.name.to_string(), Value::String(v.to_string()));
        }
    }
}

fn bind_upload<Req: BindFiles>(req: &mut Req, field: &FileField, parts: Vec<FilePart>) {
    let count = parts.len();
    if req.bind_files(field.ident, parts) {
        debug!(field = field.ident, parts = count, "bound uploaded files");
    } else {
        debug!(field = field.ident, "request type cannot hold uploaded files");
    }
}

/// Methods whose body is decoded into the request record.
#[must_use]
pub fn is_body_bearing(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deep_merge_objects_and_nulls() {
        let mut target = json!({"name": "", "address": {"city": "", "zip": ""}, "tags": ["a"]});
        deep_merge(
            &mut target,
            json!({"name": "ann", "address": {"city": "Oslo"}, "tags": ["b", "c"], "extra": null}),
        );
        assert_eq!(
            target,
            json!({"name": "ann", "address": {"city": "Oslo", "zip": ""}, "tags": ["b", "c"]})
        );
        deep_merge(&mut target, json!({"name": null}));
        assert_eq!(target["name"], "ann");
    }

    #[test]
    fn test_file_slots() {
        let parts = vec![FilePart::new("a.png", b"a".to_vec()), FilePart::new("b.png", b"b".to_vec())];
        let mut single = FilePart::default();
        single.fill(parts.clone());
        assert_eq!(single.filename, "a.png");

        let mut optional: Option<FilePart> = None;
        optional.fill(Vec::new());
        assert!(optional.is_none());
        optional.fill(parts.clone());
        assert_eq!(optional.map(|p| p.filename), Some("a.png".to_string()));

        let mut many: Vec<FilePart> = Vec::new();
        many.fill(parts);
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn test_bind_error_messages() {
        assert_eq!(
            BindError::Body("EOF while parsing a value".into()).to_string(),
            "could not decode req body json: EOF while parsing a value"
        );
        assert_eq!(BindError::Inactive("context cancelled".into()).to_string(), "context cancelled");
    }

    #[test]
    fn test_body_bearing_methods() {
        assert!(is_body_bearing(&Method::PUT));
        assert!(!is_body_bearing(&Method::DELETE));
        assert!(!is_body_bearing(&Method::HEAD));
    }
}
