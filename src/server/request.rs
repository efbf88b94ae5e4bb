use anyhow::anyhow;
use http::Method;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

/// Maximum number of path/query parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Parameter storage; names are shared `Arc<str>` taken from the route template.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Header storage with lowercase `Arc<str>` names.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// One uploaded file from a multipart form.
///
/// Request records declare `FilePart` (single upload, usually `Option<FilePart>`)
/// or `Vec<FilePart>` (multiple uploads) fields; they are bound from the form by
/// parameter name. The content is not part of the JSON representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePart {
    pub filename: String,
    pub content_type: Option<String>,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl FilePart {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A parsed `multipart/form-data` body: text values and file parts, by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub values: HashMap<String, Vec<String>>,
    pub files: HashMap<String, Vec<FilePart>>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.entry(name.into()).or_default().push(value.into());
        self
    }

    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, part: FilePart) -> Self {
        self.files.entry(name.into()).or_default().push(part);
        self
    }

    /// First text value for `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// First file part for `name`.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&FilePart> {
        self.files.get(name).and_then(|v| v.first())
    }
}

/// Read access to the incoming request, implemented by the host server.
///
/// Lookups for absent path or query parameters return `None`; the adapter binds
/// those as empty strings.
pub trait RawRequest {
    fn method(&self) -> &Method;

    /// Request path without the query string
    fn path(&self) -> &str;

    fn path_param(&self, name: &str) -> Option<&str>;

    fn query_param(&self, name: &str) -> Option<&str>;

    /// Header lookup, case-insensitive
    fn header(&self, name: &str) -> Option<&str>;

    /// Raw request body
    fn body(&self) -> &[u8];

    /// Parsed multipart form
    ///
    /// # Errors
    ///
    /// Returns an error when the body is not a multipart form.
    fn multipart_form(&self) -> anyhow::Result<MultipartForm>;
}

/// Parse query string parameters from a URL path
///
/// Extracts everything after the `?` character and URL-decodes names and values.
#[must_use]
pub fn parse_query_params(path: &str) -> ParamVec {
    match path.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
            .collect(),
        None => ParamVec::new(),
    }
}

/// Fully buffered request, the in-memory [`RawRequest`].
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub path_params: ParamVec,
    pub query_params: ParamVec,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
    pub form: Option<MultipartForm>,
}

impl HttpRequest {
    /// Build a request from a method and a URI path that may carry a query string.
    pub fn new(method: Method, uri: &str) -> Self {
        let path = uri.split('?').next().unwrap_or("/").to_string();
        Self {
            method,
            path,
            path_params: ParamVec::new(),
            query_params: parse_query_params(uri),
            headers: HeaderVec::new(),
            body: Vec::new(),
            form: None,
        }
    }

    #[must_use]
    pub fn with_path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_params.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_query_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query_params.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase().as_str()), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a JSON body and the matching content type.
    #[must_use]
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_header("content-type", "application/json")
            .with_body(body.to_string())
    }

    /// Attach an already parsed multipart form.
    #[must_use]
    pub fn with_form(mut self, form: MultipartForm) -> Self {
        self.form = Some(form);
        self.with_header("content-type", "multipart/form-data")
    }
}

impl RawRequest for HttpRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    // Last write wins for duplicated names.
    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn multipart_form(&self) -> anyhow::Result<MultipartForm> {
        self.form
            .clone()
            .ok_or_else(|| anyhow!("request body is not a multipart form"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=hello%20world");
        assert_eq!(q.len(), 2);
        assert_eq!(q[1].1, "hello world");
        assert!(parse_query_params("/p").is_empty());
    }

    #[test]
    fn test_http_request_lookups() {
        let req = HttpRequest::new(Method::GET, "/users/get/abc?force=true&force=false")
            .with_path_param("id", "abc")
            .with_header("X-API-Key", "secret");
        assert_eq!(req.path(), "/users/get/abc");
        assert_eq!(req.path_param("id"), Some("abc"));
        assert_eq!(req.query_param("force"), Some("false"));
        assert_eq!(req.header("x-api-key"), Some("secret"));
        assert!(req.multipart_form().is_err());
    }

    #[test]
    fn test_multipart_form_lookups() {
        let form = MultipartForm::new()
            .with_value("request", "{}")
            .with_file("docs", FilePart::new("a.txt", "a"))
            .with_file("docs", FilePart::new("b.txt", "b"));
        assert_eq!(form.value("request"), Some("{}"));
        assert_eq!(form.file("docs").map(|f| f.filename.as_str()), Some("a.txt"));
        assert_eq!(form.files["docs"].len(), 2);
    }
}
