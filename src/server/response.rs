use super::request::HeaderVec;
use std::sync::Arc;

/// Write access to the outgoing response, implemented by the host server.
pub trait ResponseWriter {
    fn set_status(&mut self, status: u16);

    fn set_header(&mut self, name: &str, value: String);

    /// Append bytes to the response body
    fn write_body(&mut self, bytes: &[u8]);
}

/// Response collected in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedResponse {
    pub status: u16,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
        }
    }
}

impl BufferedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error when the body is not valid JSON.
    pub fn json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

impl ResponseWriter for BufferedResponse {
    fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    fn write_body(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = BufferedResponse::new();
        res.set_header("Content-Type", "text/plain".to_string());
        res.set_header("content-type", "application/json".to_string());
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_write_body_appends() {
        let mut res = BufferedResponse::new();
        res.write_body(b"{\"a\":");
        res.write_body(b"1}");
        assert_eq!(res.json().ok(), Some(serde_json::json!({"a": 1})));
    }
}
