//! # Contract Configuration
//!
//! Document metadata and the failure status used when rendering errors.
//!
//! Values come from a YAML (or JSON) file, then environment variables override
//! individual fields:
//!
//! | Variable | Field | Default |
//! |---|---|---|
//! | `ROUTECONTRACT_TITLE` | `title` | `Portal API` |
//! | `ROUTECONTRACT_VERSION` | `version` | `1.0` |
//! | `ROUTECONTRACT_DESCRIPTION` | `description` | empty |
//! | `ROUTECONTRACT_HOST` | `host` | unset |
//! | `ROUTECONTRACT_BASE_PATH` | `base_path` | unset |
//! | `ROUTECONTRACT_FAILURE_STATUS` | `failure_status` | `500` |
//!
//! ```yaml
//! title: Users API
//! version: "2.1"
//! host: api.example.com
//! base_path: /v2
//! ```

use crate::schema::Info;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::warn;

/// Status used for every failure response unless configured otherwise.
pub const DEFAULT_FAILURE_STATUS: u16 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    pub title: String,
    pub version: String,
    pub description: String,
    pub host: Option<String>,
    pub base_path: Option<String>,
    /// Status of failure responses (binding errors, handler errors, cancellation)
    pub failure_status: u16,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            title: "Portal API".to_string(),
            version: "1.0".to_string(),
            description: String::new(),
            host: None,
            base_path: None,
            failure_status: DEFAULT_FAILURE_STATUS,
        }
    }
}

impl ContractConfig {
    /// Load from a YAML or JSON file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(config.with_env_overrides())
    }

    /// Defaults with environment overrides.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`, keyed by environment variable name.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(title) = lookup("ROUTECONTRACT_TITLE") {
            self.title = title;
        }
        if let Some(version) = lookup("ROUTECONTRACT_VERSION") {
            self.version = version;
        }
        if let Some(description) = lookup("ROUTECONTRACT_DESCRIPTION") {
            self.description = description;
        }
        if let Some(host) = lookup("ROUTECONTRACT_HOST") {
            self.host = Some(host);
        }
        if let Some(base_path) = lookup("ROUTECONTRACT_BASE_PATH") {
            self.base_path = Some(base_path);
        }
        if let Some(status) = lookup("ROUTECONTRACT_FAILURE_STATUS") {
            match status.parse::<u16>() {
                Ok(s) if (400..=599).contains(&s) => self.failure_status = s,
                _ => warn!(value = %status, "ignoring invalid ROUTECONTRACT_FAILURE_STATUS"),
            }
        }
        self
    }

    #[must_use]
    pub fn info(&self) -> Info {
        Info {
            title: self.title.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ContractConfig::default();
        assert_eq!(config.title, "Portal API");
        assert_eq!(config.failure_status, 500);
    }

    #[test]
    fn test_overrides() {
        let vars = HashMap::from([
            ("ROUTECONTRACT_TITLE", "Users"),
            ("ROUTECONTRACT_BASE_PATH", "/api"),
            ("ROUTECONTRACT_FAILURE_STATUS", "422"),
        ]);
        let config = ContractConfig::default()
            .with_overrides(|k| vars.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.title, "Users");
        assert_eq!(config.base_path.as_deref(), Some("/api"));
        assert_eq!(config.failure_status, 422);
    }

    #[test]
    fn test_invalid_failure_status_is_ignored() {
        let config = ContractConfig::default().with_overrides(|k| {
            (k == "ROUTECONTRACT_FAILURE_STATUS").then(|| "200".to_string())
        });
        assert_eq!(config.failure_status, 500);
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = match tempfile::Builder::new().suffix(".yaml").tempfile() {
            Ok(f) => f,
            Err(e) => panic!("tempfile: {e}"),
        };
        let written = writeln!(file, "title: Users API\nversion: \"2.1\"\nhost: api.example.com");
        assert!(written.is_ok());
        let config = ContractConfig::load(file.path()).ok();
        assert_eq!(config.as_ref().map(|c| c.title.as_str()), Some("Users API"));
        assert_eq!(config.as_ref().map(|c| c.version.as_str()), Some("2.1"));
        assert_eq!(
            config.and_then(|c| c.host),
            Some("api.example.com".to_string())
        );
    }
}
