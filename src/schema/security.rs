use super::types::{SecurityRequirement, SecuritySchemeObject};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Where an API key is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

impl fmt::Display for ApiKeyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeyLocation::Header => write!(f, "header"),
            ApiKeyLocation::Query => write!(f, "query"),
            ApiKeyLocation::Cookie => write!(f, "cookie"),
        }
    }
}

/// Kind-specific parameters of an auth scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthKind {
    Basic,
    ApiKey {
        location: ApiKeyLocation,
        name: String,
    },
    OAuth2 {
        flow: String,
        authorization_url: String,
        token_url: String,
        scopes: BTreeMap<String, String>,
    },
}

/// Auth requirement declared on a route.
///
/// Declarations are documentation only; nothing is enforced at dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthScheme {
    pub name: String,
    pub description: String,
    /// Scopes this route requires
    pub scopes: Vec<String>,
    pub kind: AuthKind,
}

impl AuthScheme {
    pub fn basic(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scopes: Vec::new(),
            kind: AuthKind::Basic,
        }
    }

    pub fn api_key(
        name: impl Into<String>,
        location: ApiKeyLocation,
        key_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scopes: Vec::new(),
            kind: AuthKind::ApiKey {
                location,
                name: key_name.into(),
            },
        }
    }

    pub fn oauth2(
        name: impl Into<String>,
        flow: impl Into<String>,
        authorization_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            scopes: Vec::new(),
            kind: AuthKind::OAuth2 {
                flow: flow.into(),
                authorization_url: authorization_url.into(),
                token_url: token_url.into(),
                scopes: BTreeMap::new(),
            },
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a scope required by the route.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scopes.push(scope.into());
        self
    }

    /// Add a scope offered by an OAuth2 scheme. No effect on other kinds.
    #[must_use]
    pub fn with_oauth_scope(mut self, scope: impl Into<String>, description: impl Into<String>) -> Self {
        if let AuthKind::OAuth2 { scopes, .. } = &mut self.kind {
            scopes.insert(scope.into(), description.into());
        }
        self
    }

    /// The `securityDefinitions` entry.
    #[must_use]
    pub fn to_definition(&self) -> SecuritySchemeObject {
        let mut object = SecuritySchemeObject {
            scheme_type: String::new(),
            description: self.description.clone(),
            name: None,
            location: None,
            flow: None,
            authorization_url: None,
            token_url: None,
            scopes: None,
        };
        match &self.kind {
            AuthKind::Basic => object.scheme_type = "basic".to_string(),
            AuthKind::ApiKey { location, name } => {
                object.scheme_type = "apiKey".to_string();
                object.name = Some(name.clone());
                object.location = Some(location.to_string());
            }
            AuthKind::OAuth2 {
                flow,
                authorization_url,
                token_url,
                scopes,
            } => {
                object.scheme_type = "oauth2".to_string();
                object.flow = Some(flow.clone());
                object.authorization_url = Some(authorization_url.clone());
                object.token_url = Some(token_url.clone());
                object.scopes = Some(scopes.clone());
            }
        }
        object
    }

    /// Single-key requirement map for an operation's `security` list.
    #[must_use]
    pub fn requirement(&self) -> SecurityRequirement {
        BTreeMap::from([(self.name.clone(), self.scopes.clone())])
    }
}

/// Process-wide security definitions, merged by scheme name.
#[derive(Debug, Default)]
pub struct SecurityTable {
    schemes: BTreeMap<String, SecuritySchemeObject>,
}

impl SecurityTable {
    /// Record `scheme`; a later declaration under the same name replaces an
    /// earlier one.
    pub fn merge(&mut self, scheme: &AuthScheme) {
        let definition = scheme.to_definition();
        if let Some(previous) = self.schemes.get(&scheme.name) {
            if previous != &definition {
                warn!(
                    scheme = %scheme.name,
                    "auth scheme redeclared with different parameters; last declaration wins"
                );
            }
        }
        self.schemes.insert(scheme.name.clone(), definition);
    }

    #[must_use]
    pub fn into_definitions(self) -> BTreeMap<String, SecuritySchemeObject> {
        self.schemes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_key_definition() {
        let scheme = AuthScheme::api_key("token", ApiKeyLocation::Header, "X-Token")
            .with_description("session token");
        let v = serde_json::to_value(scheme.to_definition()).ok();
        assert_eq!(
            v,
            Some(json!({
                "type": "apiKey",
                "description": "session token",
                "name": "X-Token",
                "in": "header"
            }))
        );
    }

    #[test]
    fn test_oauth2_definition_and_requirement() {
        let scheme = AuthScheme::oauth2(
            "sso",
            "accessCode",
            "https://auth.example.com/authorize",
            "https://auth.example.com/token",
        )
        .with_oauth_scope("read", "read access")
        .with_scope("read");
        let v = serde_json::to_value(scheme.to_definition()).unwrap_or_default();
        assert_eq!(v["type"], "oauth2");
        assert_eq!(v["tokenUrl"], "https://auth.example.com/token");
        assert_eq!(v["scopes"]["read"], "read access");
        assert_eq!(
            scheme.requirement(),
            BTreeMap::from([("sso".to_string(), vec!["read".to_string()])])
        );
    }

    #[test]
    fn test_last_declaration_wins() {
        let mut table = SecurityTable::default();
        table.merge(&AuthScheme::api_key("key", ApiKeyLocation::Header, "X-Key"));
        table.merge(&AuthScheme::api_key("key", ApiKeyLocation::Query, "key"));
        let defs = table.into_definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs["key"].location.as_deref(), Some("query"));
    }
}
