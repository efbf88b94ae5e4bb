use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Prefix of every `$ref` into the document's definitions.
pub const DEFINITION_PREFIX: &str = "#/definitions/";

/// A schema fragment (Swagger 2.0 schema object subset).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl Schema {
    #[must_use]
    pub fn typed(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn formatted(schema_type: &str, format: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: Some(format.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn string() -> Self {
        Self::typed("string")
    }

    #[must_use]
    pub fn boolean() -> Self {
        Self::typed("boolean")
    }

    #[must_use]
    pub fn date_time() -> Self {
        Self::formatted("string", "date-time")
    }

    #[must_use]
    pub fn uuid() -> Self {
        Self::formatted("string", "uuid")
    }

    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// Object whose values all follow `value`.
    #[must_use]
    pub fn map(value: Schema) -> Self {
        Self {
            schema_type: Some("object".to_string()),
            additional_properties: Some(Box::new(value)),
            ..Self::default()
        }
    }

    /// Named object definition body.
    #[must_use]
    pub fn object(properties: BTreeMap<String, Schema>) -> Self {
        Self {
            schema_type: Some("object".to_string()),
            properties: Some(properties),
            ..Self::default()
        }
    }

    /// Reference to a definition by qualified name.
    #[must_use]
    pub fn reference(definition: &str) -> Self {
        Self {
            reference: Some(format!("{DEFINITION_PREFIX}{definition}")),
            ..Self::default()
        }
    }

    /// Union of the scalar types, used for untyped values.
    #[must_use]
    pub fn any_value() -> Self {
        Self {
            any_of: Some(vec![
                Self::string(),
                Self::typed("integer"),
                Self::typed("number"),
                Self::boolean(),
            ]),
            example: Some(Value::String("any value".to_string())),
            ..Self::default()
        }
    }

    /// Name of the referenced definition, if this fragment is a reference.
    #[must_use]
    pub fn referenced_definition(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|r| r.strip_prefix(DEFINITION_PREFIX))
    }
}

/// Named definitions, keyed by qualified type name.
pub type Definitions = BTreeMap<String, Schema>;

/// Document information block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Where a parameter is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterIn {
    Path,
    Query,
    Body,
    FormData,
}

/// Primitive items of a non-body array parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Items {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterIn,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Items>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Parameter {
    fn new(name: &str, location: ParameterIn) -> Self {
        Self {
            name: name.to_string(),
            location,
            param_type: None,
            required: false,
            items: None,
            schema: None,
            default: None,
        }
    }

    #[must_use]
    pub fn path(name: &str) -> Self {
        Self {
            param_type: Some("string".to_string()),
            required: true,
            ..Self::new(name, ParameterIn::Path)
        }
    }

    #[must_use]
    pub fn query(name: &str) -> Self {
        Self {
            param_type: Some("string".to_string()),
            ..Self::new(name, ParameterIn::Query)
        }
    }

    /// Whole-body parameter referencing a definition.
    #[must_use]
    pub fn body(name: &str, definition: &str) -> Self {
        Self {
            required: true,
            schema: Some(Schema::reference(definition)),
            ..Self::new(name, ParameterIn::Body)
        }
    }

    /// Single file upload.
    #[must_use]
    pub fn file(name: &str) -> Self {
        Self {
            param_type: Some("file".to_string()),
            ..Self::new(name, ParameterIn::FormData)
        }
    }

    /// Multi-file upload.
    #[must_use]
    pub fn files(name: &str) -> Self {
        Self {
            param_type: Some("array".to_string()),
            items: Some(Items {
                item_type: "string".to_string(),
                format: Some("binary".to_string()),
            }),
            ..Self::new(name, ParameterIn::FormData)
        }
    }

    /// Text form field carrying a JSON document, with a default value.
    #[must_use]
    pub fn form_value(name: &str, default: Value) -> Self {
        Self {
            param_type: Some("string".to_string()),
            default: Some(default),
            ..Self::new(name, ParameterIn::FormData)
        }
    }
}

/// A documented response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Security requirement: scheme name to required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// One documented operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, Response>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

impl Operation {
    /// Names of the parameters declared so far.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}

/// Operations of one path, by method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    /// Slot for `method`, or `None` for methods the document cannot express.
    pub fn slot_mut(&mut self, method: &http::Method) -> Option<&mut Option<Operation>> {
        match *method {
            http::Method::GET => Some(&mut self.get),
            http::Method::PUT => Some(&mut self.put),
            http::Method::POST => Some(&mut self.post),
            http::Method::DELETE => Some(&mut self.delete),
            http::Method::OPTIONS => Some(&mut self.options),
            http::Method::HEAD => Some(&mut self.head),
            http::Method::PATCH => Some(&mut self.patch),
            _ => None,
        }
    }

    #[must_use]
    pub fn operation(&self, method: &http::Method) -> Option<&Operation> {
        match *method {
            http::Method::GET => self.get.as_ref(),
            http::Method::PUT => self.put.as_ref(),
            http::Method::POST => self.post.as_ref(),
            http::Method::DELETE => self.delete.as_ref(),
            http::Method::OPTIONS => self.options.as_ref(),
            http::Method::HEAD => self.head.as_ref(),
            http::Method::PATCH => self.patch.as_ref(),
            _ => None,
        }
    }
}

/// Security scheme as it appears in `securityDefinitions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecuritySchemeObject {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<BTreeMap<String, String>>,
}

/// The emitted API document (Swagger 2.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Document format version, always `2.0`
    pub swagger: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default)]
    pub definitions: Definitions,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_definitions: BTreeMap<String, SecuritySchemeObject>,
}

impl Document {
    #[must_use]
    pub fn new(info: Info) -> Self {
        Self {
            swagger: "2.0".to_string(),
            info,
            host: None,
            base_path: None,
            paths: BTreeMap::new(),
            definitions: Definitions::new(),
            security_definitions: BTreeMap::new(),
        }
    }

    /// Operation registered for `method` on the normalised `path`.
    #[must_use]
    pub fn operation(&self, path: &str, method: &http::Method) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.operation(method))
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// YAML rendition.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}
