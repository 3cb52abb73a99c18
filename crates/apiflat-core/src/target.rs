//! Target document model: URI-template path keys → named request/response variants
//!
//! These types are the output of the transformation engine. Optional fields
//! are omitted from the serialized form instead of appearing as `null`.

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version marker written to the `openapi` field unless configured otherwise.
pub const TARGET_VERSION: &str = "4.0.0";

/// Root of the converted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TargetDocument {
    /// Version marker literal
    pub openapi: String,
    /// Info object, serialized as-is from the source
    #[serde(default)]
    pub info: Value,
    /// Present only when the source declares servers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Value>>,
    /// Present only when the source declares tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Value>,
    /// Path key → path entry
    #[serde(default)]
    pub paths: IndexMap<String, PathEntry>,
    /// Present only when the source declares components
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Document-level vendor extensions, emitted as top-level siblings
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl TargetDocument {
    /// Convert to a plain JSON value.
    ///
    /// Flattened extension entries are written after the structural fields,
    /// so an extension sharing a field's name replaces that field.
    ///
    /// # Errors
    ///
    /// Returns error if a contained value cannot be represented as JSON.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Components container, created on first use.
    pub fn components_mut(&mut self) -> &mut Components {
        self.components.get_or_insert_with(Components::default)
    }
}

/// All requests sharing one URL path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path-level path/query parameters shared by every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_schema: Option<ParameterSchema>,
    /// Request key → request entry
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub requests: IndexMap<String, RequestEntry>,
}

/// JSON-Schema object describing a set of parameters.
///
/// `required` and `allOf` only appear once something has been added to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSchema {
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Referenced parameters, left for the schema consumer to resolve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<Value>>,
}

impl Default for ParameterSchema {
    fn default() -> Self {
        Self::object()
    }
}

impl ParameterSchema {
    /// Empty `object` schema.
    #[must_use]
    pub fn object() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: IndexMap::new(),
            required: None,
            all_of: None,
        }
    }

    /// Add an inline parameter as a property.
    pub fn add_property(&mut self, name: &str, schema: Value, required: bool) {
        self.properties.insert(name.to_string(), schema);
        if required {
            let list = self.required.get_or_insert_with(Vec::new);
            if !list.iter().any(|n| n == name) {
                list.push(name.to_string());
            }
        }
    }

    /// Append a referenced parameter to `allOf`.
    pub fn add_reference(&mut self, reference: Value) {
        self.all_of.get_or_insert_with(Vec::new).push(reference);
    }
}

/// One synthesized operation variant, scoped to at most one request content type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Lowercase HTTP method
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_schema: Option<ParameterSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_schema: Option<Value>,
    /// A single requirement object, or an array when all requirements are kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_documentation: Option<Value>,
    /// Response key → response entry
    #[serde(default)]
    pub responses: IndexMap<String, ResponseEntry>,
    /// Operation-level vendor extensions
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

/// One response variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEntry {
    /// Literal status code, `"default"` when the source has none
    pub status_code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_schema: Option<Value>,
}

/// Reusable definitions. Each map appears once something is stored in it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_bodies: Option<IndexMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<IndexMap<String, Value>>,
}

/// Generate JSON Schema for the target document.
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(TargetDocument);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
