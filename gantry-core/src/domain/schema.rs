//! Plugin configuration schemas
//!
//! A schema is the backend's declarative description of one plugin's
//! configurable fields. The editor renders a form from it and validates
//! input against it; it never invents fields of its own.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Configuration schema for one plugin type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigSchema {
    #[serde(default)]
    pub fields: Vec<ConfigField>,
}

/// One configurable field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigField {
    /// Configuration key the committed value is stored under.
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
    /// Type-specific extras; SELECT fields keep their choices under an
    /// "options" key as `[{value, label}]` objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<HashMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRule>,
}

/// Field type tag, driving control choice and validation behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Password,
    Textarea,
    Select,
    MultiSelect,
    Json,
    Sql,
    FilePath,
    TableSelector,
    ColumnMapping,
}

/// Optional per-field validation bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regex the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Overrides the default error text for any rule in this set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_tags() {
        assert_eq!(
            serde_json::to_string(&FieldType::FilePath).unwrap(),
            "\"FILE_PATH\""
        );
        assert_eq!(
            serde_json::from_str::<FieldType>("\"COLUMN_MAPPING\"").unwrap(),
            FieldType::ColumnMapping
        );
        assert_eq!(serde_json::to_string(&FieldType::Sql).unwrap(), "\"SQL\"");
    }

    #[test]
    fn test_minimal_field_deserializes() {
        let field: ConfigField = serde_json::from_str(
            r#"{"name": "delimiter", "label": "Delimiter", "type": "STRING"}"#,
        )
        .unwrap();
        assert!(!field.required);
        assert!(field.validation.is_none());
    }
}
