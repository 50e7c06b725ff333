//! Schema-driven configuration forms
//!
//! Turns a plugin's [`ConfigSchema`] plus a node's current configuration
//! into editable field descriptors, validates edited values, and hands the
//! committed values back as the node's configuration map.

use gantry_core::domain::pipeline::Node;
use gantry_core::domain::schema::{ConfigField, ConfigSchema, FieldType, ValidationRule};
use regex::Regex;
use serde_json::{Value, json};
use std::collections::HashMap;

use crate::error::FieldError;

/// The kind of control a field renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    /// Single-line text input.
    Text,
    /// Single-line input with obscured echo.
    MaskedText,
    /// Multi-line text area.
    MultilineText,
    /// Numeric input.
    NumericInput,
    /// Boolean toggle.
    Toggle,
    /// Single choice from the field's declared options.
    SingleSelect,
    /// Multi-line text holding serialized structured data; structural
    /// validation is the consumer's responsibility.
    StructuredText,
}

/// The fixed type-tag-to-control table.
///
/// MULTI_SELECT and TABLE_SELECTOR have no dedicated control and fall back
/// to single-line text, as does any future tag routed through them.
pub fn control_for(field_type: FieldType) -> ControlKind {
    match field_type {
        FieldType::String | FieldType::FilePath => ControlKind::Text,
        FieldType::Password => ControlKind::MaskedText,
        FieldType::Textarea | FieldType::Sql => ControlKind::MultilineText,
        FieldType::Number | FieldType::Integer => ControlKind::NumericInput,
        FieldType::Boolean => ControlKind::Toggle,
        FieldType::Select => ControlKind::SingleSelect,
        FieldType::Json | FieldType::ColumnMapping => ControlKind::StructuredText,
        FieldType::MultiSelect | FieldType::TableSelector => ControlKind::Text,
    }
}

/// One choice of a SELECT field.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}

/// Declared choices of a SELECT field, read from its options map.
pub fn select_options(field: &ConfigField) -> Vec<SelectOption> {
    let Some(items) = field
        .options
        .as_ref()
        .and_then(|o| o.get("options"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let value = item.get("value")?.clone();
            let label = item
                .get("label")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| value_text(&value));
            Some(SelectOption { value, label })
        })
        .collect()
}

/// An editable field descriptor handed to the view layer.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub field_type: FieldType,
    pub control: ControlKind,
    pub required: bool,
    pub options: Vec<SelectOption>,
    /// Initial value: current config, else schema default, else a
    /// type-appropriate empty value.
    pub value: Value,
}

/// A full form for one node: display-name pseudo-field plus schema fields.
#[derive(Debug, Clone)]
pub struct FormBinding {
    /// Bound outside the schema; never part of the configuration map.
    pub display_name: String,
    pub fields: Vec<FormField>,
}

/// Bind a schema against a node's current configuration.
pub fn bind(schema: &ConfigSchema, node: &Node) -> FormBinding {
    let fields = schema
        .fields
        .iter()
        .map(|field| FormField {
            name: field.name.clone(),
            label: field.label.clone(),
            description: field.description.clone(),
            field_type: field.field_type,
            control: control_for(field.field_type),
            required: field.required,
            options: select_options(field),
            value: node
                .config
                .get(&field.name)
                .or(field.default_value.as_ref())
                .cloned()
                .unwrap_or_else(|| empty_value(field.field_type)),
        })
        .collect();

    FormBinding {
        display_name: node.name.clone(),
        fields,
    }
}

fn empty_value(field_type: FieldType) -> Value {
    match control_for(field_type) {
        ControlKind::NumericInput => json!(0),
        ControlKind::Toggle => json!(false),
        _ => json!(""),
    }
}

/// Validate edited values against the schema.
///
/// Returns the clean configuration map, or every field-level error found.
/// Nothing is ever partially applied.
pub fn validate(
    schema: &ConfigSchema,
    values: &HashMap<String, Value>,
) -> Result<HashMap<String, Value>, Vec<FieldError>> {
    let mut errors = Vec::new();
    let mut clean = HashMap::new();

    for field in &schema.fields {
        let value = values.get(&field.name).filter(|v| !is_blank(v));

        let Some(value) = value else {
            if field.required && control_for(field.field_type) != ControlKind::Toggle {
                errors.push(FieldError::new(
                    &field.name,
                    format!("{} is required", field.label),
                ));
            }
            continue;
        };

        match check_field(field, value) {
            Ok(()) => {
                clean.insert(field.name.clone(), value.clone());
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() { Ok(clean) } else { Err(errors) }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

fn check_field(field: &ConfigField, value: &Value) -> Result<(), FieldError> {
    match control_for(field.field_type) {
        ControlKind::NumericInput => {
            let Some(number) = value.as_f64() else {
                return Err(default_error(field, "must be a number"));
            };
            if field.field_type == FieldType::Integer && number.fract() != 0.0 {
                return Err(default_error(field, "must be a whole number"));
            }
        }
        ControlKind::Toggle => {
            if !value.is_boolean() {
                return Err(default_error(field, "must be a boolean"));
            }
        }
        ControlKind::SingleSelect => {
            let options = select_options(field);
            if !options.iter().any(|o| o.value == *value) {
                return Err(default_error(field, "is not one of the allowed values"));
            }
        }
        ControlKind::Text
        | ControlKind::MaskedText
        | ControlKind::MultilineText
        | ControlKind::StructuredText => {
            if !value.is_string() {
                return Err(default_error(field, "must be a string"));
            }
        }
    }

    if let Some(rule) = &field.validation {
        check_rule(field, rule, value)?;
    }
    Ok(())
}

fn check_rule(field: &ConfigField, rule: &ValidationRule, value: &Value) -> Result<(), FieldError> {
    if let Some(text) = value.as_str() {
        let length = text.chars().count() as u32;
        if let Some(min) = rule.min_length {
            if length < min {
                return Err(rule_error(field, &format!("must be at least {min} characters")));
            }
        }
        if let Some(max) = rule.max_length {
            if length > max {
                return Err(rule_error(field, &format!("must be at most {max} characters")));
            }
        }
        if let Some(pattern) = &rule.pattern {
            let Ok(re) = Regex::new(pattern) else {
                return Err(rule_error(field, "has an invalid validation pattern"));
            };
            if !re.is_match(text) {
                return Err(rule_error(field, "does not match the expected format"));
            }
        }
    }

    if let Some(number) = value.as_f64() {
        if let Some(min) = rule.min {
            if number < min {
                return Err(rule_error(field, &format!("must be at least {min}")));
            }
        }
        if let Some(max) = rule.max {
            if number > max {
                return Err(rule_error(field, &format!("must be at most {max}")));
            }
        }
    }

    Ok(())
}

fn default_error(field: &ConfigField, suffix: &str) -> FieldError {
    FieldError::new(&field.name, format!("{} {}", field.label, suffix))
}

/// Build a rule-failure error, preferring the rule's custom message.
fn rule_error(field: &ConfigField, default_suffix: &str) -> FieldError {
    let message = field
        .validation
        .as_ref()
        .and_then(|r| r.message.clone())
        .unwrap_or_else(|| format!("{} {}", field.label, default_suffix));
    FieldError::new(&field.name, message)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
