//! Step validation with per-field error reporting
//!
//! Each step schema is compiled to a JSON Schema document and evaluated with
//! `jsonschema`. Every violation is collected and attributed to the field it
//! concerns, so a single submit reports all broken constraints at once.

use jsonschema::{error::ValidationErrorKind, ValidationError as JsonSchemaError, Validator as JsonValidator};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::schema::field::{FieldKind, FieldSchema, StringFormat};
use crate::schema::flow::FlowError;

/// Field name to value, in collection order
pub type FormData = Map<String, Value>;

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a field, skipping exact duplicates
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let message = message.into();
        let entry = self.errors.entry(field.into()).or_default();
        if !entry.contains(&message) {
            entry.push(message);
        }
    }

    /// First message for a field
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|m| m.first())
            .map(String::as_str)
    }

    /// All messages for a field
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Names of the fields with errors
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    /// Number of fields with errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

/// Outcome of validating one submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Values accepted, restricted to the step's declared fields
    Valid(FormData),
    /// At least one field violated a constraint
    Invalid(FieldErrors),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    pub fn errors(&self) -> Option<&FieldErrors> {
        match self {
            ValidationResult::Valid(_) => None,
            ValidationResult::Invalid(errors) => Some(errors),
        }
    }
}

/// Validator for a single step schema
pub struct StepValidator {
    schema: FieldSchema,
    compiled: JsonValidator,
}

impl std::fmt::Debug for StepValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepValidator")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

impl StepValidator {
    /// Compile a step schema; `step` is only used for error reporting
    pub fn new(schema: FieldSchema, step: usize) -> Result<Self, FlowError> {
        let document = schema.to_json_schema();
        let compiled = jsonschema::options()
            .should_validate_formats(true)
            .with_format("email", is_email)
            .build(&document)
            .map_err(|e| FlowError::Schema {
                step,
                message: e.to_string(),
            })?;

        Ok(Self { schema, compiled })
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Validate a set of field values against the step schema
    pub fn validate(&self, data: &FormData) -> ValidationResult {
        let instance = Value::Object(data.clone());

        let mut errors = FieldErrors::new();
        for error in self.compiled.iter_errors(&instance) {
            let field = error_field(&error);
            let message = self.format_error(field.as_deref(), &error);
            errors.insert(field.unwrap_or_else(|| "_form".to_string()), message);
        }

        if !errors.is_empty() {
            return ValidationResult::Invalid(errors);
        }

        // Keep only declared fields, in schema order
        let mut accepted = FormData::new();
        for name in self.schema.field_names() {
            if let Some(value) = data.get(name) {
                accepted.insert(name.to_string(), value.clone());
            }
        }
        ValidationResult::Valid(accepted)
    }

    /// Turn a JSON Schema error into a field-level message
    fn format_error(&self, field: Option<&str>, error: &JsonSchemaError) -> String {
        match &error.kind {
            ValidationErrorKind::Required { .. } => "Required".to_string(),
            ValidationErrorKind::MinLength { limit } => {
                format!("Too short: must contain at least {} character(s)", limit)
            }
            ValidationErrorKind::MaxLength { limit } => {
                format!("Too long: must contain at most {} character(s)", limit)
            }
            ValidationErrorKind::Enum { options } => {
                format!(
                    "Invalid value '{}': expected one of {}",
                    value_text(error.instance.as_ref()),
                    format_enum_options(options)
                )
            }
            ValidationErrorKind::Format { .. } => {
                let spec = field.and_then(|f| self.schema.get(f));
                match spec.map(|s| &s.kind) {
                    Some(FieldKind::String {
                        format: Some(StringFormat::Email),
                        ..
                    }) => "Invalid email".to_string(),
                    _ => "Invalid format".to_string(),
                }
            }
            ValidationErrorKind::Type { kind } => {
                format!("Wrong type: expected {:?}", kind)
            }
            _ => error.to_string(),
        }
    }
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Email check used for the `email` format
///
/// Plain dotted domains with an alphabetic TLD of two or more letters only;
/// quoted local parts, IP literals and single-label hosts are rejected. The
/// local part may not start with a dot and the address may not contain `..`.
pub fn is_email(value: &str) -> bool {
    !value.starts_with('.') && !value.contains("..") && EMAIL_PATTERN.is_match(value)
}

/// Field an error belongs to, from the `required` property or the instance path
fn error_field(error: &JsonSchemaError) -> Option<String> {
    if let ValidationErrorKind::Required { property } = &error.kind {
        return Some(
            property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string()),
        );
    }

    let path = error.instance_path.to_string();
    path.trim_start_matches('/')
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
}

/// Format enum options as a string
fn format_enum_options(options: &Value) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

fn value_text(value: &Value) -> String {
    value
        .as_str()
        .map(|s| s.to_string())
        .unwrap_or_else(|| value.to_string())
}
