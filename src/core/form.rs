//! Form binder - editable field state bound to one step schema
//!
//! The binder owns the current value of every field declared by a step,
//! validates them on submit and keeps the per-field errors of the last
//! attempt. Validation only runs at submit time.

use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::schema::field::{FieldKind, FieldSchema, FieldSpec};
use crate::schema::flow::FlowError;
use crate::schema::validator::{FieldErrors, FormData, StepValidator, ValidationResult};

/// Caller errors when driving a form
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Field '{field}' is not declared in this step (declared: {declared})")]
    UnknownField { field: String, declared: String },
}

/// Handle to a single registered field
#[derive(Debug)]
pub struct FieldBinding<'a> {
    spec: &'a FieldSpec,
    value: &'a mut Option<String>,
    error: Option<&'a str>,
}

impl<'a> FieldBinding<'a> {
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &FieldSpec {
        self.spec
    }

    /// Current value, `None` when unset
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Change handler
    pub fn set(&mut self, value: impl Into<String>) {
        *self.value = Some(value.into());
    }

    /// Unset the field
    pub fn clear(&mut self) {
        *self.value = None;
    }

    /// Error message from the last submit attempt
    pub fn error(&self) -> Option<&str> {
        self.error
    }
}

/// Editable state for one step
#[derive(Debug)]
pub struct FormBinder {
    validator: StepValidator,
    values: Vec<Option<String>>,
    errors: FieldErrors,
}

impl FormBinder {
    /// Bind a schema; `step` is used for error reporting only
    pub fn new(schema: FieldSchema, step: usize) -> Result<Self, FlowError> {
        let values = initial_values(&schema);
        let validator = StepValidator::new(schema, step)?;
        Ok(Self {
            validator,
            values,
            errors: FieldErrors::new(),
        })
    }

    /// Seed field values, e.g. from an answers file or previous input
    pub fn with_defaults(mut self, defaults: &FormData) -> Result<Self, FormError> {
        for (name, value) in defaults {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                other => other.to_string(),
            };
            self.register(name)?.set(text);
        }
        Ok(self)
    }

    pub fn schema(&self) -> &FieldSchema {
        self.validator.schema()
    }

    /// Bind a declared field
    pub fn register(&mut self, name: &str) -> Result<FieldBinding<'_>, FormError> {
        let schema = self.validator.schema();
        let index = schema
            .fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| FormError::UnknownField {
                field: name.to_string(),
                declared: schema.field_names().collect::<Vec<_>>().join(", "),
            })?;

        Ok(FieldBinding {
            spec: &schema.fields[index],
            value: &mut self.values[index],
            error: self.errors.get(name),
        })
    }

    /// Validate and, if every field passes, call `on_valid` once with the data
    ///
    /// Returns `None` when validation fails; the errors are then available
    /// through [`FormBinder::errors`] and each field's binding.
    pub fn handle_submit<T, F>(&mut self, on_valid: F) -> Option<T>
    where
        F: FnOnce(FormData) -> T,
    {
        match self.submit() {
            ValidationResult::Valid(data) => Some(on_valid(data)),
            ValidationResult::Invalid(_) => None,
        }
    }

    /// Validate current values, replacing the errors of the previous attempt
    pub fn submit(&mut self) -> ValidationResult {
        self.errors.clear();
        let result = self.validator.validate(&self.submitted_data());
        if let ValidationResult::Invalid(errors) = &result {
            trace!(fields = errors.len(), "submit rejected");
            self.errors = errors.clone();
        }
        result
    }

    /// Errors from the last submit attempt
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Snapshot of every set value
    pub fn watch(&self) -> FormData {
        self.schema()
            .fields
            .iter()
            .zip(&self.values)
            .filter_map(|(spec, value)| {
                value
                    .as_ref()
                    .map(|v| (spec.name.clone(), Value::String(v.clone())))
            })
            .collect()
    }

    /// Restore initial values and drop errors
    pub fn reset(&mut self) {
        self.values = initial_values(self.validator.schema());
        self.errors.clear();
    }

    /// Values as they are handed to validation; empty optional fields are omitted
    fn submitted_data(&self) -> FormData {
        let mut data = FormData::new();
        for (spec, value) in self.schema().fields.iter().zip(&self.values) {
            match value {
                Some(v) if v.is_empty() && !spec.required => {}
                Some(v) => {
                    data.insert(spec.name.clone(), Value::String(v.clone()));
                }
                None => {}
            }
        }
        data
    }
}

/// Text inputs start empty, selects start unset unless a default is given
fn initial_values(schema: &FieldSchema) -> Vec<Option<String>> {
    schema
        .fields
        .iter()
        .map(|f| match (&f.kind, &f.default) {
            (_, Some(default)) => Some(default.clone()),
            (FieldKind::String { .. }, None) => Some(String::new()),
            (FieldKind::Enum { .. }, None) => None,
        })
        .collect()
}
