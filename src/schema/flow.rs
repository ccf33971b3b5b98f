//! Flow definitions - the ordered set of step schemas

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::schema::field::{FieldKind, FieldSchema};

/// Errors for malformed or unknown flow definitions
#[derive(Debug, Error, Diagnostic)]
pub enum FlowError {
    #[error("Unknown flow: {name}")]
    #[diagnostic(
        code(formflow::flow::unknown),
        help("Run 'formflow flows list' to see available flows")
    )]
    UnknownFlow { name: String },

    #[error("Flow '{flow}' has no steps")]
    #[diagnostic(code(formflow::flow::empty))]
    NoSteps { flow: String },

    #[error("Flow '{flow}' step {step}: field '{field}' is declared more than once")]
    #[diagnostic(code(formflow::flow::duplicate_field))]
    DuplicateField {
        flow: String,
        step: usize,
        field: String,
    },

    #[error("Flow '{flow}': field '{field}' appears in step {first} and step {second}")]
    #[diagnostic(
        code(formflow::flow::field_collision),
        help("Field names must be unique across the whole flow so collected data does not collide")
    )]
    FieldCollision {
        flow: String,
        field: String,
        first: usize,
        second: usize,
    },

    #[error("Flow '{flow}' step {step}: field '{field}' {reason}")]
    #[diagnostic(code(formflow::flow::invalid_field))]
    InvalidField {
        flow: String,
        step: usize,
        field: String,
        reason: String,
    },

    #[error("Failed to parse flow file {path}: {message}")]
    #[diagnostic(
        code(formflow::flow::parse),
        help("Check YAML syntax - proper indentation, colons, quotes")
    )]
    Parse { path: String, message: String },

    #[error("Failed to compile schema for step {step}: {message}")]
    #[diagnostic(code(formflow::flow::schema))]
    Schema { step: usize, message: String },

    #[error("IO error: {0}")]
    #[diagnostic(code(formflow::flow::io))]
    Io(#[from] std::io::Error),
}

/// A named, ordered sequence of step schemas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub name: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub steps: Vec<FieldSchema>,
}

impl FlowDefinition {
    pub fn new(name: impl Into<String>, title: impl Into<String>, steps: Vec<FieldSchema>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            steps,
        }
    }

    /// Parse a flow from YAML text
    pub fn from_yaml(source: &str, path: &str) -> Result<Self, FlowError> {
        let flow: FlowDefinition = serde_yml::from_str(source).map_err(|e| FlowError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        flow.validate_definition()?;
        Ok(flow)
    }

    /// Number of input steps (N); the result state is N + 1
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Schema for a 1-based step index, `None` past the last step
    pub fn schema_for(&self, step: usize) -> Option<&FieldSchema> {
        step.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// Step number that owns the given field
    pub fn step_of(&self, field: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| s.contains(field))
            .map(|i| i + 1)
    }

    /// Every field name in collection order
    pub fn all_fields(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().flat_map(|s| s.field_names())
    }

    /// Check the definition is internally consistent
    pub fn validate_definition(&self) -> Result<(), FlowError> {
        if self.steps.is_empty() {
            return Err(FlowError::NoSteps {
                flow: self.name.clone(),
            });
        }

        let mut owner: Vec<(&str, usize)> = Vec::new();

        for (idx, schema) in self.steps.iter().enumerate() {
            let step = idx + 1;
            let mut seen = HashSet::new();

            for field in &schema.fields {
                let invalid = |reason: &str| FlowError::InvalidField {
                    flow: self.name.clone(),
                    step,
                    field: field.name.clone(),
                    reason: reason.to_string(),
                };

                if field.name.trim().is_empty() {
                    return Err(invalid("has an empty name"));
                }

                if !seen.insert(field.name.as_str()) {
                    return Err(FlowError::DuplicateField {
                        flow: self.name.clone(),
                        step,
                        field: field.name.clone(),
                    });
                }

                if let Some((_, first)) = owner.iter().find(|(n, _)| *n == field.name) {
                    return Err(FlowError::FieldCollision {
                        flow: self.name.clone(),
                        field: field.name.clone(),
                        first: *first,
                        second: step,
                    });
                }
                owner.push((field.name.as_str(), step));

                match &field.kind {
                    FieldKind::String {
                        min_length: Some(min),
                        max_length: Some(max),
                        ..
                    } if min > max => {
                        return Err(invalid("has min_length greater than max_length"));
                    }
                    FieldKind::Enum { values } if values.is_empty() => {
                        return Err(invalid("has an empty set of values"));
                    }
                    FieldKind::Enum { values } => {
                        if let Some(default) = &field.default {
                            if !values.contains(default) {
                                return Err(invalid("has a default outside its values"));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}
