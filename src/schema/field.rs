//! Field and step schemas
//!
//! A `FieldSchema` describes the shape of one step: an ordered list of named
//! fields, each with a kind and its constraints. Schemas are plain data and
//! can be written in Rust with the builder methods or deserialized from YAML.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Named string formats understood by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringFormat {
    Email,
}

impl StringFormat {
    /// JSON Schema `format` keyword value
    pub fn as_str(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
        }
    }
}

/// Field kind with its constraints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    String {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<StringFormat>,
    },
    Enum {
        values: Vec<String>,
    },
}

impl FieldKind {
    /// Short human description, e.g. `string (3..=20)` or `enum [US, UK]`
    pub fn describe(&self) -> String {
        match self {
            FieldKind::String {
                min_length,
                max_length,
                format,
            } => {
                let mut out = match format {
                    Some(f) => format!("string ({})", f.as_str()),
                    None => "string".to_string(),
                };
                match (min_length, max_length) {
                    (Some(min), Some(max)) => out.push_str(&format!(" {}..={}", min, max)),
                    (Some(min), None) => out.push_str(&format!(" >={}", min)),
                    (None, Some(max)) => out.push_str(&format!(" <={}", max)),
                    (None, None) => {}
                }
                out
            }
            FieldKind::Enum { values } => format!("enum [{}]", values.join(", ")),
        }
    }
}

fn default_true() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

/// A single field of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Rendered as a text area rather than a single-line input
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub multiline: bool,

    #[serde(default = "default_true", skip_serializing_if = "is_true")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldSpec {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: None,
            placeholder: None,
            multiline: false,
            required: true,
            default: None,
            kind,
        }
    }

    /// Unconstrained string field
    pub fn string(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::String {
                min_length: None,
                max_length: None,
                format: None,
            },
        )
    }

    /// String field that must be a valid email address
    pub fn email(name: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::String {
                min_length: None,
                max_length: None,
                format: Some(StringFormat::Email),
            },
        )
    }

    /// Field whose value must be one of `values`
    pub fn enumeration<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_kind(
            name,
            FieldKind::Enum {
                values: values.into_iter().map(Into::into).collect(),
            },
        )
    }

    pub fn min_length(mut self, limit: u64) -> Self {
        if let FieldKind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(limit);
        }
        self
    }

    pub fn max_length(mut self, limit: u64) -> Self {
        if let FieldKind::String { max_length, .. } = &mut self.kind {
            *max_length = Some(limit);
        }
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Label for display, falling back to the field name
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Is this an enumerated field
    pub fn is_enum(&self) -> bool {
        matches!(self.kind, FieldKind::Enum { .. })
    }

    /// JSON Schema fragment for this field's value
    pub fn to_json_schema(&self) -> Value {
        match &self.kind {
            FieldKind::String {
                min_length,
                max_length,
                format,
            } => {
                let mut prop = Map::new();
                prop.insert("type".to_string(), json!("string"));
                if let Some(min) = min_length {
                    prop.insert("minLength".to_string(), json!(min));
                }
                if let Some(max) = max_length {
                    prop.insert("maxLength".to_string(), json!(max));
                }
                if let Some(f) = format {
                    prop.insert("format".to_string(), json!(f.as_str()));
                }
                Value::Object(prop)
            }
            FieldKind::Enum { values } => json!({ "enum": values }),
        }
    }
}

/// Schema for one step of a flow
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Text of the submit button ("Next", "Submit")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_label: Option<String>,

    pub fields: Vec<FieldSpec>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self {
            title: None,
            submit_label: None,
            fields,
        }
    }

    /// Append a field
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = Some(label.into());
        self
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Compile the step into a JSON Schema object document
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            properties.insert(field.name.clone(), field.to_json_schema());
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}
