//! Schema system - field schemas, flows, validation and the interactive wizard

pub mod field;
pub mod flow;
pub mod registry;
pub mod validator;
pub mod wizard;

pub use field::{FieldKind, FieldSchema, FieldSpec, StringFormat};
pub use flow::{FlowDefinition, FlowError};
pub use registry::FlowRegistry;
pub use validator::{FieldErrors, FormData, StepValidator, ValidationResult};
pub use wizard::{FieldPrompter, SchemaWizard, WizardOutcome};
