//! Formflow: schema-validated forms in the terminal
//!
//! Flows are ordered lists of step schemas. A `FormBinder` holds the field
//! values of one step and validates them on submit; a `StepController`
//! moves forward through the steps, merging each step's validated data,
//! until the terminal result state.

pub mod cli;
pub mod core;
pub mod schema;
