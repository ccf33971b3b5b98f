//! Core module - form state, step sequencing and ambient setup

pub mod config;
pub mod form;
pub mod logging;
pub mod step;

pub use config::Config;
pub use form::{FieldBinding, FormBinder, FormError};
pub use step::{Stage, StepController, StepError, StepState, Transition};
