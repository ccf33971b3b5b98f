//! CLI command implementations

pub mod check;
pub mod completions;
pub mod flows;
pub mod run;
