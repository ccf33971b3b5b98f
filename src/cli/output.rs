//! Result and error rendering

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::schema::{FieldErrors, FieldSchema, FormData};

/// Render collected data as a structured text dump
pub fn render_data(data: &FormData, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yml::to_string(data).into_diagnostic(),
        OutputFormat::Json | OutputFormat::Auto => {
            serde_json::to_string_pretty(&Value::Object(data.clone())).into_diagnostic()
        }
    }
}

/// Print the result view
pub fn print_result(data: &FormData, format: OutputFormat, quiet: bool) -> Result<()> {
    let rendered = render_data(data, format)?;
    if !quiet {
        println!();
        println!("{}", style("Result").bold());
    }
    println!("{}", rendered.trim_end());
    Ok(())
}

/// One line per message, in schema field order, using field labels
pub fn format_field_errors(errors: &FieldErrors, schema: &FieldSchema) -> Vec<String> {
    let mut lines = Vec::new();

    for field in &schema.fields {
        for message in errors.messages(&field.name) {
            lines.push(format!("{}: {}", field.display_label(), message));
        }
    }

    // errors not tied to a declared field
    for name in errors.fields().filter(|f| !schema.contains(f)) {
        for message in errors.messages(name) {
            lines.push(format!("{}: {}", name, message));
        }
    }

    lines
}

/// Print field errors to stderr
pub fn print_field_errors(errors: &FieldErrors, schema: &FieldSchema) {
    for line in format_field_errors(errors, schema) {
        eprintln!("  {} {}", style("✗").red(), line);
    }
}
