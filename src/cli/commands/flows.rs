//! `formflow flows` command - flow introspection
//!
//! Lists the available flows and shows the fields and constraints of each
//! step, or the compiled JSON Schema documents with `--raw`.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::Value;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{load_registry, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::schema::{FlowDefinition, FlowRegistry};

#[derive(Subcommand, Debug)]
pub enum FlowsCommands {
    /// List all available flows
    List,

    /// Show the steps and fields of a flow
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Flow name (multistep, single, ...)
    pub name: String,

    /// Print the JSON Schema of every step instead of a summary
    #[arg(long)]
    pub raw: bool,
}

pub fn run(cmd: FlowsCommands, global: &GlobalOpts, config: &Config) -> Result<()> {
    let registry = load_registry(global, config)?;
    match cmd {
        FlowsCommands::List => {
            print!("{}", list_table(&registry));
            if !global.quiet {
                println!("\nUse 'formflow flows show <name>' for field details");
            }
            Ok(())
        }
        FlowsCommands::Show(args) => {
            let flow = registry.get(&args.name)?;
            if args.raw {
                println!("{}", raw_schemas(flow)?);
            } else {
                print!("{}", describe_flow(flow));
            }
            Ok(())
        }
    }
}

/// Markdown table of every flow
fn list_table(registry: &FlowRegistry) -> String {
    let mut builder = Builder::default();
    builder.push_record(["NAME", "TITLE", "STEPS", "FIELDS"]);

    for flow in registry.iter() {
        builder.push_record([
            flow.name.clone(),
            truncate_str(&flow.title, 30),
            flow.step_count().to_string(),
            flow.all_fields().count().to_string(),
        ]);
    }

    let mut out = builder.build().with(Style::markdown()).to_string();
    out.push('\n');
    out
}

/// Human summary of a flow's steps and fields
fn describe_flow(flow: &FlowDefinition) -> String {
    let mut out = String::new();

    out.push_str(&format!("{}\n", style(&flow.title).bold()));
    out.push_str(&format!("{}\n", "=".repeat(flow.title.chars().count())));
    if let Some(ref desc) = flow.description {
        out.push_str(&format!("{}\n", desc));
    }

    for (idx, step) in flow.steps.iter().enumerate() {
        let title = step
            .title
            .as_deref()
            .map(|t| format!(": {}", t))
            .unwrap_or_default();
        out.push_str(&format!("\nStep {}{}\n", idx + 1, title));

        for field in &step.fields {
            let marker = if field.required { "*" } else { " " };
            let mut line = format!(
                "  {}{:<14} {}",
                marker,
                field.name,
                field.kind.describe()
            );
            if let Some(ref default) = field.default {
                line.push_str(&format!(" (default: {})", default));
            }
            out.push_str(&line);
            out.push('\n');
        }
    }

    out.push_str(&format!("\n{}\n", style("* = required").dim()));
    out
}

/// JSON array of the compiled schema of each step
fn raw_schemas(flow: &FlowDefinition) -> Result<String> {
    let docs: Vec<Value> = flow.steps.iter().map(|s| s.to_json_schema()).collect();
    serde_json::to_string_pretty(&docs).into_diagnostic()
}
