//! `formflow check` command - run a flow from an answers file
//!
//! Feeds each step the answers for its fields, exactly as if they had been
//! typed in, and stops at the first step that fails validation.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::cli::helpers::{load_registry, resolve_flow};
use crate::cli::output::{print_field_errors, print_result};
use crate::cli::GlobalOpts;
use crate::core::{Config, Stage, StepController};
use crate::schema::{FieldErrors, FlowDefinition, FormData};

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// YAML or JSON mapping of field name to answer
    pub answers: PathBuf,

    /// Flow to check against (default: configured default_flow, else "multistep")
    #[arg(long, short = 'n')]
    pub flow: Option<String>,

    /// Load the flow from a YAML file instead
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// How far a non-interactive run got
#[derive(Debug, PartialEq)]
pub enum CheckOutcome {
    /// Every step accepted; the accumulated data
    Completed(FormData),
    /// A step rejected its answers
    Rejected {
        step: usize,
        errors: FieldErrors,
    },
}

pub fn run(args: CheckArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut registry = load_registry(global, config)?;
    let flow = resolve_flow(
        &mut registry,
        args.flow.as_deref(),
        args.file.as_deref(),
        config,
    )?;
    let answers = read_answers(&args.answers)?;
    let format = global.format.resolve(config);

    for key in unknown_keys(&flow, &answers) {
        eprintln!(
            "{} '{}' is not a field of flow '{}' (ignored)",
            style("!").yellow(),
            key,
            flow.name
        );
    }

    let mut controller = StepController::new(flow);
    let outcome = drive(&mut controller, &answers, |stage| {
        if !global.quiet {
            if let Stage::Step(next) = stage {
                println!("{} Step {} accepted", style("✓").green(), next - 1);
            }
        }
    })?;

    match outcome {
        CheckOutcome::Completed(data) => {
            if !global.quiet {
                println!(
                    "{} All {} step(s) accepted",
                    style("✓").green(),
                    controller.flow().step_count()
                );
            }
            print_result(&data, format, global.quiet)
        }
        CheckOutcome::Rejected { step, errors } => {
            eprintln!(
                "{} Step {} rejected: {} field(s) failed validation",
                style("✗").red(),
                step,
                errors.len()
            );
            if let Some(schema) = controller.flow().schema_for(step) {
                print_field_errors(&errors, schema);
            }
            Err(miette::miette!("Step {} failed validation", step))
        }
    }
}

/// Parse the answers file; must be a mapping
pub fn read_answers(path: &Path) -> Result<FormData> {
    let content = std::fs::read_to_string(path).into_diagnostic()?;
    let value: Value = serde_yml::from_str(&content)
        .map_err(|e| miette::miette!("Failed to parse {}: {}", path.display(), e))?;

    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(FormData::new()),
        _ => Err(miette::miette!(
            "{} must contain a mapping of field name to answer",
            path.display()
        )),
    }
}

/// Answer keys that no step declares
pub fn unknown_keys<'a>(flow: &FlowDefinition, answers: &'a FormData) -> Vec<&'a str> {
    answers
        .keys()
        .filter(|k| flow.step_of(k).is_none())
        .map(String::as_str)
        .collect()
}

/// Submit every step with its answers until the result or a rejection
pub fn drive(
    controller: &mut StepController,
    answers: &FormData,
    mut on_advance: impl FnMut(Stage),
) -> Result<CheckOutcome> {
    while let Some(form) = controller.binder()? {
        let step = controller.state().current_step();

        let step_answers: FormData = answers
            .iter()
            .filter(|(k, _)| form.schema().contains(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut form = form.with_defaults(&step_answers).into_diagnostic()?;

        match controller.submit(&mut form).into_diagnostic()? {
            Some(stage) => on_advance(stage),
            None => {
                return Ok(CheckOutcome::Rejected {
                    step,
                    errors: form.errors().clone(),
                })
            }
        }
    }

    Ok(CheckOutcome::Completed(controller.accumulated().clone()))
}
