//! `formflow run` command - fill in a flow interactively

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{load_registry, resolve_flow};
use crate::cli::output::print_result;
use crate::cli::GlobalOpts;
use crate::core::{Config, StepController};
use crate::schema::wizard::{DialoguerPrompter, SchemaWizard};

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Flow to run (default: configured default_flow, else "multistep")
    pub flow: Option<String>,

    /// Load the flow from a YAML file instead
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Exit after the result instead of offering a restart
    #[arg(long)]
    pub once: bool,
}

pub fn run(args: RunArgs, global: &GlobalOpts, config: &Config) -> Result<()> {
    let mut registry = load_registry(global, config)?;
    let flow = resolve_flow(
        &mut registry,
        args.flow.as_deref(),
        args.file.as_deref(),
        config,
    )?;
    let format = global.format.resolve(config);

    let mut controller = StepController::new(flow);
    let mut wizard = SchemaWizard::new(DialoguerPrompter::new())
        .quiet(global.quiet)
        .show_watch(global.verbose);

    wizard.run_session(&mut controller, args.once, |outcome| {
        print_result(&outcome.data, format, global.quiet)
    })?;

    Ok(())
}
