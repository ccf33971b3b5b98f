//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    check::CheckArgs, completions::CompletionsArgs, flows::FlowsCommands, run::RunArgs,
};
use crate::core::Config;

#[derive(Parser)]
#[command(name = "formflow")]
#[command(author, version, about = "Schema-validated forms in the terminal")]
#[command(long_about = "Fill in single-step and multi-step forms whose fields are validated against declarative schemas, then print the collected data.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format for collected data
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (debug logging to stderr)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Extra directory of flow definition files
    #[arg(long, global = true)]
    pub flows_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fill in a flow interactively
    Run(RunArgs),

    /// Run a flow non-interactively from an answers file
    Check(CheckArgs),

    /// Inspect available flows
    #[command(subcommand)]
    Flows(FlowsCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Use the configured default (json when unset)
    #[default]
    Auto,
    /// Pretty-printed JSON, 2-space indent
    Json,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// Resolve `Auto` against the configuration
    pub fn resolve(self, config: &Config) -> OutputFormat {
        match self {
            OutputFormat::Auto => match config
                .default_format
                .as_deref()
                .map(|f| f.to_ascii_lowercase())
                .as_deref()
            {
                Some("yaml") | Some("yml") => OutputFormat::Yaml,
                _ => OutputFormat::Json,
            },
            other => other,
        }
    }
}
