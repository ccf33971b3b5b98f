//! Shared helper functions for CLI commands
//!
//! Flow lookup and small formatting utilities used by more than one command.

use miette::Result;
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::Config;
use crate::schema::{FlowDefinition, FlowRegistry};

/// Built-in flows plus flows from the configured and command-line directories
pub fn load_registry(global: &GlobalOpts, config: &Config) -> Result<FlowRegistry> {
    let mut registry = FlowRegistry::builtin();

    for dir in [config.flows_dir.as_deref(), global.flows_dir.as_deref()]
        .into_iter()
        .flatten()
    {
        if dir.is_dir() {
            registry.load_dir(dir)?;
        } else {
            tracing::warn!(dir = %dir.display(), "flows directory not found");
        }
    }

    Ok(registry)
}

/// Pick the flow to use: an explicit file, then a name, then the configured default
pub fn resolve_flow(
    registry: &mut FlowRegistry,
    name: Option<&str>,
    file: Option<&Path>,
    config: &Config,
) -> Result<FlowDefinition> {
    let name = match file {
        Some(path) => registry.load_file(path)?,
        None => name.unwrap_or_else(|| config.default_flow()).to_string(),
    };
    Ok(registry.get(&name)?.clone())
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
