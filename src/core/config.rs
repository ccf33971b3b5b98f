//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Formflow configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format for the result dump (json or yaml)
    pub default_format: Option<String>,

    /// Directory of extra flow definition files
    pub flows_dir: Option<PathBuf>,

    /// Tracing filter directive, e.g. "formflow=debug"
    pub log_filter: Option<String>,

    /// Flow used by `formflow run` when none is named
    pub default_flow: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/formflow/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Environment variables
        config.apply_env(|key| std::env::var(key).ok());

        config
    }

    /// Read a config file, ignoring missing or malformed files
    pub fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        serde_yml::from_str::<Config>(&contents).ok()
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "formflow")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Override values from environment variables
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(format) = lookup("FORMFLOW_FORMAT") {
            self.default_format = Some(format);
        }
        if let Some(dir) = lookup("FORMFLOW_FLOWS_DIR") {
            self.flows_dir = Some(PathBuf::from(dir));
        }
        if let Some(filter) = lookup("FORMFLOW_LOG") {
            self.log_filter = Some(filter);
        }
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.flows_dir.is_some() {
            self.flows_dir = other.flows_dir;
        }
        if other.log_filter.is_some() {
            self.log_filter = other.log_filter;
        }
        if other.default_flow.is_some() {
            self.default_flow = other.default_flow;
        }
    }

    /// Flow to run when the command line names none
    pub fn default_flow(&self) -> &str {
        self.default_flow.as_deref().unwrap_or("multistep")
    }
}
