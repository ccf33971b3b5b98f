//! Tracing setup

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

/// Default filter when neither the environment nor config set one
pub const DEFAULT_FILTER: &str = "formflow=warn";

/// Pick the filter directive: explicit filter, then verbose, then default
pub fn filter_directive(configured: Option<&str>, verbose: bool) -> String {
    match configured {
        Some(filter) if !filter.trim().is_empty() => filter.to_string(),
        _ if verbose => "formflow=debug".to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Initialize the global tracing subscriber, logging to stderr
pub fn init_tracing(configured: Option<&str>, verbose: bool) {
    TRACING_INIT.call_once(|| {
        let directive = filter_directive(configured, verbose);
        let filter = EnvFilter::try_new(&directive)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
