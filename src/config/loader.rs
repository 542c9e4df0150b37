//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::routing::table::{RouteTable, TableError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Route table error: {0}")]
    Table(#[from] TableError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
///
/// Emits no log events; it runs before logging is initialized.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Freeze a validated configuration into a route table.
pub fn build_table(config: &RouterConfig) -> Result<RouteTable, ConfigError> {
    let mut definitions = Vec::with_capacity(config.routes.len());
    for route in &config.routes {
        let definition = route.to_definition().ok_or_else(|| {
            ConfigError::Validation(vec![ValidationError::AmbiguousTarget(route.path.clone())])
        })?;
        definitions.push(definition);
    }

    let table = RouteTable::new(definitions)?.with_max_redirects(config.resolution.max_redirect_hops);
    Ok(table)
}
