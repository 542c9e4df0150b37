//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (redirects point at declared paths)
//! - Detect redirect cycles and a missing or unresolvable root
//! - Validate value ranges (hop bound > 0, base path absolute)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::config::schema::RouterConfig;

/// Path every table must declare.
pub const ROOT_PATH: &str = "/";

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route path {0:?} must start with '/'")]
    InvalidPath(String),

    #[error("route {0} must declare exactly one of `component` or `redirect`")]
    AmbiguousTarget(String),

    #[error("duplicate route path {0}")]
    DuplicatePath(String),

    #[error("duplicate route name {0}")]
    DuplicateName(String),

    #[error("route {from} redirects to unknown path {to}")]
    DanglingRedirect { from: String, to: String },

    #[error("redirect cycle: {}", .0.join(" -> "))]
    RedirectCycle(Vec<String>),

    #[error("no root route (\"/\") declared")]
    MissingRoot,

    #[error("root route does not resolve to a view")]
    UnresolvableRoot,

    #[error("resolution.max_redirect_hops must be greater than 0")]
    ZeroRedirectHops,

    #[error("history.base {0:?} must start with '/'")]
    InvalidBase(String),
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.history.base.starts_with('/') {
        errors.push(ValidationError::InvalidBase(config.history.base.clone()));
    }
    if config.resolution.max_redirect_hops == 0 {
        errors.push(ValidationError::ZeroRedirectHops);
    }

    let mut redirects: HashMap<&str, &str> = HashMap::new();
    let mut paths: HashSet<&str> = HashSet::new();
    let mut names: HashSet<&str> = HashSet::new();

    for route in &config.routes {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath(route.path.clone()));
        }
        if route.component.is_some() == route.redirect.is_some() {
            errors.push(ValidationError::AmbiguousTarget(route.path.clone()));
        }
        if !paths.insert(&route.path) {
            errors.push(ValidationError::DuplicatePath(route.path.clone()));
        }
        if let Some(name) = &route.name {
            if !names.insert(name) {
                errors.push(ValidationError::DuplicateName(name.clone()));
            }
        }
        if let (Some(to), None) = (&route.redirect, &route.component) {
            redirects.insert(&route.path, to);
        }
    }

    for route in &config.routes {
        if let Some(to) = &route.redirect {
            if !paths.contains(to.as_str()) {
                errors.push(ValidationError::DanglingRedirect {
                    from: route.path.clone(),
                    to: to.clone(),
                });
            }
        }
    }

    let mut reported: HashSet<&str> = HashSet::new();
    for route in &config.routes {
        if let Some(cycle) = find_cycle(&route.path, &redirects) {
            // Report each cycle once, however many routes lead into it.
            if cycle[..cycle.len() - 1].iter().all(|&p| reported.insert(p)) {
                errors.push(ValidationError::RedirectCycle(
                    cycle.iter().map(|p| p.to_string()).collect(),
                ));
            }
        }
    }

    if !paths.contains(ROOT_PATH) {
        errors.push(ValidationError::MissingRoot);
    } else if !root_resolves(&redirects, &paths) {
        errors.push(ValidationError::UnresolvableRoot);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The cycle reachable from `start`, closed with its first path repeated.
fn find_cycle<'a>(start: &'a str, redirects: &HashMap<&'a str, &'a str>) -> Option<Vec<&'a str>> {
    let mut chain: Vec<&str> = vec![start];
    let mut current = start;

    while let Some(&next) = redirects.get(current) {
        if let Some(pos) = chain.iter().position(|&p| p == next) {
            let mut cycle = chain.split_off(pos);
            cycle.push(next);
            return Some(cycle);
        }
        chain.push(next);
        current = next;
    }
    None
}

fn root_resolves(redirects: &HashMap<&str, &str>, paths: &HashSet<&str>) -> bool {
    let mut seen = HashSet::new();
    let mut current = ROOT_PATH;

    while let Some(&next) = redirects.get(current) {
        if !paths.contains(next) || !seen.insert(current) {
            return false;
        }
        current = next;
    }
    true
}
