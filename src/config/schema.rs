//! Configuration schema definitions.
//!
//! This module defines the static configuration the router is built from.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::table::{RouteDefinition, RouteMeta, RouteTarget, ViewRef, DEFAULT_MAX_REDIRECTS};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// History mode settings.
    pub history: HistoryConfig,

    /// Redirect resolution settings.
    pub resolution: ResolutionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, in declaration order.
    pub routes: Vec<RouteConfig>,
}

/// History mode configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Base path the application is served under (e.g., "/" or "/app/").
    pub base: String,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            base: "/".to_string(),
        }
    }
}

/// Redirect resolution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Maximum redirect hops before a resolution is treated as a loop.
    pub max_redirect_hops: usize,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_redirect_hops: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// A single route entry as declared in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RouteConfig {
    /// URL path, matched exactly.
    pub path: String,

    /// Stable route identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Path to continue resolution at. Excludes `component`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,

    /// View rendered when this route is active. Excludes `redirect`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,

    /// Navigation chrome metadata.
    #[serde(default)]
    pub meta: RouteMeta,
}

impl RouteConfig {
    /// Convert to a table entry. `None` when the entry is neither a view nor
    /// a redirect, or is both; validation reports those.
    pub fn to_definition(&self) -> Option<RouteDefinition> {
        let target = match (&self.component, &self.redirect) {
            (Some(component), None) => RouteTarget::View(ViewRef::new(component.clone())),
            (None, Some(to)) => RouteTarget::Redirect(to.clone()),
            _ => return None,
        };

        Some(RouteDefinition {
            path: self.path.clone(),
            name: self.name.clone(),
            target,
            meta: self.meta.clone(),
        })
    }
}
