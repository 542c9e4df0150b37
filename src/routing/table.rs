//! Route table: immutable, ordered registry of route definitions.
//!
//! # Responsibilities
//! - Store route definitions in declaration order
//! - Exact-match lookup by path and by name
//! - Follow redirect chains to a renderable route
//!
//! # Design Decisions
//! - Exact string matching only, no patterns or parameters
//! - Duplicate and dangling entries rejected at construction
//! - Redirect walks are bounded and detect revisits, so a cyclic table
//!   yields `RedirectLoop` instead of hanging

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on redirect hops during a single resolution.
pub const DEFAULT_MAX_REDIRECTS: usize = 16;

/// Opaque reference to the view rendered for a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ViewRef(pub String);

impl ViewRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle to a renderable icon resource.
///
/// The router never interprets it; a rendering layer resolves it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct IconRef(pub String);

impl IconRef {
    pub fn new(resource: impl Into<String>) -> Self {
        Self(resource.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Display metadata attached to a route, consumed by navigation chrome.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RouteMeta {
    /// Menu label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Menu icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconRef>,

    /// Any other keys declared on the route.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl RouteMeta {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn with_icon(mut self, icon: IconRef) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

/// What a route leads to.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteTarget {
    /// Render this view.
    View(ViewRef),
    /// Continue resolution at this path.
    Redirect(String),
}

/// One entry in the route table.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDefinition {
    pub path: String,
    pub name: Option<String>,
    pub target: RouteTarget,
    pub meta: RouteMeta,
}

impl RouteDefinition {
    /// A route rendering `view` at `path`.
    pub fn view(path: impl Into<String>, view: ViewRef) -> Self {
        Self {
            path: path.into(),
            name: None,
            target: RouteTarget::View(view),
            meta: RouteMeta::default(),
        }
    }

    /// A route redirecting `path` to `to`.
    pub fn redirect(path: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: None,
            target: RouteTarget::Redirect(to.into()),
            meta: RouteMeta::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::Redirect(to) => Some(to.as_str()),
            RouteTarget::View(_) => None,
        }
    }

    pub fn view_ref(&self) -> Option<&ViewRef> {
        match &self.target {
            RouteTarget::View(view) => Some(view),
            RouteTarget::Redirect(_) => None,
        }
    }
}

/// A route reached by resolution: always renderable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRoute {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub view: ViewRef,
    pub meta: RouteMeta,
}

/// A resolved route together with the redirecting paths walked to reach it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub route: ResolvedRoute,
    /// Paths that redirected, in the order they were visited.
    pub redirects: Vec<String>,
}

/// Errors produced while resolving a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No entry matches the path reached after following redirects.
    #[error("no route matches {path}")]
    NotFound { path: String },

    /// The redirect chain revisited a path or exceeded the hop bound.
    #[error("redirect loop starting at {path}: {}", .chain.join(" -> "))]
    RedirectLoop { path: String, chain: Vec<String> },
}

impl ResolveError {
    pub fn kind(&self) -> &'static str {
        match self {
            ResolveError::NotFound { .. } => "not_found",
            ResolveError::RedirectLoop { .. } => "redirect_loop",
        }
    }
}

/// Errors detected while constructing a table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("duplicate route path {0}")]
    DuplicatePath(String),

    #[error("duplicate route name {0}")]
    DuplicateName(String),

    #[error("invalid route path {0:?}: must start with '/'")]
    InvalidPath(String),

    #[error("route {from} redirects to unknown path {to}")]
    DanglingRedirect { from: String, to: String },
}

/// Immutable, ordered registry of routes.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    by_path: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    max_redirects: usize,
}

impl RouteTable {
    /// Build a table, rejecting duplicates, invalid paths and dangling redirects.
    pub fn new(routes: Vec<RouteDefinition>) -> Result<Self, TableError> {
        let mut by_path = HashMap::with_capacity(routes.len());
        let mut by_name = HashMap::new();

        for (index, route) in routes.iter().enumerate() {
            if !route.path.starts_with('/') {
                return Err(TableError::InvalidPath(route.path.clone()));
            }
            if by_path.insert(route.path.clone(), index).is_some() {
                return Err(TableError::DuplicatePath(route.path.clone()));
            }
            if let Some(name) = &route.name {
                if by_name.insert(name.clone(), index).is_some() {
                    return Err(TableError::DuplicateName(name.clone()));
                }
            }
        }

        for route in &routes {
            if let Some(to) = route.redirect_target() {
                if !by_path.contains_key(to) {
                    return Err(TableError::DanglingRedirect {
                        from: route.path.clone(),
                        to: to.to_string(),
                    });
                }
            }
        }

        tracing::debug!(routes = routes.len(), "Route table built");

        Ok(Self {
            routes,
            by_path,
            by_name,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        })
    }

    /// Override the redirect hop bound.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Exact-match lookup.
    pub fn lookup(&self, path: &str) -> Result<&RouteDefinition, ResolveError> {
        self.by_path
            .get(path)
            .map(|&index| &self.routes[index])
            .ok_or_else(|| ResolveError::NotFound {
                path: path.to_string(),
            })
    }

    pub fn lookup_name(&self, name: &str) -> Option<&RouteDefinition> {
        self.by_name.get(name).map(|&index| &self.routes[index])
    }

    /// Path registered under `name`.
    pub fn path_for(&self, name: &str) -> Option<&str> {
        self.lookup_name(name).map(|route| route.path.as_str())
    }

    /// Follow redirects from `path` to a renderable route.
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute, ResolveError> {
        self.trace(path).map(|resolution| resolution.route)
    }

    /// Like [`RouteTable::resolve`], also reporting the redirect hops taken.
    pub fn trace(&self, path: &str) -> Result<Resolution, ResolveError> {
        let mut redirects: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut current = path;

        loop {
            let route = self.lookup(current)?;

            let to = match &route.target {
                RouteTarget::View(view) => {
                    return Ok(Resolution {
                        route: ResolvedRoute {
                            path: route.path.clone(),
                            name: route.name.clone(),
                            view: view.clone(),
                            meta: route.meta.clone(),
                        },
                        redirects,
                    });
                }
                RouteTarget::Redirect(to) => to.as_str(),
            };

            // Revisit or too many hops: the table is cyclic.
            if !seen.insert(current) || redirects.len() >= self.max_redirects {
                redirects.push(current.to_string());
                return Err(ResolveError::RedirectLoop {
                    path: path.to_string(),
                    chain: redirects,
                });
            }

            redirects.push(current.to_string());
            current = to;
        }
    }

    /// Routes in declaration order.
    pub fn routes(&self) -> impl Iterator<Item = &RouteDefinition> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_table() -> RouteTable {
        RouteTable::new(vec![
            RouteDefinition::redirect("/", "/api"),
            RouteDefinition::view("/api", ViewRef::new("Api"))
                .named("Api")
                .with_meta(RouteMeta::labeled("API客户端").with_icon(IconRef::new("icons/SendAlt.svg"))),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = api_table();
        assert!(table.lookup("/api").is_ok());
        assert!(matches!(table.lookup("/api/"), Err(ResolveError::NotFound { .. })));
        assert!(matches!(table.lookup("/API"), Err(ResolveError::NotFound { .. })));
    }

    #[test]
    fn test_root_redirects_to_api() {
        let table = api_table();
        let root = table.resolve("/").unwrap();
        assert_eq!(root, table.resolve("/api").unwrap());
        assert_eq!(root.path, "/api");
        assert_eq!(root.meta.label.as_deref(), Some("API客户端"));

        let traced = table.trace("/").unwrap();
        assert_eq!(traced.redirects, vec!["/".to_string()]);
        assert!(table.trace("/api").unwrap().redirects.is_empty());
    }

    #[test]
    fn test_unknown_path_not_found() {
        let table = api_table();
        for path in ["/unknown", "", "api", "/api?x=1"] {
            assert_eq!(
                table.resolve(path),
                Err(ResolveError::NotFound { path: path.to_string() })
            );
        }
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let table = api_table();
        assert_eq!(table.resolve("/"), table.resolve("/"));
        assert_eq!(table.resolve("/nope"), table.resolve("/nope"));
    }

    #[test]
    fn test_redirect_cycle_detected() {
        let table = RouteTable::new(vec![
            RouteDefinition::redirect("/a", "/b"),
            RouteDefinition::redirect("/b", "/a"),
        ])
        .unwrap();

        match table.resolve("/a") {
            Err(ResolveError::RedirectLoop { path, chain }) => {
                assert_eq!(path, "/a");
                assert_eq!(chain, vec!["/a", "/b", "/a"]);
            }
            other => panic!("expected redirect loop, got {:?}", other),
        }
    }

    #[test]
    fn test_self_redirect_detected() {
        let table = RouteTable::new(vec![RouteDefinition::redirect("/", "/")]).unwrap();
        assert!(matches!(table.resolve("/"), Err(ResolveError::RedirectLoop { .. })));
    }

    #[test]
    fn test_hop_bound() {
        let table = RouteTable::new(vec![
            RouteDefinition::redirect("/1", "/2"),
            RouteDefinition::redirect("/2", "/3"),
            RouteDefinition::redirect("/3", "/4"),
            RouteDefinition::view("/4", ViewRef::new("Four")),
        ])
        .unwrap();

        assert_eq!(table.trace("/1").unwrap().redirects.len(), 3);

        let bounded = table.with_max_redirects(2);
        assert!(matches!(bounded.resolve("/1"), Err(ResolveError::RedirectLoop { .. })));
        assert!(bounded.resolve("/2").is_ok());
    }

    #[test]
    fn test_construction_rejects_malformed_tables() {
        let dup = RouteTable::new(vec![
            RouteDefinition::view("/a", ViewRef::new("A")),
            RouteDefinition::view("/a", ViewRef::new("B")),
        ]);
        assert_eq!(dup.unwrap_err(), TableError::DuplicatePath("/a".into()));

        let dup_name = RouteTable::new(vec![
            RouteDefinition::view("/a", ViewRef::new("A")).named("X"),
            RouteDefinition::view("/b", ViewRef::new("B")).named("X"),
        ]);
        assert_eq!(dup_name.unwrap_err(), TableError::DuplicateName("X".into()));

        let dangling = RouteTable::new(vec![RouteDefinition::redirect("/", "/missing")]);
        assert_eq!(
            dangling.unwrap_err(),
            TableError::DanglingRedirect { from: "/".into(), to: "/missing".into() }
        );

        let relative = RouteTable::new(vec![RouteDefinition::view("api", ViewRef::new("Api"))]);
        assert_eq!(relative.unwrap_err(), TableError::InvalidPath("api".into()));
    }

    #[test]
    fn test_named_lookup() {
        let table = api_table();
        assert_eq!(table.path_for("Api"), Some("/api"));
        assert!(table.lookup_name("Missing").is_none());
        let order: Vec<_> = table.routes().map(|r| r.path.as_str()).collect();
        assert_eq!(order, vec!["/", "/api"]);
    }
}
