//! Navigation menu derived from the route table.

use serde::Serialize;

use crate::routing::table::{IconRef, ResolvedRoute, RouteTable};

/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconRef>,
    pub active: bool,
}

/// Labeled view routes in declaration order. Redirects never appear.
pub fn menu_items(table: &RouteTable, active: Option<&ResolvedRoute>) -> Vec<MenuItem> {
    table
        .routes()
        .filter(|route| route.view_ref().is_some())
        .filter_map(|route| {
            let label = route.meta.label.clone()?;
            Some(MenuItem {
                path: route.path.clone(),
                name: route.name.clone(),
                label,
                icon: route.meta.icon.clone(),
                active: active.is_some_and(|a| a.path == route.path),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::table::{RouteDefinition, RouteMeta, ViewRef};

    #[test]
    fn test_menu_skips_redirects_and_unlabeled() {
        let table = RouteTable::new(vec![
            RouteDefinition::redirect("/", "/api").with_meta(RouteMeta::labeled("Home")),
            RouteDefinition::view("/api", ViewRef::new("Api"))
                .named("Api")
                .with_meta(RouteMeta::labeled("API客户端").with_icon(IconRef::new("icons/SendAlt.svg"))),
            RouteDefinition::view("/hidden", ViewRef::new("Hidden")),
            RouteDefinition::view("/settings", ViewRef::new("Settings")).with_meta(RouteMeta::labeled("设置")),
        ])
        .unwrap();

        let active = table.resolve("/").unwrap();
        let menu = menu_items(&table, Some(&active));

        let labels: Vec<_> = menu.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["API客户端", "设置"]);
        assert!(menu[0].active);
        assert!(!menu[1].active);
        assert_eq!(menu[0].icon, Some(IconRef::new("icons/SendAlt.svg")));

        assert!(menu_items(&table, None).iter().all(|m| !m.active));
    }
}
