//! Derived view of the layout tree.
//!
//! The index is never mutated in place. After every tree mutation it is
//! rebuilt by a full traversal, so it cannot drift from the tree it
//! describes. Leaves whose template no longer resolves against the route
//! registry are skipped rather than surfaced as broken entries.

use serde::Serialize;

use ledgerdock_routes::{Params, RouteRegistry};

use crate::dock::layout::{LayoutTree, NodeId};

/// One open tab as the rest of the application sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TabState {
    pub id: NodeId,
    pub path: String,
    pub title: String,
    pub params: Params,
}

#[derive(Debug, Clone, Default)]
pub struct TabIndex {
    entries: Vec<TabState>,
    active: Option<NodeId>,
}

impl TabIndex {
    /// Rebuilds the index from a full traversal of the tree.
    ///
    /// The active id is taken from the tree's selection chain; a broken
    /// chain falls back to the first indexed tab, and an empty layout has
    /// no active tab.
    pub fn rebuild(tree: &LayoutTree, registry: &RouteRegistry) -> Self {
        let mut entries = Vec::new();
        for leaf in tree.leaves() {
            let Some(route) = registry.lookup(&leaf.config.template_path) else {
                tracing::debug!(
                    template = %leaf.config.template_path,
                    "skipping tab whose route is no longer registered"
                );
                continue;
            };
            let path = registry.resolve(&route.template, &leaf.config.params);
            let title = if !leaf.title.is_empty() {
                leaf.title.clone()
            } else if !route.title.is_empty() {
                route.title.clone()
            } else {
                "Untitled".to_string()
            };
            entries.push(TabState {
                id: leaf.id.clone(),
                path,
                title,
                params: leaf.config.params.clone(),
            });
        }
        let active = tree
            .selected_leaf()
            .map(|leaf| leaf.id.clone())
            .filter(|id| entries.iter().any(|entry| &entry.id == id))
            .or_else(|| entries.first().map(|entry| entry.id.clone()));
        Self { entries, active }
    }

    pub fn entries(&self) -> &[TabState] {
        &self.entries
    }

    pub fn get(&self, id: &NodeId) -> Option<&TabState> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn position(&self, id: &NodeId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.get(id).is_some()
    }

    pub fn active_id(&self) -> Option<&NodeId> {
        self.active.as_ref()
    }

    pub fn active(&self) -> Option<&TabState> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::layout::{ContainerNode, LayoutNode, LayoutTree, TabConfig, TabNode};

    fn leaf(template: &str, params: &[(&str, &str)]) -> TabNode {
        let params: Params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let resolved = template.to_string();
        TabNode::new(
            String::new(),
            TabConfig {
                template_path: template.to_string(),
                params,
                resolved_path: resolved,
            },
        )
    }

    fn tree_of(leaves: Vec<TabNode>) -> LayoutTree {
        let tabset = ContainerNode::with_children(
            leaves.into_iter().map(LayoutNode::Tab).collect(),
        );
        LayoutTree::new(LayoutNode::Tabset(tabset))
    }

    #[test]
    fn rebuild_lists_leaves_in_tree_order() {
        let registry = RouteRegistry::ledgerdock_default();
        let tree = tree_of(vec![leaf("/home", &[]), leaf("/accounts", &[])]);
        let index = TabIndex::rebuild(&tree, &registry);
        assert_eq!(index.len(), 2);
        assert_eq!(index.entries()[0].path, "/home");
        assert_eq!(index.entries()[1].path, "/accounts");
    }

    #[test]
    fn rebuild_resolves_paths_and_registry_titles() {
        let registry = RouteRegistry::ledgerdock_default();
        let tree = tree_of(vec![leaf("/clients/:id/profile", &[("id", "42")])]);
        let index = TabIndex::rebuild(&tree, &registry);
        assert_eq!(index.entries()[0].path, "/clients/42/profile");
        assert_eq!(index.entries()[0].title, "Client Profile");
    }

    #[test]
    fn stored_titles_win_over_registry_titles() {
        let registry = RouteRegistry::ledgerdock_default();
        let mut named = leaf("/home", &[]);
        named.title = "My desk".to_string();
        let index = TabIndex::rebuild(&tree_of(vec![named]), &registry);
        assert_eq!(index.entries()[0].title, "My desk");
    }

    #[test]
    fn unregistered_templates_are_skipped() {
        let registry = RouteRegistry::ledgerdock_default();
        let tree = tree_of(vec![leaf("/legacy/report", &[]), leaf("/home", &[])]);
        let index = TabIndex::rebuild(&tree, &registry);
        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].path, "/home");
    }

    #[test]
    fn active_falls_back_to_the_first_tab_when_the_chain_breaks() {
        let registry = RouteRegistry::ledgerdock_default();
        let mut tabset = ContainerNode::with_children(vec![
            LayoutNode::Tab(leaf("/home", &[])),
            LayoutNode::Tab(leaf("/accounts", &[])),
        ]);
        tabset.selected = 9;
        let tree = LayoutTree::new(LayoutNode::Tabset(tabset));
        let index = TabIndex::rebuild(&tree, &registry);
        assert_eq!(index.active().map(|t| t.path.as_str()), Some("/home"));
    }

    #[test]
    fn active_skips_selected_leaves_that_were_not_indexed() {
        let registry = RouteRegistry::ledgerdock_default();
        let mut tabset = ContainerNode::with_children(vec![
            LayoutNode::Tab(leaf("/home", &[])),
            LayoutNode::Tab(leaf("/legacy/report", &[])),
        ]);
        tabset.selected = 1;
        let tree = LayoutTree::new(LayoutNode::Tabset(tabset));
        let index = TabIndex::rebuild(&tree, &registry);
        assert_eq!(index.len(), 1);
        assert_eq!(index.active().map(|t| t.path.as_str()), Some("/home"));
    }

    #[test]
    fn an_empty_layout_has_no_active_tab() {
        let registry = RouteRegistry::ledgerdock_default();
        let tree = LayoutTree::new(LayoutNode::Tabset(ContainerNode::new()));
        let index = TabIndex::rebuild(&tree, &registry);
        assert!(index.is_empty());
        assert!(index.active_id().is_none());
    }
}
