//! The workspace controller.
//!
//! Single entry point for everything the rest of the application does to
//! the workspace: open, close and activate tabs, and read the derived
//! index. Every mutation runs tree change, index rebuild and persist in
//! that order, and every operation degrades to a logged no-op instead of
//! failing outward.

use ledgerdock_routes::{Params, Route, RouteRegistry};

use crate::dock::index::{TabIndex, TabState};
use crate::dock::layout::{LayoutTree, NodeId, TabConfig, TabNode};
use crate::dock::persist::{self, SnapshotStore};

pub struct DockController {
    registry: RouteRegistry,
    store: Box<dyn SnapshotStore>,
    tree: LayoutTree,
    index: TabIndex,
    default_route: String,
}

impl DockController {
    /// Builds a controller from persisted state, falling back to a
    /// single-tab default layout (and clearing storage) when the
    /// snapshot is missing or unusable.
    pub fn restore(
        registry: RouteRegistry,
        store: Box<dyn SnapshotStore>,
        default_route: impl Into<String>,
    ) -> Self {
        let default_route = default_route.into();
        let tree = match persist::restore_tree(store.load()) {
            Some(tree) => tree,
            None => {
                store.clear();
                default_layout(&registry, &default_route)
            }
        };
        let index = TabIndex::rebuild(&tree, &registry);
        tracing::info!(tabs = index.len(), "workspace restored");
        Self {
            registry,
            store,
            tree,
            index,
            default_route,
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn default_route(&self) -> &str {
        &self.default_route
    }

    /// Opens a tab for a route path, or re-activates the existing tab
    /// when one with the same resolved path and params is already open.
    ///
    /// `path` may be a template (`/tasks/:id` plus params) or a concrete
    /// path (`/tasks/7`). Returns false, without changing anything, when
    /// no registered route matches.
    pub fn open_tab(&mut self, path: &str, params: Option<Params>, title: Option<&str>) -> bool {
        let (route, mut merged) = match self.match_route(path) {
            Some(hit) => hit,
            None => {
                tracing::warn!(path, "open_tab: no route matches");
                return false;
            }
        };
        if let Some(extra) = params {
            merged.extend(extra);
        }
        let resolved = if route.is_dynamic() {
            self.registry.resolve(&route.template, &merged)
        } else {
            route.template.clone()
        };

        if let Some(existing) = self
            .index
            .entries()
            .iter()
            .find(|tab| tab.path == resolved && tab.params == merged)
        {
            let id = existing.id.clone();
            tracing::debug!(path = %resolved, "open_tab: reusing open tab");
            return self.set_active_tab(&id);
        }

        let title = match title {
            Some(text) => text.to_string(),
            None if !route.title.is_empty() => route.title.clone(),
            None => "Untitled".to_string(),
        };
        let leaf = TabNode::new(
            title,
            TabConfig {
                template_path: route.template.clone(),
                params: merged,
                resolved_path: resolved,
            },
        );
        let container = self.tree.ensure_tabset();
        self.tree.append_leaf(&container, leaf);
        self.sync();
        true
    }

    /// Closes a tab by id. Unknown or stale ids are logged no-ops.
    pub fn close_tab(&mut self, id: &NodeId) -> bool {
        if !self.tree.remove_leaf(id) {
            return false;
        }
        self.sync();
        true
    }

    /// Makes a tab the active one. Unknown or stale ids are logged
    /// no-ops.
    pub fn set_active_tab(&mut self, id: &NodeId) -> bool {
        if !self.tree.select_leaf(id) {
            return false;
        }
        self.sync();
        true
    }

    pub fn get_active_tab(&self) -> Option<&TabState> {
        self.index.active()
    }

    pub fn get_all_tabs(&self) -> &[TabState] {
        self.index.entries()
    }

    pub fn index(&self) -> &TabIndex {
        &self.index
    }

    /// Exact template lookup first, then concrete matching against the
    /// dynamic templates, with extracted segment params.
    fn match_route(&self, path: &str) -> Option<(Route, Params)> {
        if let Some(route) = self.registry.lookup(path) {
            return Some((route.clone(), Params::new()));
        }
        self.registry
            .match_concrete(path)
            .map(|(route, extracted)| (route.clone(), extracted))
    }

    fn sync(&mut self) {
        self.index = TabIndex::rebuild(&self.tree, &self.registry);
        persist::save_tree(self.store.as_ref(), &self.tree);
    }
}

fn default_layout(registry: &RouteRegistry, default_route: &str) -> LayoutTree {
    let title = registry
        .lookup(default_route)
        .map(|route| route.title.clone())
        .unwrap_or_else(|| "Untitled".to_string());
    LayoutTree::single_tab(
        title,
        TabConfig {
            template_path: default_route.to_string(),
            params: Params::new(),
            resolved_path: default_route.to_string(),
        },
    )
}
