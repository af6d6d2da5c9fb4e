//! The workspace layout tree.
//!
//! A layout is a tree of containers (`row`, `tabset`) with tab leaves.
//! Containers track which child is selected; the active tab is whatever
//! the selection chain from the root resolves to. All mutation entry
//! points take node ids, and an id that is no longer in the tree makes
//! the operation a logged no-op.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ledgerdock_routes::Params;

/// Opaque node identifier. Freshly generated ids are UUIDs, but ids read
/// back from a persisted snapshot are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::generate()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Declarative state of a tab leaf: which route template it was opened
/// from and with which parameters. Never holds live handles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TabConfig {
    pub template_path: String,
    pub params: Params,
    pub resolved_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TabNode {
    pub id: NodeId,
    pub title: String,
    pub config: TabConfig,
}

impl TabNode {
    pub fn new(title: impl Into<String>, config: TabConfig) -> Self {
        Self {
            id: NodeId::generate(),
            title: title.into(),
            config,
        }
    }
}

impl Default for TabNode {
    fn default() -> Self {
        Self {
            id: NodeId::generate(),
            title: String::new(),
            config: TabConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerNode {
    pub id: NodeId,
    pub weight: f64,
    pub selected: usize,
    pub children: Vec<LayoutNode>,
}

impl ContainerNode {
    pub fn new() -> Self {
        Self {
            id: NodeId::generate(),
            weight: 100.0,
            selected: 0,
            children: Vec::new(),
        }
    }

    pub fn with_children(children: Vec<LayoutNode>) -> Self {
        Self {
            children,
            ..Self::new()
        }
    }

    /// The selected child, if the selection pointer is in range.
    pub fn selected_child(&self) -> Option<&LayoutNode> {
        self.children.get(self.selected)
    }
}

impl Default for ContainerNode {
    fn default() -> Self {
        Self::new()
    }
}

/// One node of the layout tree. The serialized form is tagged by `type`,
/// matching the persisted snapshot schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutNode {
    Row(ContainerNode),
    Tabset(ContainerNode),
    Tab(TabNode),
}

impl LayoutNode {
    pub fn id(&self) -> &NodeId {
        match self {
            LayoutNode::Row(c) | LayoutNode::Tabset(c) => &c.id,
            LayoutNode::Tab(t) => &t.id,
        }
    }

    fn as_container_mut(&mut self) -> Option<&mut ContainerNode> {
        match self {
            LayoutNode::Row(c) | LayoutNode::Tabset(c) => Some(c),
            LayoutNode::Tab(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayoutTree {
    root: LayoutNode,
}

impl LayoutTree {
    pub fn new(root: LayoutNode) -> Self {
        Self { root }
    }

    /// The default shape: a root row holding one tabset with one tab.
    pub fn single_tab(title: impl Into<String>, config: TabConfig) -> Self {
        let tab = TabNode::new(title, config);
        let tabset = ContainerNode::with_children(vec![LayoutNode::Tab(tab)]);
        let root = ContainerNode::with_children(vec![LayoutNode::Tabset(tabset)]);
        Self {
            root: LayoutNode::Row(root),
        }
    }

    pub fn root(&self) -> &LayoutNode {
        &self.root
    }

    /// First tabset in depth-first order, the default insertion point for
    /// new tabs.
    pub fn find_first_tabset(&self) -> Option<NodeId> {
        first_tabset(&self.root).map(|c| c.id.clone())
    }

    /// Returns the id of the first tabset, creating one if the tree does
    /// not have any yet.
    pub fn ensure_tabset(&mut self) -> NodeId {
        if let Some(id) = self.find_first_tabset() {
            return id;
        }
        match &mut self.root {
            LayoutNode::Row(row) => {
                let tabset = ContainerNode::new();
                let id = tabset.id.clone();
                row.selected = row.children.len();
                row.children.push(LayoutNode::Tabset(tabset));
                id
            }
            // A bare leaf root gets wrapped so the new tab has a sibling slot.
            LayoutNode::Tab(_) => {
                let leaf = std::mem::replace(
                    &mut self.root,
                    LayoutNode::Row(ContainerNode::new()),
                );
                let tabset = ContainerNode::with_children(vec![leaf]);
                let id = tabset.id.clone();
                self.root = LayoutNode::Tabset(tabset);
                id
            }
            LayoutNode::Tabset(tabset) => tabset.id.clone(),
        }
    }

    /// Appends a leaf to the given container and selects it. Returns false
    /// if the container id is not in the tree.
    pub fn append_leaf(&mut self, container: &NodeId, leaf: TabNode) -> bool {
        match container_mut(&mut self.root, container) {
            Some(target) => {
                target.children.push(LayoutNode::Tab(leaf));
                target.selected = target.children.len() - 1;
                true
            }
            None => {
                tracing::debug!(container = %container, "append_leaf: unknown container id");
                false
            }
        }
    }

    /// Removes a tab leaf, repairing the parent's selection pointer so it
    /// stays in range and keeps pointing at the same sibling where
    /// possible. Returns false if the id is not a leaf in the tree.
    pub fn remove_leaf(&mut self, leaf: &NodeId) -> bool {
        let removed = match self.root.as_container_mut() {
            Some(root) => remove_from(root, leaf),
            None => false,
        };
        if !removed {
            tracing::debug!(leaf = %leaf, "remove_leaf: unknown tab id");
        }
        removed
    }

    /// Marks the leaf selected in every container on the path from the
    /// root, so the selection chain resolves to it. Returns false if the
    /// id is not a leaf in the tree.
    pub fn select_leaf(&mut self, leaf: &NodeId) -> bool {
        let selected = match &mut self.root {
            LayoutNode::Tab(tab) => &tab.id == leaf,
            LayoutNode::Row(c) | LayoutNode::Tabset(c) => select_path(c, leaf),
        };
        if !selected {
            tracing::debug!(leaf = %leaf, "select_leaf: unknown tab id");
        }
        selected
    }

    /// All tab leaves in depth-first order.
    pub fn leaves(&self) -> Vec<&TabNode> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &mut out);
        out
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Follows the selection chain from the root. None when the chain is
    /// broken (empty container or out-of-range pointer).
    pub fn selected_leaf(&self) -> Option<&TabNode> {
        follow_selection(&self.root)
    }
}

fn first_tabset(node: &LayoutNode) -> Option<&ContainerNode> {
    match node {
        LayoutNode::Tabset(c) => Some(c),
        LayoutNode::Row(c) => c.children.iter().find_map(first_tabset),
        LayoutNode::Tab(_) => None,
    }
}

fn container_mut<'a>(node: &'a mut LayoutNode, id: &NodeId) -> Option<&'a mut ContainerNode> {
    match node {
        LayoutNode::Row(c) | LayoutNode::Tabset(c) => {
            if &c.id == id {
                Some(c)
            } else {
                c.children.iter_mut().find_map(|child| container_mut(child, id))
            }
        }
        LayoutNode::Tab(_) => None,
    }
}

fn remove_from(container: &mut ContainerNode, id: &NodeId) -> bool {
    let position = container
        .children
        .iter()
        .position(|child| matches!(child, LayoutNode::Tab(tab) if &tab.id == id));
    if let Some(index) = position {
        container.children.remove(index);
        if container.children.is_empty() {
            container.selected = 0;
        } else if container.selected > index {
            container.selected -= 1;
        } else if container.selected >= container.children.len() {
            container.selected = container.children.len() - 1;
        }
        return true;
    }
    container.children.iter_mut().any(|child| match child {
        LayoutNode::Row(c) | LayoutNode::Tabset(c) => remove_from(c, id),
        LayoutNode::Tab(_) => false,
    })
}

fn select_path(container: &mut ContainerNode, id: &NodeId) -> bool {
    for index in 0..container.children.len() {
        let found = match &mut container.children[index] {
            LayoutNode::Tab(tab) => &tab.id == id,
            LayoutNode::Row(c) | LayoutNode::Tabset(c) => select_path(c, id),
        };
        if found {
            container.selected = index;
            return true;
        }
    }
    false
}

fn collect_leaves<'a>(node: &'a LayoutNode, out: &mut Vec<&'a TabNode>) {
    match node {
        LayoutNode::Tab(tab) => out.push(tab),
        LayoutNode::Row(c) | LayoutNode::Tabset(c) => {
            for child in &c.children {
                collect_leaves(child, out);
            }
        }
    }
}

fn follow_selection(node: &LayoutNode) -> Option<&TabNode> {
    match node {
        LayoutNode::Tab(tab) => Some(tab),
        LayoutNode::Row(c) | LayoutNode::Tabset(c) => {
            c.selected_child().and_then(follow_selection)
        }
    }
}
