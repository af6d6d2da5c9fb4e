//! The dockable workspace: layout tree, persistence, derived tab index
//! and the controller facade over all three.

pub mod controller;
pub mod index;
pub mod layout;
pub mod persist;
pub mod sanitize;

pub use controller::DockController;
pub use index::{TabIndex, TabState};
pub use layout::{ContainerNode, LayoutNode, LayoutTree, NodeId, TabConfig, TabNode};
pub use persist::{FileStore, MemoryStore, SnapshotStore};
