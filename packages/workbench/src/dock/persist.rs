//! Layout persistence.
//!
//! The dock core talks to storage through [`SnapshotStore`], a small
//! load/save/clear surface over raw JSON documents. Restoring goes
//! through a recovery pipeline (shape normalization, sanitize pass,
//! structural validation, typed decode) and any failure falls back to a
//! synthesized default layout rather than a partially repaired one.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;

use crate::dock::layout::{LayoutNode, LayoutTree};
use crate::dock::sanitize;
use crate::errors::{WorkbenchError, WorkbenchResult};

pub const SNAPSHOT_VERSION: u64 = 2;
pub const STATE_DIR_ENV: &str = "LEDGERDOCK_STATE_DIR";
const SNAPSHOT_FILE: &str = "layout.json";

/// Storage for one layout snapshot document.
///
/// `load` returns None for missing or unparseable state; `save` and
/// `clear` are best effort and log failures instead of surfacing them,
/// so a broken disk never takes the live workspace down with it.
pub trait SnapshotStore {
    fn load(&self) -> Option<Value>;
    fn save(&self, snapshot: &Value);
    fn clear(&self);
}

/// Resolution order for the on-disk state directory: the
/// `LEDGERDOCK_STATE_DIR` override, then the platform data dir, then a
/// dotdir in `$HOME`.
pub fn state_dir() -> WorkbenchResult<PathBuf> {
    if let Ok(dir) = std::env::var(STATE_DIR_ENV) {
        if !dir.is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    if let Some(data) = dirs::data_dir() {
        return Ok(data.join(crate::APP_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        return Ok(home.join(format!(".{}", crate::APP_NAME)));
    }
    Err(WorkbenchError::StateDirUnavailable)
}

/// Snapshot storage backed by `layout.json` in a state directory.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open_default() -> WorkbenchResult<Self> {
        Ok(Self::at_dir(state_dir()?))
    }

    pub fn at_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(SNAPSHOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Option<Value> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "failed to read layout snapshot");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "layout snapshot is not valid JSON");
                None
            }
        }
    }

    fn save(&self, snapshot: &Value) {
        if let Some(parent) = self.path.parent() {
            if let Err(error) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), %error, "failed to create state directory");
                return;
            }
        }
        let body = match serde_json::to_string_pretty(snapshot) {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%error, "failed to serialize layout snapshot");
                return;
            }
        };
        if let Err(error) = fs::write(&self.path, body) {
            tracing::warn!(path = %self.path.display(), %error, "failed to write layout snapshot");
        }
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "failed to clear layout snapshot");
            }
        }
    }
}

/// In-memory store, shared by clone. Used by tests and by headless runs
/// that should not touch the disk.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded(value: Value) -> Self {
        let store = Self::new();
        *store.slot() = Some(value);
        store
    }

    /// Current stored document, for assertions.
    pub fn snapshot(&self) -> Option<Value> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Value>> {
        match self.slot.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Option<Value> {
        self.slot().clone()
    }

    fn save(&self, snapshot: &Value) {
        *self.slot() = Some(snapshot.clone());
    }

    fn clear(&self) {
        *self.slot() = None;
    }
}

/// Serializes the live tree into a snapshot document. The document runs
/// through the same sanitize pass as loaded state, and is rejected
/// instead of written if it would not survive its own restore.
pub fn encode_snapshot(tree: &LayoutTree) -> WorkbenchResult<Value> {
    let root = serde_json::to_value(tree.root())?;
    let doc = sanitize::sanitize(serde_json::json!({
        "version": SNAPSHOT_VERSION,
        "savedAt": Utc::now().to_rfc3339(),
        "root": root,
    }));
    if !sanitize::validate(&doc) {
        return Err(WorkbenchError::InvalidSnapshot("encoded document lost its root"));
    }
    Ok(doc)
}

/// Runs the recovery pipeline over a loaded document. None means the
/// snapshot is unusable and the caller should fall back to a default
/// layout.
pub fn restore_tree(raw: Option<Value>) -> Option<LayoutTree> {
    let doc = sanitize::sanitize(sanitize::normalize_shape(raw?));
    if !sanitize::validate(&doc) {
        tracing::warn!("persisted layout failed validation");
        return None;
    }
    let root = doc.get("root")?.clone();
    match serde_json::from_value::<LayoutNode>(root) {
        Ok(root) => Some(LayoutTree::new(root)),
        Err(error) => {
            tracing::warn!(%error, "persisted layout failed typed decode");
            None
        }
    }
}

/// Best-effort persist used after every mutation.
pub fn save_tree(store: &dyn SnapshotStore, tree: &LayoutTree) {
    match encode_snapshot(tree) {
        Ok(doc) => store.save(&doc),
        Err(error) => tracing::warn!(%error, "skipping persist of invalid layout"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::layout::TabConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_tree() -> LayoutTree {
        LayoutTree::single_tab(
            "Overview",
            TabConfig {
                template_path: "/home".to_string(),
                params: Default::default(),
                resolved_path: "/home".to_string(),
            },
        )
    }

    #[test]
    fn encode_then_restore_round_trips_the_tree() {
        let doc = encode_snapshot(&sample_tree()).unwrap();
        assert_eq!(doc["version"], SNAPSHOT_VERSION);
        assert!(doc["savedAt"].is_string());
        let tree = restore_tree(Some(doc)).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.leaves()[0].config.resolved_path, "/home");
    }

    #[test]
    fn restore_accepts_a_legacy_content_document() {
        let doc = json!({
            "content": [
                { "type": "tabset", "children": [
                    { "type": "tab", "title": "Clients", "config": { "templatePath": "/clients" } }
                ] }
            ]
        });
        let tree = restore_tree(Some(doc)).unwrap();
        assert_eq!(tree.leaf_count(), 1);
        assert_eq!(tree.leaves()[0].title, "Clients");
    }

    #[test]
    fn restore_rejects_documents_without_a_root() {
        assert!(restore_tree(None).is_none());
        assert!(restore_tree(Some(json!("garbage"))).is_none());
        assert!(restore_tree(Some(json!({ "version": 2 }))).is_none());
        assert!(restore_tree(Some(json!({ "root": "leaf" }))).is_none());
    }

    #[test]
    fn restore_rejects_structurally_typed_garbage() {
        // Root is an object but not a layout node.
        let doc = json!({ "root": { "type": "window", "children": [] } });
        assert!(restore_tree(Some(doc)).is_none());
    }

    #[test]
    fn restore_scrubs_runtime_state_before_typing() {
        let doc = json!({
            "root": {
                "type": "tabset",
                "parent": { "cycle": true },
                "children": [
                    { "type": "tab", "title": 42, "config": { "templatePath": "/tasks/:id", "params": { "id": "7" } } }
                ]
            }
        });
        let tree = restore_tree(Some(doc)).unwrap();
        assert_eq!(tree.leaves()[0].title, "42");
        assert_eq!(tree.leaves()[0].config.params.get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::at_dir(dir.path());
        assert!(store.load().is_none());

        save_tree(&store, &sample_tree());
        let loaded = store.load().unwrap();
        assert!(sanitize::validate(&loaded));

        store.clear();
        assert!(store.load().is_none());
        store.clear();
    }

    #[test]
    fn file_store_treats_unparseable_state_as_missing() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::at_dir(dir.path());
        fs::create_dir_all(dir.path()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn memory_store_is_shared_by_clone() {
        let store = MemoryStore::new();
        let handle = store.clone();
        store.save(&json!({ "root": {} }));
        assert!(handle.snapshot().is_some());
        handle.clear();
        assert!(store.load().is_none());
    }
}
