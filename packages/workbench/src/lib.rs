//! ledgerdock: a dockable tab workspace for an accounting back office,
//! driven from the terminal.
//!
//! The dock core (layout tree, persistence, tab index, controller) is
//! UI-agnostic; the ratatui shell and the CLI both sit on top of it.

pub mod commands;
pub mod dock;
pub mod errors;
pub mod pages;
pub mod runner;
pub mod settings;
pub mod state;
pub mod ui;

pub use dock::{DockController, FileStore, MemoryStore, SnapshotStore, TabState};
pub use errors::{WorkbenchError, WorkbenchResult};
pub use pages::PageResolver;
pub use runner::run_workbench;
pub use settings::Settings;
pub use state::WorkbenchApp;

pub const APP_NAME: &str = "ledgerdock";
pub const DEFAULT_ROUTE: &str = "/home";
