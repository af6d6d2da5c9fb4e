use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ledgerdock_routes::{Params, RouteRegistry};
use ledgerdock_workbench::dock::NodeId;
use ledgerdock_workbench::{
    run_workbench, DockController, FileStore, PageResolver, Settings, SnapshotStore, WorkbenchApp,
    WorkbenchError,
};

#[derive(Parser, Debug)]
#[command(
    name = "ledgerdock",
    author,
    version,
    about = "Terminal workbench for the ledgerdock back office"
)]
struct Cli {
    /// Directory holding the persisted layout and logs
    #[arg(long, env = "LEDGERDOCK_STATE_DIR", global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List open tabs from the persisted layout
    Tabs {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Open a tab without entering the shell, persisting the layout
    Open {
        /// Route template or concrete path, e.g. /accounts or /tasks/7
        path: String,
        /// Route params as key=value (repeatable)
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Tab title override
        #[arg(long)]
        title: Option<String>,
    },
    /// Close a tab by id
    Close { id: String },
    /// Delete the persisted layout
    Reset,
    /// Print the route table
    Routes {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show settings, or change the home route
    Config {
        /// Set the home route (must be a registered route)
        #[arg(long, value_name = "ROUTE")]
        home_route: Option<String>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err("param should look like key=value".to_string());
    };
    if key.is_empty() {
        return Err("param key is empty".to_string());
    }
    Ok((key.to_string(), value.to_string()))
}

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let registry = RouteRegistry::ledgerdock_default();
    match cli.command {
        None => run_tui(cli.state_dir, registry),
        Some(command) => run_headless(command, cli.state_dir, registry),
    }
}

fn run_tui(state_dir: Option<PathBuf>, registry: RouteRegistry) -> Result<()> {
    let store = open_store(state_dir)?;
    let _guard = init_tracing(store.path().parent().map(PathBuf::from));
    let settings = Settings::load();
    let home = settings.validated_route(&registry);
    let controller = DockController::restore(registry.clone(), Box::new(store), home);
    let resolver = PageResolver::ledgerdock_default(registry);
    let app = WorkbenchApp::new(controller, resolver, settings.show_help_hint);
    run_workbench(app)
}

fn run_headless(command: Command, state_dir: Option<PathBuf>, registry: RouteRegistry) -> Result<()> {
    init_stderr_logging();
    let settings = Settings::load();
    match command {
        Command::Tabs { json } => {
            let controller = build_controller(state_dir, &settings, registry)?;
            print_tabs(&controller, json)
        }
        Command::Open { path, params, title } => {
            let mut controller = build_controller(state_dir, &settings, registry)?;
            let params: Params = params.into_iter().collect();
            let params = if params.is_empty() { None } else { Some(params) };
            if !controller.open_tab(&path, params, title.as_deref()) {
                return Err(WorkbenchError::RouteNotFound(path).into());
            }
            print_tabs(&controller, false)
        }
        Command::Close { id } => {
            let mut controller = build_controller(state_dir, &settings, registry)?;
            let id = NodeId::from_string(id);
            if !controller.close_tab(&id) {
                return Err(anyhow::anyhow!("no open tab with id '{id}'"));
            }
            print_tabs(&controller, false)
        }
        Command::Reset => {
            let store = open_store(state_dir)?;
            store.clear();
            println!("Cleared the persisted layout.");
            Ok(())
        }
        Command::Routes { json } => print_routes(&registry, json),
        Command::Config { home_route } => handle_config(home_route, &registry),
    }
}

fn open_store(state_dir: Option<PathBuf>) -> Result<FileStore> {
    Ok(match state_dir {
        Some(dir) => FileStore::at_dir(dir),
        None => FileStore::open_default()?,
    })
}

fn build_controller(
    state_dir: Option<PathBuf>,
    settings: &Settings,
    registry: RouteRegistry,
) -> Result<DockController> {
    let store = open_store(state_dir)?;
    let home = settings.validated_route(&registry);
    Ok(DockController::restore(registry, Box::new(store), home))
}

fn print_tabs(controller: &DockController, json: bool) -> Result<()> {
    if json {
        let doc = serde_json::json!({
            "active": controller.get_active_tab().map(|tab| tab.id.clone()),
            "tabs": controller.get_all_tabs(),
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }
    let tabs = controller.get_all_tabs();
    if tabs.is_empty() {
        println!("No open tabs.");
        return Ok(());
    }
    let active = controller.get_active_tab().map(|tab| tab.id.clone());
    for tab in tabs {
        let marker = if Some(&tab.id) == active.as_ref() { "*" } else { " " };
        println!("{} {}  {:<24}  {}", marker, tab.id, tab.path, tab.title);
    }
    Ok(())
}

fn print_routes(registry: &RouteRegistry, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(registry.routes())?);
        return Ok(());
    }
    for route in registry.routes() {
        println!("{:<24}  {}", route.template, route.title);
    }
    Ok(())
}

fn handle_config(home_route: Option<String>, registry: &RouteRegistry) -> Result<()> {
    let mut settings = Settings::load();
    match home_route {
        Some(route) => {
            let Some(known) = registry.lookup(&route) else {
                return Err(WorkbenchError::RouteNotFound(route).into());
            };
            settings.default_route = known.template.clone();
            settings.save()?;
            println!("Home route set to {}.", settings.default_route);
        }
        None => {
            println!("home route      {}", settings.default_route);
            println!("show help hint  {}", settings.show_help_hint);
            if let Some(path) = Settings::settings_path() {
                println!("settings file   {path}");
            }
        }
    }
    Ok(())
}

fn init_tracing(log_dir: Option<PathBuf>) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_dir = log_dir?;
    if let Err(error) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create log directory {log_dir:?}: {error}. Logging to file disabled.");
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&log_dir, "ledgerdock.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // No stdout layer: the shell owns the terminal while it runs.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    Some(guard)
}

fn init_stderr_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_param_pairs() {
        let (key, value) = parse_param("id=42").unwrap();
        assert_eq!(key, "id");
        assert_eq!(value, "42");
    }

    #[test]
    fn keeps_equals_signs_in_values() {
        let (key, value) = parse_param("filter=status=open").unwrap();
        assert_eq!(key, "filter");
        assert_eq!(value, "status=open");
    }

    #[test]
    fn rejects_params_without_an_equals() {
        assert!(parse_param("invalid").is_err());
        assert!(parse_param("=value").is_err());
    }
}
