//! Page construction for tabs.
//!
//! Every route template maps to a builder in an explicit table owned by
//! the [`PageResolver`]. A tab only ever receives its own route scope
//! (resolved path, params, typed props), and a builder or page that
//! panics is isolated to an inline error page so one broken page cannot
//! take the shell down.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Widget, Wrap},
};
use thiserror::Error;

use ledgerdock_routes::{Params, ResourceFamily, Route, RouteRegistry};

use crate::dock::TabState;

/// Typed props a page receives, extracted from its route params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageProps {
    Plain,
    TaskView { task_id: u64 },
    JobView { job_id: u64 },
    ClientView { client_id: u64 },
    PipelineView { pipeline_id: u64 },
}

#[derive(Debug, Error)]
pub enum PropsError {
    #[error("route '{template}' needs an 'id' param")]
    MissingId { template: String },
    #[error("'{value}' is not a numeric id")]
    NonNumericId { value: String },
}

/// Derives typed props for a route. Static routes get [`PageProps::Plain`]
/// whatever their family; dynamic resource routes must carry a numeric
/// `id` param.
pub fn extract_props(route: &Route, params: &Params) -> Result<PageProps, PropsError> {
    if !route.is_dynamic() {
        return Ok(PageProps::Plain);
    }
    let family = route.family();
    if family == ResourceFamily::General {
        return Ok(PageProps::Plain);
    }
    let raw = params.get("id").ok_or_else(|| PropsError::MissingId {
        template: route.template.clone(),
    })?;
    let id: u64 = raw.parse().map_err(|_| PropsError::NonNumericId {
        value: raw.clone(),
    })?;
    Ok(match family {
        ResourceFamily::Task => PageProps::TaskView { task_id: id },
        ResourceFamily::Job => PageProps::JobView { job_id: id },
        ResourceFamily::Client => PageProps::ClientView { client_id: id },
        ResourceFamily::Pipeline => PageProps::PipelineView { pipeline_id: id },
        ResourceFamily::General => PageProps::Plain,
    })
}

/// The route scope handed to a page builder. Pages see nothing else.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub resolved_path: String,
    pub params: Params,
    pub props: PageProps,
}

/// Something that can draw itself into a tab's content area.
pub trait PageView {
    fn render(&self, area: Rect, buf: &mut Buffer);
}

pub type PageBuilder = fn(&PageContext) -> Box<dyn PageView>;

/// Explicit template-to-builder table.
pub struct PageResolver {
    registry: RouteRegistry,
    builders: Vec<(String, PageBuilder)>,
}

impl PageResolver {
    pub fn new(registry: RouteRegistry) -> Self {
        Self {
            registry,
            builders: Vec::new(),
        }
    }

    pub fn register(&mut self, template: impl Into<String>, builder: PageBuilder) {
        self.builders.push((template.into(), builder));
    }

    /// The page table for the routes ledgerdock ships with.
    pub fn ledgerdock_default(registry: RouteRegistry) -> Self {
        let mut resolver = Self::new(registry);
        resolver.register("/home", build_overview);
        resolver.register("/accounts", build_accounts);
        resolver.register("/journal", build_journal);
        resolver.register("/clients", build_clients);
        resolver.register("/clients/:id/profile", build_client_profile);
        resolver.register("/tasks/:id", build_task);
        resolver.register("/jobs/:id", build_job);
        resolver.register("/pipelines/:id", build_pipeline);
        resolver.register("/banking/import", build_bank_import);
        resolver.register("/settings", build_settings);
        resolver
    }

    /// Builds the page for an open tab. Never panics outward: a missing
    /// route, bad props, unregistered template or crashing builder all
    /// come back as an inline error page.
    pub fn resolve(&self, tab: &TabState) -> Box<dyn PageView> {
        let route = match self.route_for(&tab.path) {
            Some(route) => route,
            None => {
                tracing::warn!(path = %tab.path, "page resolve: route is gone");
                return error_page(format!("The route for '{}' is no longer available.", tab.path));
            }
        };
        let props = match extract_props(route, &tab.params) {
            Ok(props) => props,
            Err(error) => return error_page(error.to_string()),
        };
        let Some(builder) = self
            .builders
            .iter()
            .find(|(template, _)| template.as_str() == route.template)
            .map(|(_, builder)| *builder)
        else {
            tracing::warn!(template = %route.template, "page resolve: no builder registered");
            return error_page(format!("No page is registered for '{}'.", route.template));
        };
        let context = PageContext {
            resolved_path: tab.path.clone(),
            params: tab.params.clone(),
            props,
        };
        match catch_unwind(AssertUnwindSafe(|| builder(&context))) {
            Ok(page) => page,
            Err(payload) => {
                tracing::error!(
                    path = %tab.path,
                    panic = panic_message(payload.as_ref()),
                    "page builder crashed"
                );
                error_page(format!("The page for '{}' crashed while loading.", tab.path))
            }
        }
    }

    fn route_for(&self, path: &str) -> Option<&Route> {
        if let Some(route) = self.registry.lookup(path) {
            return Some(route);
        }
        self.registry.match_concrete(path).map(|(route, _)| route)
    }
}

/// Draws a page with a panic boundary. A page that crashes mid-render
/// gets its area overwritten with an error pane.
pub fn render_guarded(page: &dyn PageView, area: Rect, buf: &mut Buffer) {
    let outcome = catch_unwind(AssertUnwindSafe(|| page.render(area, buf)));
    if let Err(payload) = outcome {
        tracing::error!(panic = panic_message(payload.as_ref()), "page crashed while rendering");
        ErrorPage::new("This page crashed while rendering.").render(area, buf);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

pub fn error_page(message: impl Into<String>) -> Box<dyn PageView> {
    Box::new(ErrorPage::new(message))
}

struct ErrorPage {
    message: String,
}

impl ErrorPage {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl PageView for ErrorPage {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Page error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .padding(Padding::uniform(1));
        let lines = vec![
            Line::from(Span::styled(
                self.message.clone(),
                Style::default().fg(Color::Red),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "The rest of the workspace is unaffected. Close this tab with 'x'.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

struct OverviewPage;

impl PageView for OverviewPage {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                "ledgerdock",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Your accounting workspace, one tab per page."),
            Line::from(""),
            Line::from("  g  go to a route        Tab  next tab"),
            Line::from("  x  close the tab        1-9  jump to tab"),
            Line::from("  ?  all key bindings       q  quit"),
        ];
        Paragraph::new(lines)
            .block(page_block("Overview"))
            .render(area, buf);
    }
}

/// Placeholder two-column listing used by the static ledger pages.
struct LedgerListPage {
    heading: &'static str,
    rows: Vec<(String, String)>,
}

impl LedgerListPage {
    fn accounts() -> Self {
        Self {
            heading: "Chart of Accounts",
            rows: canned_rows(&[
                ("1000", "Cash"),
                ("1200", "Accounts Receivable"),
                ("1500", "Equipment"),
                ("2000", "Accounts Payable"),
                ("3000", "Retained Earnings"),
                ("4000", "Service Revenue"),
                ("5000", "Operating Expenses"),
            ]),
        }
    }

    fn journal() -> Self {
        Self {
            heading: "Journal Entries",
            rows: canned_rows(&[
                ("2026-08-01", "Opening balances"),
                ("2026-08-07", "Invoice #1041 issued"),
                ("2026-08-12", "Office rent paid"),
                ("2026-08-19", "Payroll run"),
            ]),
        }
    }

    fn clients() -> Self {
        Self {
            heading: "Clients",
            rows: canned_rows(&[
                ("42", "Aldora Freight"),
                ("43", "Brightwater Dental"),
                ("57", "Cobble & Sons"),
            ]),
        }
    }

    fn bank_import() -> Self {
        Self {
            heading: "Bank Import",
            rows: canned_rows(&[
                ("last import", "2026-08-14, 37 transactions"),
                ("unmatched", "3 transactions awaiting review"),
            ]),
        }
    }
}

fn canned_rows(rows: &[(&str, &str)]) -> Vec<(String, String)> {
    rows.iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

impl PageView for LedgerListPage {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let mut lines = Vec::with_capacity(self.rows.len());
        for (key, value) in &self.rows {
            lines.push(Line::from(vec![
                Span::styled(format!("{key:<12}"), Style::default().fg(Color::Cyan)),
                Span::raw(value.clone()),
            ]));
        }
        Paragraph::new(lines)
            .block(page_block(self.heading))
            .render(area, buf);
    }
}

/// Detail page for a single task, job, client or pipeline.
struct ResourceDetailPage {
    kind: &'static str,
    id: u64,
    params: Params,
}

impl ResourceDetailPage {
    fn new(kind: &'static str, id: u64, params: Params) -> Self {
        Self { kind, id, params }
    }
}

impl PageView for ResourceDetailPage {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("{} #{}", self.kind, self.id),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, value) in &self.params {
            lines.push(Line::from(vec![
                Span::styled(format!("{key:<12}"), Style::default().fg(Color::Cyan)),
                Span::raw(value.clone()),
            ]));
        }
        Paragraph::new(lines)
            .block(page_block(self.kind))
            .render(area, buf);
    }
}

struct SettingsPage;

impl PageView for SettingsPage {
    fn render(&self, area: Rect, buf: &mut Buffer) {
        let settings_path = crate::settings::Settings::settings_path()
            .unwrap_or_else(|| "(no config directory)".to_string());
        let state_dir = crate::dock::persist::state_dir()
            .map(|dir| dir.display().to_string())
            .unwrap_or_else(|_| "(no state directory)".to_string());
        let lines = vec![
            Line::from(vec![
                Span::styled(format!("{:<12}", "settings"), Style::default().fg(Color::Cyan)),
                Span::raw(settings_path),
            ]),
            Line::from(vec![
                Span::styled(format!("{:<12}", "state dir"), Style::default().fg(Color::Cyan)),
                Span::raw(state_dir),
            ]),
            Line::from(""),
            Line::from("Overrides: LEDGERDOCK_STATE_DIR, LEDGERDOCK_HOME_ROUTE."),
        ];
        Paragraph::new(lines)
            .block(page_block("Settings"))
            .render(area, buf);
    }
}

fn page_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .padding(Padding::uniform(1))
}

fn build_overview(_context: &PageContext) -> Box<dyn PageView> {
    Box::new(OverviewPage)
}

fn build_accounts(_context: &PageContext) -> Box<dyn PageView> {
    Box::new(LedgerListPage::accounts())
}

fn build_journal(_context: &PageContext) -> Box<dyn PageView> {
    Box::new(LedgerListPage::journal())
}

fn build_clients(_context: &PageContext) -> Box<dyn PageView> {
    Box::new(LedgerListPage::clients())
}

fn build_bank_import(_context: &PageContext) -> Box<dyn PageView> {
    Box::new(LedgerListPage::bank_import())
}

fn build_settings(_context: &PageContext) -> Box<dyn PageView> {
    Box::new(SettingsPage)
}

fn build_client_profile(context: &PageContext) -> Box<dyn PageView> {
    match &context.props {
        PageProps::ClientView { client_id } => Box::new(ResourceDetailPage::new(
            "Client",
            *client_id,
            context.params.clone(),
        )),
        _ => error_page("Client profile opened without a client id."),
    }
}

fn build_task(context: &PageContext) -> Box<dyn PageView> {
    match &context.props {
        PageProps::TaskView { task_id } => Box::new(ResourceDetailPage::new(
            "Task",
            *task_id,
            context.params.clone(),
        )),
        _ => error_page("Task page opened without a task id."),
    }
}

fn build_job(context: &PageContext) -> Box<dyn PageView> {
    match &context.props {
        PageProps::JobView { job_id } => Box::new(ResourceDetailPage::new(
            "Job",
            *job_id,
            context.params.clone(),
        )),
        _ => error_page("Job page opened without a job id."),
    }
}

fn build_pipeline(context: &PageContext) -> Box<dyn PageView> {
    match &context.props {
        PageProps::PipelineView { pipeline_id } => Box::new(ResourceDetailPage::new(
            "Pipeline",
            *pipeline_id,
            context.params.clone(),
        )),
        _ => error_page("Pipeline page opened without a pipeline id."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::NodeId;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn tab(path: &str, pairs: &[(&str, &str)]) -> TabState {
        TabState {
            id: NodeId::from_string("t1"),
            path: path.to_string(),
            title: String::new(),
            params: params(pairs),
        }
    }

    fn buffer_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn render_to_text(page: &dyn PageView) -> String {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        render_guarded(page, area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn props_carry_typed_resource_ids() {
        assert_eq!(
            extract_props(&Route::new("/tasks/:id", "Task"), &params(&[("id", "7")])).unwrap(),
            PageProps::TaskView { task_id: 7 }
        );
        assert_eq!(
            extract_props(&Route::new("/jobs/:id", "Job"), &params(&[("id", "9")])).unwrap(),
            PageProps::JobView { job_id: 9 }
        );
        assert_eq!(
            extract_props(
                &Route::new("/clients/:id/profile", "Client Profile"),
                &params(&[("id", "42")])
            )
            .unwrap(),
            PageProps::ClientView { client_id: 42 }
        );
        assert_eq!(
            extract_props(&Route::new("/pipelines/:id", "Pipeline"), &params(&[("id", "3")]))
                .unwrap(),
            PageProps::PipelineView { pipeline_id: 3 }
        );
    }

    #[test]
    fn static_routes_get_plain_props() {
        assert_eq!(
            extract_props(&Route::new("/home", "Overview"), &Params::new()).unwrap(),
            PageProps::Plain
        );
        assert_eq!(
            extract_props(&Route::new("/clients", "Clients"), &Params::new()).unwrap(),
            PageProps::Plain
        );
    }

    #[test]
    fn dynamic_resource_routes_demand_a_numeric_id() {
        let route = Route::new("/tasks/:id", "Task");
        assert!(matches!(
            extract_props(&route, &Params::new()),
            Err(PropsError::MissingId { .. })
        ));
        assert!(matches!(
            extract_props(&route, &params(&[("id", "seven")])),
            Err(PropsError::NonNumericId { .. })
        ));
    }

    #[test]
    fn resolver_builds_detail_pages_from_concrete_paths() {
        let resolver = PageResolver::ledgerdock_default(RouteRegistry::ledgerdock_default());
        let page = resolver.resolve(&tab("/tasks/7", &[("id", "7")]));
        let text = render_to_text(page.as_ref());
        assert!(text.contains("Task #7"));
    }

    #[test]
    fn resolver_reports_unavailable_routes_inline() {
        let resolver = PageResolver::ledgerdock_default(RouteRegistry::ledgerdock_default());
        let page = resolver.resolve(&tab("/legacy/report", &[]));
        let text = render_to_text(page.as_ref());
        assert!(text.contains("no longer available"));
    }

    #[test]
    fn resolver_reports_missing_builders_inline() {
        let registry = RouteRegistry::ledgerdock_default().with("/payroll", "Payroll");
        let resolver = PageResolver::new(registry);
        let page = resolver.resolve(&tab("/payroll", &[]));
        let text = render_to_text(page.as_ref());
        assert!(text.contains("No page is registered"));
    }

    #[test]
    fn a_panicking_builder_becomes_an_error_page() {
        let registry = RouteRegistry::new().with("/boom", "Boom");
        let mut resolver = PageResolver::new(registry);
        resolver.register("/boom", |_| panic!("kaboom"));
        let page = resolver.resolve(&tab("/boom", &[]));
        let text = render_to_text(page.as_ref());
        assert!(text.contains("crashed while loading"));
    }

    #[test]
    fn a_panicking_render_is_overwritten_with_an_error_pane() {
        struct Panicky;
        impl PageView for Panicky {
            fn render(&self, _area: Rect, _buf: &mut Buffer) {
                panic!("render exploded");
            }
        }
        let text = render_to_text(&Panicky);
        assert!(text.contains("crashed while rendering"));
    }

    #[test]
    fn bad_params_become_an_error_page() {
        let resolver = PageResolver::ledgerdock_default(RouteRegistry::ledgerdock_default());
        let page = resolver.resolve(&tab("/tasks/seven", &[("id", "seven")]));
        let text = render_to_text(page.as_ref());
        assert!(text.contains("not a numeric id"));
    }
}
