//! Route registry for the ledgerdock workbench.
//!
//! Maps logical application paths (e.g. `/clients/:id/profile`) onto page
//! metadata. The registry is a pure lookup table: matching and interpolation
//! never mutate it, and iteration happens in declaration order, which makes
//! dynamic matching deterministic when templates overlap.

use std::collections::BTreeMap;

use serde::Serialize;

/// Route parameters extracted from (or substituted into) a path.
///
/// A `BTreeMap` keeps equality structural and serialization deterministic,
/// both of which the workspace dedup logic relies on.
pub type Params = BTreeMap<String, String>;

/// Resource family of a dynamic detail route.
///
/// Each family names its numeric id prop differently (`task_id`, `job_id`,
/// `client_id`, `pipeline_id`), so the page resolver needs to know which
/// family a template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceFamily {
    Task,
    Job,
    Client,
    Pipeline,
    /// Routes without a numeric-id prop (lists, dashboards, settings).
    General,
}

/// A single registered route.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    /// Path template, e.g. `/clients/:id/profile`.
    pub template: String,
    /// Human title used for new tabs when the caller supplies none.
    pub title: String,
}

impl Route {
    pub fn new(template: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            title: title.into(),
        }
    }

    /// Whether the template contains at least one `:param` segment.
    pub fn is_dynamic(&self) -> bool {
        self.template
            .split('/')
            .any(|segment| segment.len() > 1 && segment.starts_with(':'))
    }

    /// Resource family, classified by the leading path segment.
    pub fn family(&self) -> ResourceFamily {
        match self.template.trim_start_matches('/').split('/').next() {
            Some("tasks") => ResourceFamily::Task,
            Some("jobs") => ResourceFamily::Job,
            Some("clients") => ResourceFamily::Client,
            Some("pipelines") => ResourceFamily::Pipeline,
            _ => ResourceFamily::General,
        }
    }
}

/// Ordered route table.
///
/// Declaration order is the tie-break when several dynamic templates match
/// the same concrete path: the first registered wins.
#[derive(Debug, Clone, Default)]
pub struct RouteRegistry {
    routes: Vec<Route>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Append a route. Later registrations never shadow earlier ones.
    pub fn register(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Builder-style `register`.
    pub fn with(mut self, template: impl Into<String>, title: impl Into<String>) -> Self {
        self.register(Route::new(template, title));
        self
    }

    /// The route table the ledgerdock application ships with.
    pub fn ledgerdock_default() -> Self {
        Self::new()
            .with("/home", "Overview")
            .with("/accounts", "Chart of Accounts")
            .with("/journal", "Journal Entries")
            .with("/clients", "Clients")
            .with("/clients/:id/profile", "Client Profile")
            .with("/tasks/:id", "Task")
            .with("/jobs/:id", "Job")
            .with("/pipelines/:id", "Pipeline")
            .with("/banking/import", "Bank Import")
            .with("/settings", "Settings")
    }

    /// Exact template lookup.
    pub fn lookup(&self, template_path: &str) -> Option<&Route> {
        let wanted = trim_trailing_slash(template_path);
        self.routes
            .iter()
            .find(|route| trim_trailing_slash(&route.template) == wanted)
    }

    /// Match `concrete_path` against one specific dynamic template,
    /// extracting params on success.
    pub fn match_dynamic(&self, template_path: &str, concrete_path: &str) -> Option<Params> {
        let route = self.lookup(template_path)?;
        if !route.is_dynamic() {
            return None;
        }
        match_template(&route.template, concrete_path)
    }

    /// Match `concrete_path` against every dynamic template in declaration
    /// order; first match wins.
    pub fn match_concrete(&self, concrete_path: &str) -> Option<(&Route, Params)> {
        self.routes
            .iter()
            .filter(|route| route.is_dynamic())
            .find_map(|route| {
                match_template(&route.template, concrete_path).map(|params| (route, params))
            })
    }

    /// Substitute `:name` segments of `template_path` from `params`.
    ///
    /// Total: a param that is missing leaves its placeholder segment in the
    /// output so callers always get a path back.
    pub fn resolve(&self, template_path: &str, params: &Params) -> String {
        interpolate(template_path, params)
    }

    /// All routes, in declaration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Strip a single trailing `/`, leaving the bare root path alone.
fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Segment-wise template match. `:name` segments capture, literal segments
/// compare exactly, and the segment counts must agree.
fn match_template(template: &str, concrete: &str) -> Option<Params> {
    let template_segments: Vec<&str> = trim_trailing_slash(template).split('/').collect();
    let concrete_segments: Vec<&str> = trim_trailing_slash(concrete).split('/').collect();

    if template_segments.len() != concrete_segments.len() {
        return None;
    }

    let mut params = Params::new();
    for (pattern, value) in template_segments.iter().zip(concrete_segments.iter()) {
        if pattern.len() > 1 && pattern.starts_with(':') {
            params.insert(pattern[1..].to_string(), (*value).to_string());
        } else if pattern != value {
            return None;
        }
    }
    Some(params)
}

fn interpolate(template: &str, params: &Params) -> String {
    trim_trailing_slash(template)
        .split('/')
        .map(|segment| {
            if segment.len() > 1 && segment.starts_with(':') {
                match params.get(&segment[1..]) {
                    Some(value) => value.as_str(),
                    None => {
                        tracing::debug!(template, segment, "no param for template segment");
                        segment
                    }
                }
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> RouteRegistry {
        RouteRegistry::ledgerdock_default()
    }

    #[test]
    fn exact_lookup_finds_static_and_dynamic_templates() {
        let registry = registry();
        assert_eq!(registry.lookup("/home").unwrap().title, "Overview");
        assert_eq!(
            registry.lookup("/clients/:id/profile").unwrap().title,
            "Client Profile"
        );
        assert!(registry.lookup("/nope").is_none());
    }

    #[test]
    fn lookup_ignores_a_trailing_slash() {
        let registry = registry();
        assert!(registry.lookup("/home/").is_some());
        assert!(registry.lookup("/").is_none());
    }

    #[test]
    fn dynamic_match_extracts_params() {
        let registry = registry();
        let params = registry
            .match_dynamic("/clients/:id/profile", "/clients/42/profile")
            .unwrap();
        assert_eq!(params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn dynamic_match_rejects_wrong_shape() {
        let registry = registry();
        assert!(registry
            .match_dynamic("/clients/:id/profile", "/clients/42")
            .is_none());
        assert!(registry
            .match_dynamic("/clients/:id/profile", "/suppliers/42/profile")
            .is_none());
        // Static templates never dynamic-match.
        assert!(registry.match_dynamic("/home", "/home").is_none());
    }

    #[test]
    fn concrete_match_walks_declaration_order() {
        let registry = RouteRegistry::new()
            .with("/jobs/:id", "Job")
            .with("/jobs/:code", "Job By Code");
        let (route, params) = registry.match_concrete("/jobs/7").unwrap();
        assert_eq!(route.template, "/jobs/:id");
        assert_eq!(params.get("id").map(String::as_str), Some("7"));
        assert!(params.get("code").is_none());
    }

    #[test]
    fn concrete_match_misses_unknown_paths() {
        assert!(registry().match_concrete("/unknown/7").is_none());
    }

    #[test]
    fn resolve_interpolates_params() {
        let registry = registry();
        let mut params = Params::new();
        params.insert("id".to_string(), "42".to_string());
        assert_eq!(
            registry.resolve("/clients/:id/profile", &params),
            "/clients/42/profile"
        );
        // Static templates pass through unchanged.
        assert_eq!(registry.resolve("/home", &Params::new()), "/home");
    }

    #[test]
    fn resolve_keeps_placeholder_for_missing_param() {
        let registry = registry();
        assert_eq!(
            registry.resolve("/jobs/:id", &Params::new()),
            "/jobs/:id"
        );
    }

    #[test]
    fn family_follows_the_leading_segment() {
        assert_eq!(
            Route::new("/tasks/:id", "Task").family(),
            ResourceFamily::Task
        );
        assert_eq!(Route::new("/jobs/:id", "Job").family(), ResourceFamily::Job);
        assert_eq!(
            Route::new("/clients/:id/profile", "Client Profile").family(),
            ResourceFamily::Client
        );
        assert_eq!(
            Route::new("/pipelines/:id", "Pipeline").family(),
            ResourceFamily::Pipeline
        );
        assert_eq!(
            Route::new("/banking/import", "Bank Import").family(),
            ResourceFamily::General
        );
    }

    #[test]
    fn dynamic_detection_requires_a_named_param() {
        assert!(Route::new("/jobs/:id", "Job").is_dynamic());
        assert!(!Route::new("/jobs", "Jobs").is_dynamic());
    }
}
