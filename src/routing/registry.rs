//! Route registry for URL building
//!
//! Records which path templates and verbs belong to which endpoint, and
//! builds concrete URLs from an endpoint name and its parameters.

use crate::core::error::{HalError, HalResult};
use crate::core::query::PathParams;
use axum::http::Method;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt;

/// One piece of a path template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A path template such as `/workouts/{id}`
///
/// Uses the same `{name}` placeholder syntax as the axum router, so one
/// template string serves both dispatch and URL building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(raw: &str) -> HalResult<Self> {
        if !raw.starts_with('/') {
            return Err(HalError::Config(format!(
                "path template '{}' must start with '/'",
                raw
            )));
        }

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.chars();

        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for c in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed || name.is_empty() || name.contains('{') {
                        return Err(HalError::Config(format!(
                            "malformed placeholder in path template '{}'",
                            raw
                        )));
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Param(name));
                }
                '}' => {
                    return Err(HalError::Config(format!(
                        "unbalanced '}}' in path template '{}'",
                        raw
                    )));
                }
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names, in template order
    pub fn arguments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_arguments(&self) -> bool {
        self.arguments().next().is_some()
    }

    /// Substitute every placeholder; a missing parameter is an error
    pub fn render(&self, params: &PathParams) -> Result<String, String> {
        let mut url = String::with_capacity(self.raw.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Param(name) => {
                    let value = params
                        .get(name)
                        .ok_or_else(|| format!("missing path parameter '{}'", name))?;
                    if value.is_empty() {
                        return Err(format!("empty path parameter '{}'", name));
                    }
                    url.push_str(&encode(value));
                }
            }
        }
        Ok(url)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A registered route: endpoint name, template and accepted verbs
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pub endpoint: String,
    pub template: PathTemplate,
    pub methods: Vec<Method>,
}

impl RouteDefinition {
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.iter().any(|m| m == method)
    }
}

/// Routing collaborator used to enumerate routes and build URLs
pub trait Routing: Send + Sync {
    /// Routes registered under `endpoint`, in registration order
    fn routes_for(&self, endpoint: &str) -> Vec<&RouteDefinition>;

    /// Build a URL for `endpoint`
    ///
    /// The first route whose placeholders are all supplied by `params` is used.
    /// Parameters the template does not consume, then `query`, form the query
    /// string.
    fn url_for(
        &self,
        endpoint: &str,
        params: &PathParams,
        query: &[(&str, String)],
    ) -> HalResult<String> {
        let routes = self.routes_for(endpoint);
        if routes.is_empty() {
            return Err(HalError::unresolvable(endpoint, "no route registered"));
        }

        let route = routes
            .into_iter()
            .find(|route| route.template.arguments().all(|arg| params.contains_key(arg)))
            .ok_or_else(|| {
                HalError::unresolvable(
                    endpoint,
                    format!(
                        "no route can be built from parameters [{}]",
                        params.keys().cloned().collect::<Vec<_>>().join(", ")
                    ),
                )
            })?;

        let mut url = route
            .template
            .render(params)
            .map_err(|reason| HalError::unresolvable(endpoint, reason))?;

        let arguments: Vec<&str> = route.template.arguments().collect();
        let pairs: Vec<String> = params
            .iter()
            .filter(|(key, _)| !arguments.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .chain(query.iter().map(|(key, value)| (*key, value.as_str())))
            .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
            .collect();
        if !pairs.is_empty() {
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        Ok(url)
    }
}

/// Ordered table of every route the application serves
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Register a route; malformed templates are rejected immediately
    pub fn add(
        &mut self,
        endpoint: impl Into<String>,
        template: &str,
        methods: &[Method],
    ) -> HalResult<&mut Self> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(HalError::Config(format!(
                "route '{}' has an empty endpoint name",
                template
            )));
        }
        self.routes.push(RouteDefinition {
            endpoint,
            template: PathTemplate::parse(template)?,
            methods: methods.to_vec(),
        });
        Ok(self)
    }

    /// Builder-style variant of [`RouteTable::add`]
    pub fn with_route(
        mut self,
        endpoint: impl Into<String>,
        template: &str,
        methods: &[Method],
    ) -> HalResult<Self> {
        self.add(endpoint, template, methods)?;
        Ok(self)
    }

    /// Endpoint names, in registration order and without duplicates
    pub fn endpoints(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for route in &self.routes {
            if !names.contains(&route.endpoint.as_str()) {
                names.push(&route.endpoint);
            }
        }
        names
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Routing for RouteTable {
    fn routes_for(&self, endpoint: &str) -> Vec<&RouteDefinition> {
        self.routes
            .iter()
            .filter(|route| route.endpoint == endpoint)
            .collect()
    }
}

/// Everything outside the RFC 3986 unreserved set
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}
