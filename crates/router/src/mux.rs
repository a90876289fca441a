//! The pattern table every router registers into.
//!
//! [`ServeMux`] owns `(pattern, handler)` entries and, for each request, selects exactly one
//! handler or answers on its own with a redirect, `400 Bad Request`, `405 Method Not Allowed` or
//! `404 Not Found`.
//!
//! ## Precedence
//!
//! 1. entries naming the request host win over entries without a host
//! 2. entries naming the request method win, then `GET` entries for a `HEAD` request, then
//!    entries without a method
//! 3. among the rest, the most specific path pattern wins
//!
//! Registration rejects any pattern for which this order would be ambiguous.
//!
//! ## Lookup
//!
//! Entries are bucketed by host and method, each bucket holds [`matchit`] routers. A pattern is
//! inserted as matcher routes keyed by segment position: `{id}` in the second segment becomes
//! `{p1}`, a subtree `/a/` becomes the literal `/a/` plus the catch-all `/a/{*p1}`, and `{$}`
//! becomes the literal trailing `/`.

use crate::Body;
use crate::error::RouterError;
use crate::handler::{Handler, Request, Response, SharedHandler};
use crate::path::{clean_path, strip_host_port};
use crate::pattern::{Pattern, Relationship, Segment};
use crate::request::{MatchedPattern, PathParams};
use async_trait::async_trait;
use http::header::{ALLOW, CONNECTION, CONTENT_TYPE, HOST, LOCATION, X_CONTENT_TYPE_OPTIONS};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use tracing::trace;

type InnerRouter<T> = matchit::Router<T>;

/// Captured wildcard values, in pattern order.
type Captures = Vec<(String, String)>;

#[derive(Clone)]
struct Entry {
    pattern: Pattern,
    handler: SharedHandler,
    /// matcher parameter key and wildcard name, in pattern order
    wildcards: Vec<(String, String)>,
}

/// The matcher value of one route of an entry.
#[derive(Debug, Clone, Copy)]
struct Route {
    entry: usize,
    /// false for the catch-all route of a subtree, which only matches a non-empty remainder
    exact: bool,
}

/// The matchers of one host and method.
///
/// A matcher refuses some routes that coexist under pattern precedence, e.g. a parameter next to
/// a catch-all, or the literal `/a/` of both `/a/` and `/a/{$}`. Such a route goes to the first
/// layer that accepts it.
#[derive(Clone, Default)]
struct Layers {
    layers: Vec<InnerRouter<Route>>,
}

impl Layers {
    fn insert(&mut self, route: &str, value: Route) -> Result<(), matchit::InsertError> {
        for layer in &mut self.layers {
            if layer.insert(route, value).is_ok() {
                return Ok(());
            }
        }

        let mut layer = InnerRouter::new();
        layer.insert(route, value)?;
        self.layers.push(layer);
        Ok(())
    }
}

/// host (empty for host-less patterns), then method (`None` for method-less patterns)
type Table = HashMap<String, HashMap<Option<Method>, Layers>>;

#[derive(Clone, Default)]
pub struct ServeMux {
    entries: Vec<Entry>,
    table: Table,
}

struct Found<'mux> {
    entry: &'mux Entry,
    captures: Captures,
    exact: bool,
}

/// What the mux decided for one request.
enum Outcome<'mux> {
    Matched { entry: &'mux Entry, captures: Captures },
    Redirect(String),
    MethodNotAllowed(Vec<String>),
    NotFound,
    BadRequest,
}

impl ServeMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `pattern`.
    ///
    /// On error the mux is left unchanged.
    pub fn register(&mut self, pattern: &str, handler: SharedHandler) -> Result<(), RouterError> {
        let parsed = Pattern::parse(pattern).map_err(|e| RouterError::invalid_pattern(pattern, e))?;

        if let Some(existing) = self.entries.iter().find(|entry| parsed.conflicts_with(&entry.pattern)) {
            return Err(RouterError::conflict(&parsed, &existing.pattern));
        }

        let entry = self.entries.len();
        let (routes, wildcards) = matcher_routes(&parsed);

        let methods = self.table.entry(parsed.host().to_string()).or_default();
        let mut layers = methods.get(&parsed.method().cloned()).cloned().unwrap_or_default();
        for (route, exact) in routes {
            layers.insert(&route, Route { entry, exact }).map_err(|e| RouterError::unroutable(pattern, e))?;
        }
        methods.insert(parsed.method().cloned(), layers);

        self.entries.push(Entry { pattern: parsed, handler, wildcards });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registered patterns, in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.pattern.as_str())
    }

    fn resolve(&self, req: &Request) -> Outcome<'_> {
        let method = req.method();
        let raw_path = match req.uri().path() {
            "" => "/",
            "*" => return Outcome::BadRequest,
            path => path,
        };

        let (host, path) = if method == Method::CONNECT {
            (request_host(req).to_string(), raw_path.to_string())
        } else {
            (strip_host_port(request_host(req)).to_string(), clean_path(raw_path))
        };

        let matched = self.find(&host, method, &path);

        let exact = matched.as_ref().is_some_and(|found| found.exact);
        if !exact && !path.ends_with('/') {
            let with_slash = format!("{path}/");
            if self.find(&host, method, &with_slash).is_some_and(|found| found.exact) {
                return Outcome::Redirect(with_query(&with_slash, req));
            }
        }

        if method != Method::CONNECT && path != raw_path {
            return Outcome::Redirect(with_query(&path, req));
        }

        match matched {
            Some(Found { entry, captures, .. }) => Outcome::Matched { entry, captures },
            None => {
                let allowed = self.allowed_methods(&host, &path);
                if allowed.is_empty() { Outcome::NotFound } else { Outcome::MethodNotAllowed(allowed) }
            }
        }
    }

    fn find(&self, host: &str, method: &Method, path: &str) -> Option<Found<'_>> {
        let hosts = if host.is_empty() { vec![""] } else { vec![host, ""] };

        let mut methods = vec![Some(method.clone())];
        if method == Method::HEAD {
            methods.push(Some(Method::GET));
        }
        methods.push(None);

        hosts
            .into_iter()
            .filter_map(|host| self.table.get(host))
            .flat_map(|by_method| methods.iter().filter_map(move |method| by_method.get(method)))
            .find_map(|layers| self.lookup(layers, path))
    }

    /// The most specific entry of one bucket matching `path`.
    fn lookup(&self, layers: &Layers, path: &str) -> Option<Found<'_>> {
        let mut best: Option<Found<'_>> = None;

        for layer in &layers.layers {
            let Ok(matched) = layer.at(path) else {
                continue;
            };
            let Some(entry) = self.entries.get(matched.value.entry) else {
                continue;
            };
            if let Some(current) = &best
                && entry.pattern.compare_paths(&current.entry.pattern) != Relationship::MoreSpecific
            {
                continue;
            }

            let captures = entry
                .wildcards
                .iter()
                .map(|(key, name)| (name.clone(), matched.params.get(key).unwrap_or_default().to_string()))
                .collect();
            best = Some(Found { entry, captures, exact: matched.value.exact });
        }

        best
    }

    /// Methods of the entries whose path matches, used to tell 405 apart from 404.
    fn allowed_methods(&self, host: &str, path: &str) -> Vec<String> {
        let with_slash = format!("{path}/");
        let mut paths = vec![path];
        if !path.ends_with('/') {
            paths.push(&with_slash);
        }

        let mut allowed = BTreeSet::new();
        for by_method in [host, ""].into_iter().filter_map(|host| self.table.get(host)) {
            for (method, layers) in by_method {
                let Some(method) = method else {
                    continue;
                };
                if paths.iter().any(|path| self.lookup(layers, path).is_some()) {
                    allowed.insert(method.as_str().to_string());
                }
            }
        }

        if allowed.contains(Method::GET.as_str()) {
            allowed.insert(Method::HEAD.as_str().to_string());
        }
        allowed.into_iter().collect()
    }
}

#[async_trait]
impl Handler for ServeMux {
    async fn serve(&self, mut req: Request) -> Response {
        let outcome = self.resolve(&req);
        match outcome {
            Outcome::Matched { entry, captures } => {
                trace!(pattern = %entry.pattern, path = req.uri().path(), "matched");
                let handler = SharedHandler::clone(&entry.handler);
                req.extensions_mut().insert(PathParams::from(captures));
                req.extensions_mut().insert(MatchedPattern(entry.pattern.as_str().to_string()));
                handler.serve(req).await
            }
            Outcome::Redirect(location) => {
                trace!(path = req.uri().path(), %location, "redirect");
                redirect(req.method(), &location)
            }
            Outcome::MethodNotAllowed(allowed) => {
                trace!(method = %req.method(), path = req.uri().path(), ?allowed, "method not allowed");
                method_not_allowed(&allowed)
            }
            Outcome::NotFound => {
                trace!(path = req.uri().path(), "not found");
                plain_text(StatusCode::NOT_FOUND, "404 page not found\n")
            }
            Outcome::BadRequest => {
                trace!(method = %req.method(), "asterisk request target");
                bad_request(req.version())
            }
        }
    }
}

impl fmt::Debug for ServeMux {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeMux").field("patterns", &self.patterns().collect::<Vec<_>>()).finish()
    }
}

/// The matcher routes of `pattern`, each flagged exact or not, and its parameter keys.
fn matcher_routes(pattern: &Pattern) -> (Vec<(String, bool)>, Vec<(String, String)>) {
    let mut route = String::new();
    let mut wildcards = Vec::new();

    for (index, segment) in pattern.segments().iter().enumerate() {
        route.push('/');
        match segment {
            Segment::Literal(literal) => route.push_str(&literal.replace('{', "{{").replace('}', "}}")),
            Segment::Single(name) => {
                let key = format!("p{index}");
                route.push('{');
                route.push_str(&key);
                route.push('}');
                wildcards.push((key, name.clone()));
            }
            Segment::End => {}
            Segment::Rest(name) => {
                let key = format!("p{index}");
                let catch_all = format!("{route}{{*{key}}}");
                if let Some(name) = name {
                    wildcards.push((key, name.clone()));
                }
                return (vec![(route, true), (catch_all, false)], wildcards);
            }
        }
    }

    (vec![(route, true)], wildcards)
}

fn request_host(req: &Request) -> &str {
    req.uri()
        .host()
        .or_else(|| req.headers().get(HOST).and_then(|value| value.to_str().ok()))
        .unwrap_or_default()
}

fn with_query(path: &str, req: &Request) -> String {
    match req.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}

fn plain_text(status: StatusCode, text: &'static str) -> Response {
    let mut response = Response::new(Body::from(text));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    insert_content_type(headers, &mime::TEXT_PLAIN_UTF_8);
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// The answer to an asterisk request target, which names no resource.
fn bad_request(version: http::Version) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::BAD_REQUEST;
    if version >= http::Version::HTTP_11 {
        response.headers_mut().insert(CONNECTION, HeaderValue::from_static("close"));
    }
    response
}

fn insert_content_type(headers: &mut HeaderMap, mime: &mime::Mime) {
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        headers.insert(CONTENT_TYPE, value);
    }
}

fn method_not_allowed(allowed: &[String]) -> Response {
    let mut response = plain_text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed\n");
    if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

fn redirect(method: &Method, location: &str) -> Response {
    let body = if method == Method::GET || method == Method::HEAD {
        Body::from(format!("<a href=\"{location}\">Moved Permanently</a>.\n\n"))
    } else {
        Body::empty()
    };

    let mut response = Response::new(body);
    *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
    if let Ok(value) = HeaderValue::from_str(location) {
        response.headers_mut().insert(LOCATION, value);
    }
    if method == Method::GET || method == Method::HEAD {
        insert_content_type(response.headers_mut(), &mime::TEXT_HTML_UTF_8);
    }
    response
}
