//! Recording handlers and middlewares shared by the unit tests.

use crate::handler::{Handler, Request, Response, SharedHandler};
use crate::middleware::Middleware;
use crate::request::RequestExt;
use crate::Body;
use async_trait::async_trait;
use http::Method;
use std::sync::{Arc, Mutex};

/// Collects what handlers and middlewares did, in call order.
#[derive(Debug, Clone, Default)]
pub(crate) struct Trace(Arc<Mutex<String>>);

impl Trace {
    pub(crate) fn push(&self, event: &str) {
        self.0.lock().unwrap().push_str(event);
    }

    pub(crate) fn take(&self) -> String {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    /// a handler recording `{name}h` followed by the `id` and `id2` path values
    pub(crate) fn handler(&self, name: &'static str) -> RecordingHandler {
        RecordingHandler { trace: self.clone(), name }
    }

    /// a middleware recording `{name}1` before and `{name}2` after the inner call
    pub(crate) fn middleware(&self, name: &'static str) -> RecordingMiddleware {
        RecordingMiddleware { trace: self.clone(), name }
    }
}

#[derive(Debug)]
pub(crate) struct RecordingHandler {
    trace: Trace,
    name: &'static str,
}

#[async_trait]
impl Handler for RecordingHandler {
    async fn serve(&self, req: Request) -> Response {
        let id = req.path_value("id").unwrap_or_default();
        let id2 = req.path_value("id2").unwrap_or_default();
        self.trace.push(&format!("{}h{id}{id2}", self.name));
        Response::new(Body::empty())
    }
}

#[derive(Debug)]
pub(crate) struct RecordingMiddleware {
    trace: Trace,
    name: &'static str,
}

impl Middleware for RecordingMiddleware {
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        Arc::new(RecordingLayer { trace: self.trace.clone(), name: self.name, next })
    }
}

struct RecordingLayer {
    trace: Trace,
    name: &'static str,
    next: SharedHandler,
}

#[async_trait]
impl Handler for RecordingLayer {
    async fn serve(&self, req: Request) -> Response {
        self.trace.push(&format!("{}1", self.name));
        let response = self.next.serve(req).await;
        self.trace.push(&format!("{}2", self.name));
        response
    }
}

pub(crate) fn request(method: Method, uri: &str) -> Request {
    http::Request::builder().method(method).uri(uri).body(Body::empty()).unwrap()
}
