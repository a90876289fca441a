//! Middleware: transforms from one handler into another.
//!
//! A middleware wraps the next handler, it may run code before delegating inward and after the
//! inner call returns. [`chain`] nests a list of middlewares around a handler so that the first
//! middleware of the list becomes the outermost layer:
//!
//! ```text
//! chain([m1, m2, m3], h) == m1(m2(m3(h)))
//! ```

mod strip_slashes;

pub use strip_slashes::StripSlashes;

use crate::handler::{Handler, Request, Response, SharedHandler};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A middleware that can wrap a handler to another
pub trait Middleware: Send + Sync {
    /// wrap the handler to another
    fn wrap(&self, next: SharedHandler) -> SharedHandler;
}

pub type SharedMiddleware = Arc<dyn Middleware>;

impl<F> Middleware for F
where
    F: Fn(SharedHandler) -> SharedHandler + Send + Sync,
{
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        self(next)
    }
}

/// Composes `middlewares` around `handler`, the first middleware ends up outermost.
pub fn chain(middlewares: &[SharedMiddleware], handler: SharedHandler) -> SharedHandler {
    middlewares.iter().rev().fold(handler, |next, middleware| middleware.wrap(next))
}

/// Creates a middleware from an around-function receiving the request and the next handler.
///
/// # Example
/// ```
/// use micro_router::middleware::from_fn;
/// use micro_router::{Handler, Request, SharedHandler};
///
/// let timing = from_fn(|req: Request, next: SharedHandler| async move {
///     let started = std::time::Instant::now();
///     let response = next.serve(req).await;
///     println!("served in {:?}", started.elapsed());
///     response
/// });
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Request, SharedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FnMiddleware { f: Arc::new(f) }
}

pub struct FnMiddleware<F> {
    f: Arc<F>,
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware").finish_non_exhaustive()
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, SharedHandler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        Arc::new(FnMiddlewareHandler { f: Arc::clone(&self.f), next })
    }
}

struct FnMiddlewareHandler<F> {
    f: Arc<F>,
    next: SharedHandler,
}

#[async_trait]
impl<F, Fut> Handler for FnMiddlewareHandler<F>
where
    F: Fn(Request, SharedHandler) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn serve(&self, req: Request) -> Response {
        (self.f)(req, Arc::clone(&self.next)).await
    }
}
