use crate::body::Body;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub type Request = http::Request<Body>;
pub type Response = http::Response<Body>;

/// Produces a response for a request.
///
/// Leaf endpoints, middleware-wrapped endpoints, the mux and whole routers are all handlers,
/// so they nest freely.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn serve(&self, req: Request) -> Response;
}

pub type SharedHandler = Arc<dyn Handler>;

#[async_trait]
impl<H: Handler + ?Sized> Handler for Arc<H> {
    async fn serve(&self, req: Request) -> Response {
        (**self).serve(req).await
    }
}

/// a `Fn(Request) -> impl Future<Output = Response>` holder
pub struct HandlerFn<F> {
    f: F,
}

impl<F> fmt::Debug for HandlerFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    async fn serve(&self, req: Request) -> Response {
        (self.f)(req).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Response> + Send + 'static,
{
    HandlerFn { f }
}
