//! A composable request router.
//!
//! Routers nest: [`Router::route`] mounts a sub-router below a path prefix, [`Router::with`] and
//! [`Router::group`] scope middleware to a set of handlers, and every router is itself a
//! [`Handler`]. Pattern matching, precedence, redirects and `404`/`405` answers are provided by
//! [`ServeMux`].
//!
//! # Example
//! ```
//! use micro_router::middleware::from_fn;
//! use micro_router::{Body, Handler, Request, RequestExt, Response, Router, SharedHandler};
//!
//! let mut router = Router::new();
//! router.use_middleware(from_fn(|req: Request, next: SharedHandler| async move {
//!     tracing::info!(path = req.uri().path(), "request");
//!     next.serve(req).await
//! }));
//! router.route("/users", |users| {
//!     users.handle_fn("GET /{id}", |req: Request| async move {
//!         let id = req.path_value("id").unwrap_or_default().to_string();
//!         Response::new(Body::from(id))
//!     });
//! });
//! ```

mod body;
mod handler;
mod mux;
mod path;
mod pattern;
mod request;
mod router;

pub mod error;
pub mod middleware;

#[cfg(test)]
mod testing;

pub use body::Body;
pub use body::BoxError;
pub use error::PatternError;
pub use error::RouterError;
pub use handler::Handler;
pub use handler::HandlerFn;
pub use handler::Request;
pub use handler::Response;
pub use handler::SharedHandler;
pub use handler::handler_fn;
pub use middleware::Middleware;
pub use middleware::SharedMiddleware;
pub use middleware::chain;
pub use mux::ServeMux;
pub use path::clean_path;
pub use path::join_prefix_and_pattern;
pub use pattern::Pattern;
pub use pattern::join_method_and_pattern;
pub use pattern::split_method_and_pattern;
pub use request::MatchedPattern;
pub use request::PathParams;
pub use request::RequestExt;
pub use router::Router;
