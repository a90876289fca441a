//! The composition layer: routers, sub-routers, groups and inline middleware.
//!
//! A [`Router`] owns a path prefix, two middleware lists and a reference to a shared
//! [`ServeMux`]. Middleware added with [`Router::use_middleware`] on a router runs around its
//! whole table, on every request reaching it, matched or not. Middleware added through
//! [`Router::with`] or inside [`Router::group`] is captured per handler at registration time and
//! only runs when that handler is selected.
//!
//! ```
//! use micro_router::{Body, Request, Response, Router};
//!
//! let mut router = Router::new();
//! router.route("/users", |users| {
//!     users.handle_fn("GET /{id}", |_req: Request| async { Response::new(Body::from("user")) });
//! });
//! ```

use crate::error::{PatternError, RouterError};
use crate::handler::{Handler, Request, Response, SharedHandler, handler_fn};
use crate::middleware::{Middleware, SharedMiddleware, chain};
use crate::mux::ServeMux;
use crate::path::join_prefix_and_pattern;
use crate::pattern::{join_method_and_pattern, split_method_and_pattern};
use arc_swap::ArcSwap;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Where a router value is in its registration lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouterState {
    /// nothing registered yet, `use_middleware` adds subtree middleware
    Fresh,
    /// a handler or sub-router has been registered, `use_middleware` is rejected
    Registering,
    /// produced by `with` or `group`, `use_middleware` adds handler middleware
    Scoped,
}

pub struct Router {
    prefix: String,
    handler_middlewares: Vec<SharedMiddleware>,
    subtree_middlewares: Arc<Vec<SharedMiddleware>>,
    mux: Arc<ArcSwap<ServeMux>>,
    state: RouterState,
}

impl Router {
    /// Creates a root router with an empty prefix and an empty table.
    pub fn new() -> Self {
        Self::mounted_at(String::new())
    }

    fn mounted_at(prefix: String) -> Self {
        Self {
            prefix,
            handler_middlewares: Vec::new(),
            subtree_middlewares: Arc::new(Vec::new()),
            mux: Arc::new(ArcSwap::from_pointee(ServeMux::new())),
            state: RouterState::Fresh,
        }
    }

    /// The prefix prepended to every pattern registered through this router.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Appends a middleware.
    ///
    /// On a router produced by [`with`](Self::with) or [`group`](Self::group) the middleware
    /// applies to the handlers registered afterwards through that same value. Otherwise it wraps
    /// the router's whole table and runs for every request reaching the router.
    ///
    /// # Panics
    /// Panics when a handler or sub-router has already been registered on this (non-scoped)
    /// router. See [`try_use_middleware`](Self::try_use_middleware).
    pub fn use_middleware<M>(&mut self, middleware: M) -> &mut Self
    where
        M: Middleware + 'static,
    {
        if let Err(e) = self.try_use_middleware(middleware) {
            panic!("{e}");
        }
        self
    }

    /// Fallible variant of [`use_middleware`](Self::use_middleware).
    ///
    /// # Errors
    /// [`RouterError::MiddlewareAfterRoute`] once this router has started registering.
    pub fn try_use_middleware<M>(&mut self, middleware: M) -> Result<&mut Self, RouterError>
    where
        M: Middleware + 'static,
    {
        let middleware: SharedMiddleware = Arc::new(middleware);
        match self.state {
            RouterState::Registering => return Err(RouterError::middleware_after_route(&self.prefix)),
            RouterState::Scoped => {
                debug!(prefix = %self.prefix, "adding handler middleware");
                self.handler_middlewares.push(middleware);
            }
            RouterState::Fresh => {
                debug!(prefix = %self.prefix, "adding subtree middleware");
                Arc::make_mut(&mut self.subtree_middlewares).push(middleware);
            }
        }
        Ok(self)
    }

    /// Returns a scoped copy of this router whose handlers are additionally wrapped by `middleware`.
    ///
    /// The copy shares the prefix and the table, so handlers registered through it are served by
    /// this router. This router itself is left unchanged.
    pub fn with<M>(&self, middleware: M) -> Router
    where
        M: Middleware + 'static,
    {
        let mut scoped = self.scoped();
        scoped.handler_middlewares.push(Arc::new(middleware));
        scoped
    }

    /// Runs `f` with a scoped copy of this router.
    ///
    /// Middleware added inside `f` stays local to the handlers registered there.
    pub fn group<F>(&self, f: F)
    where
        F: FnOnce(&mut Router),
    {
        let mut scoped = self.scoped();
        f(&mut scoped);
    }

    fn scoped(&self) -> Router {
        Router {
            prefix: self.prefix.clone(),
            handler_middlewares: self.handler_middlewares.clone(),
            subtree_middlewares: Arc::clone(&self.subtree_middlewares),
            mux: Arc::clone(&self.mux),
            state: RouterState::Scoped,
        }
    }

    /// Mounts a sub-router below `pattern`.
    ///
    /// A trailing `/` is appended to `pattern` when missing. The sub-router starts with its own
    /// empty middleware lists and table, `f` populates it, then it is registered in this router's
    /// table as a subtree handler.
    ///
    /// # Panics
    /// Panics on an empty or invalid pattern, or one that conflicts with a registered pattern.
    pub fn route<F>(&mut self, pattern: &str, f: F) -> &mut Self
    where
        F: FnOnce(&mut Router),
    {
        if let Err(e) = self.try_route(pattern, f) {
            panic!("{e}");
        }
        self
    }

    /// Fallible variant of [`route`](Self::route).
    ///
    /// # Errors
    /// [`RouterError::InvalidPattern`], [`RouterError::Conflict`] or [`RouterError::Unroutable`]
    /// when the sub-router's prefix cannot be registered.
    pub fn try_route<F>(&mut self, pattern: &str, f: F) -> Result<&mut Self, RouterError>
    where
        F: FnOnce(&mut Router),
    {
        if pattern.is_empty() {
            return Err(RouterError::invalid_pattern(pattern, PatternError::Empty));
        }

        let prefix = if pattern.ends_with('/') {
            join_prefix_and_pattern(&self.prefix, pattern)
        } else {
            join_prefix_and_pattern(&self.prefix, &format!("{pattern}/"))
        };

        let mut sub_router = Router::mounted_at(prefix);
        f(&mut sub_router);

        let key = sub_router.prefix.clone();
        debug!(prefix = %key, "mounting sub router");
        self.register(&key, Arc::new(sub_router))?;
        Ok(self)
    }

    /// Registers `handler` under `pattern` (`[METHOD ][HOST]/PATH`), below this router's prefix.
    ///
    /// # Panics
    /// Panics on an invalid pattern, or one that conflicts with a registered pattern.
    pub fn handle<H>(&mut self, pattern: &str, handler: H) -> &mut Self
    where
        H: Handler + 'static,
    {
        if let Err(e) = self.try_handle(pattern, handler) {
            panic!("{e}");
        }
        self
    }

    /// Registers an async function as the handler for `pattern`.
    ///
    /// # Panics
    /// See [`handle`](Self::handle).
    pub fn handle_fn<F, Fut>(&mut self, pattern: &str, f: F) -> &mut Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.handle(pattern, handler_fn(f))
    }

    /// Fallible variant of [`handle`](Self::handle).
    ///
    /// # Errors
    /// [`RouterError::InvalidPattern`], [`RouterError::Conflict`] or [`RouterError::Unroutable`].
    pub fn try_handle<H>(&mut self, pattern: &str, handler: H) -> Result<&mut Self, RouterError>
    where
        H: Handler + 'static,
    {
        let (method, path) = split_method_and_pattern(pattern);
        let key = join_method_and_pattern(method, &join_prefix_and_pattern(&self.prefix, path));

        debug!(pattern = %key, middlewares = self.handler_middlewares.len(), "registering handler");
        let handler = chain(&self.handler_middlewares, Arc::new(handler));
        self.register(&key, handler)?;
        Ok(self)
    }

    fn register(&mut self, key: &str, handler: SharedHandler) -> Result<(), RouterError> {
        let mut mux = ServeMux::clone(&self.mux.load());
        mux.register(key, handler)?;
        self.mux.store(Arc::new(mux));

        if self.state == RouterState::Fresh {
            self.state = RouterState::Registering;
        }
        Ok(())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for Router {
    async fn serve(&self, req: Request) -> Response {
        let mux: SharedHandler = self.mux.load_full();
        chain(&self.subtree_middlewares, mux).serve(req).await
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("prefix", &self.prefix)
            .field("state", &self.state)
            .field("handler_middlewares", &self.handler_middlewares.len())
            .field("subtree_middlewares", &self.subtree_middlewares.len())
            .field("mux", &*self.mux.load())
            .finish()
    }
}
