use crate::handler::{Handler, Request, Response, SharedHandler};
use crate::middleware::Middleware;
use async_trait::async_trait;
use http::Uri;
use http::uri::PathAndQuery;
use std::sync::Arc;
use tracing::warn;

/// Strips one trailing `/` from the request path before continuing, so `/a/` is routed like `/a`.
///
/// The root path `/` is left untouched. Install it with `use_middleware` on the router that owns
/// the table, it has to run before the pattern lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct StripSlashes;

impl Middleware for StripSlashes {
    fn wrap(&self, next: SharedHandler) -> SharedHandler {
        Arc::new(StripSlashesHandler { next })
    }
}

struct StripSlashesHandler {
    next: SharedHandler,
}

#[async_trait]
impl Handler for StripSlashesHandler {
    async fn serve(&self, mut req: Request) -> Response {
        if let Some(uri) = strip_trailing_slash(req.uri()) {
            *req.uri_mut() = uri;
        }
        self.next.serve(req).await
    }
}

fn strip_trailing_slash(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    if path.len() <= 1 || !path.ends_with('/') {
        return None;
    }

    let stripped = &path[..path.len() - 1];
    let path_and_query = match uri.query() {
        Some(query) => format!("{stripped}?{query}"),
        None => stripped.to_string(),
    };

    let mut parts = uri.clone().into_parts();
    let rebuilt = PathAndQuery::try_from(path_and_query).map_err(http::Error::from).and_then(|path_and_query| {
        parts.path_and_query = Some(path_and_query);
        Uri::from_parts(parts).map_err(http::Error::from)
    });

    match rebuilt {
        Ok(uri) => Some(uri),
        Err(e) => {
            warn!(cause = %e, path, "failed to strip trailing slash");
            None
        }
    }
}
