//! Builds a small router tree and dispatches a few in-memory requests through it.
//!
//! ```text
//! cargo run -p micro-router --example nested_routes
//! ```

use http::Method;
use http_body_util::BodyExt;
use micro_router::middleware::{StripSlashes, from_fn};
use micro_router::{Body, Handler, Request, RequestExt, Response, Router, SharedHandler};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn logged(name: &'static str) -> impl micro_router::Middleware {
    from_fn(move |req: Request, next: SharedHandler| async move {
        info!(middleware = name, path = req.uri().path(), "enter");
        let response = next.serve(req).await;
        info!(middleware = name, status = %response.status(), "exit");
        response
    })
}

async fn show_user(req: Request) -> Response {
    let id = req.path_value("id").unwrap_or_default();
    Response::new(Body::from(format!("user {id}\n")))
}

async fn show_file(req: Request) -> Response {
    let user = req.path_value("id").unwrap_or_default();
    let path = req.path_value("path").unwrap_or_default();
    Response::new(Body::from(format!("file {path} of user {user}\n")))
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut router = Router::new();
    router.use_middleware(logged("root"));
    router.with(logged("health")).handle_fn("GET /health", |_req: Request| async { Response::new(Body::from("ok\n")) });
    router.route("/users", |users| {
        users.use_middleware(StripSlashes);
        users.use_middleware(logged("users"));
        users.handle_fn("GET /{id}", show_user);
        users.group(|files| {
            files.use_middleware(logged("files"));
            files.handle_fn("GET /{id}/files/{path...}", show_file);
        });
    });

    let requests = [
        (Method::GET, "/health"),
        (Method::GET, "/users/42"),
        (Method::GET, "/users/42/"),
        (Method::GET, "/users/42/files/docs/readme.md"),
        (Method::POST, "/users/42"),
        (Method::GET, "/users"),
        (Method::GET, "/nowhere"),
    ];

    for (method, uri) in requests {
        let req = http::Request::builder().method(method.clone()).uri(uri).body(Body::empty()).expect("valid request");
        let response = router.serve(req).await;

        let status = response.status();
        let location = response.headers().get(http::header::LOCATION).cloned();
        let body = response.into_body().collect().await.expect("in-memory body").to_bytes();
        info!(%method, uri, %status, ?location, body = %String::from_utf8_lossy(&body).trim_end(), "dispatched");
    }
}
