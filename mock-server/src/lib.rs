use std::collections::BTreeMap;

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Body served by every `meta_{code}.txt` fixture.
pub const VERSION_BODY: &str = "1.0.0";

/// `Authorization` value accepted by `/restricted/*`.
pub const AUTH_TOKEN: &str = "Zm9vOmJhcg==";

/// Response header naming the method of a request no route matched.
pub const SEEN_METHOD_HEADER: &str = "x-seen-method";

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/binary", any(binary))
        .route("/untyped", any(untyped))
        .route("/restricted/{file}", any(restricted))
        .route("/utf-8/{file}", any(utf8))
        .route("/utf-16/{file}", any(utf16))
        .route("/{file}", any(meta))
        .fallback(unrouted)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `meta_{code}.txt` answers with status `code`; DELETE answers 204.
fn fixture(method: &Method, file: &str, content_type: &'static str) -> Response {
    let Some(status) = status_from_file(file) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if *method == Method::DELETE {
        return StatusCode::NO_CONTENT.into_response();
    }
    (status, [(header::CONTENT_TYPE, content_type)], VERSION_BODY).into_response()
}

fn status_from_file(file: &str) -> Option<StatusCode> {
    let code = file.strip_prefix("meta_")?.strip_suffix(".txt")?;
    StatusCode::from_u16(code.parse().ok()?).ok()
}

async fn meta(method: Method, Path(file): Path<String>) -> Response {
    fixture(&method, &file, "text/plain")
}

async fn restricted(method: Method, headers: HeaderMap, Path(file): Path<String>) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|value| value == AUTH_TOKEN);
    if !authorized {
        return StatusCode::FORBIDDEN.into_response();
    }
    fixture(&method, &file, "text/plain")
}

async fn utf8(method: Method, Path(file): Path<String>) -> Response {
    fixture(&method, &file, "text/plain; charset=UTF-8")
}

async fn utf16(method: Method, Path(file): Path<String>) -> Response {
    fixture(&method, &file, "application/json; charset=UTF-16")
}

async fn binary() -> Response {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        vec![0u8, 159, 146, 150],
    )
        .into_response()
}

async fn untyped() -> Response {
    let mut response = VERSION_BODY.into_response();
    response.headers_mut().remove(header::CONTENT_TYPE);
    response
}

/// Answers 404 but reports the method. CONNECT lands here because its
/// request target is authority-form and carries no path.
async fn unrouted(method: Method) -> Response {
    (
        StatusCode::NOT_FOUND,
        [(SEEN_METHOD_HEADER, method.as_str().to_string())],
        format!("no route for {method}"),
    )
        .into_response()
}

async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        headers,
        body,
    })
}
