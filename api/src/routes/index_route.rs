//! Chat page and its script, compiled into the binary.

use axum::{http::header, response::{Html, IntoResponse}};

const INDEX_HTML: &str = include_str!("../../static/index.html");
const SCRIPT_JS: &str = include_str!("../../static/script.js");

/// Handler: GET /
pub async fn index_route() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Handler: GET /static/script.js
pub async fn script_route() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}
