//! Static assets compiled into the binary.

use axum::http::header;
use axum::response::IntoResponse;

const DASHBOARD_JS: &str = include_str!("../../assets/dashboard.js");
const MAIN_CSS: &str = include_str!("../../assets/main.css");

pub async fn dashboard_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], DASHBOARD_JS)
}

pub async fn main_css() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], MAIN_CSS)
}
