use crate::config::Config;
use lambda_http::http::header::{HeaderValue, VARY};
use lambda_http::{Body, Response};

/// Origin to echo back: `*` when any origin is allowed, the request origin
/// when it is on the list, otherwise the first configured origin.
pub fn cors_origin(config: &Config, request_origin: Option<&str>) -> String {
    let allowed = &config.cors_allowed_origins;
    if allowed.iter().any(|o| o == "*") {
        return "*".to_string();
    }

    match request_origin.map(|o| o.trim_end_matches('/')) {
        Some(origin) if allowed.iter().any(|o| o == origin) => origin.to_string(),
        _ => allowed.first().cloned().unwrap_or_else(|| "*".to_string()),
    }
}

pub fn with_cors_headers(mut resp: Response<Body>, origin: &str) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_str(origin).unwrap_or_else(|_| HeaderValue::from_static("*")),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization"),
    );
    if origin != "*" {
        headers.append(VARY, HeaderValue::from_static("Origin"));
    }
    resp
}
