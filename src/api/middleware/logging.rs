//! Request logging

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::{info, warn};

use super::route_path;

/// Headers worth a log line; credentials are logged as `[REDACTED]`
const LOGGED_HEADERS: &[(&str, bool)] = &[
    ("content-type", false),
    ("content-length", false),
    ("user-agent", false),
    ("x-forwarded-for", false),
    ("authorization", true),
    ("x-api-key", true),
];

/// Log each request and its outcome
///
/// `TraceLayer` owns the request span; this middleware only emits events.
/// Server errors are logged at `warn`, everything else at `info`.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = route_path(&request);
    let request_id = request_id(&request);

    info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        headers = %loggable_headers(&request),
        "Incoming request"
    );

    let response = next.run(request).await;

    let duration_ms = start.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        warn!(method = %method, path = %path, status, duration_ms, request_id = %request_id, "Request failed");
    } else {
        info!(method = %method, path = %path, status, duration_ms, request_id = %request_id, "Request completed");
    }

    response
}

/// Caller-supplied `x-request-id`, or a fresh one
fn request_id(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

fn loggable_headers(request: &Request<Body>) -> String {
    LOGGED_HEADERS
        .iter()
        .filter_map(|&(name, redact)| {
            let value = request.headers().get(name)?;
            let value = if redact {
                "[REDACTED]"
            } else {
                value.to_str().unwrap_or("[invalid]")
            };
            Some(format!("{}={}", name, value))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Truncate long strings for logging, on a character boundary
pub fn truncate_for_log(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((cut, _)) => {
            let remaining = s[cut..].chars().count();
            format!("{}...[truncated {} chars]", &s[..cut], remaining)
        }
    }
}
