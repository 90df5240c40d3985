//! HTTP metrics middleware

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use super::route_path;
use crate::infrastructure::observability::record_http_request;

/// Paths that are scraped or probed too often to be worth a sample
const UNMEASURED_PATHS: &[&str] = &["/metrics", "/health", "/live"];

/// Record method, route, status and latency of each request
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let path = route_path(&request);
    if UNMEASURED_PATHS.contains(&path.as_str()) {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().clone();

    let response = next.run(request).await;

    record_http_request(
        method.as_str(),
        &path,
        response.status().as_u16(),
        start.elapsed(),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_paths_are_unmeasured() {
        assert!(UNMEASURED_PATHS.contains(&"/metrics"));
        assert!(!UNMEASURED_PATHS.contains(&"/v1/answer"));
    }
}
