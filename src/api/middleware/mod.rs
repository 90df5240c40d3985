//! API middleware components

pub mod logging;
pub mod metrics;

use axum::{body::Body, extract::MatchedPath, http::Request};

pub use logging::{logging_middleware, truncate_for_log};
pub use metrics::metrics_middleware;

/// Matched route template when available, so label cardinality stays bounded
fn route_path(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_path_falls_back_to_uri() {
        let request = Request::builder()
            .uri("/v1/answer?debug=1")
            .body(Body::empty())
            .unwrap();

        assert_eq!(route_path(&request), "/v1/answer");
    }
}
