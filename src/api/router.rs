use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::state::AppState;
use super::v1;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Create the full router with application state
///
/// `/metrics` is mounted only when a Prometheus recorder was installed.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest("/v1", v1::create_v1_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::domain::crag::{
        CragConfig, MockAnswerGenerator, MockQueryRewriter, MockRelevanceGrader, RelevanceLabel,
    };
    use crate::domain::retrieval::{Candidate, Citation, MockRetrieverGateway, ScriptedRetriever};
    use crate::domain::DomainError;
    use crate::infrastructure::crag::CragController;

    fn app(retriever: Arc<dyn crate::domain::retrieval::RetrieverGateway>) -> Router {
        let controller = CragController::new(
            retriever,
            Arc::new(MockRelevanceGrader::new().with_default(RelevanceLabel::Relevant)),
            Arc::new(MockQueryRewriter::new()),
            Arc::new(MockAnswerGenerator::new()),
            CragConfig::default(),
        );
        create_router(AppState::new(controller), None)
    }

    fn scripted() -> Arc<ScriptedRetriever> {
        Arc::new(ScriptedRetriever::new().with_round(vec![Candidate::new(
            "p1",
            "يلتزم المؤجر بتسليم العين المؤجرة",
            0.91,
            Citation::new("القانون المدني", "564"),
        )]))
    }

    fn failing_retriever() -> MockRetrieverGateway {
        let mut retriever = MockRetrieverGateway::new();
        retriever
            .expect_search()
            .returning(|_, _| Err(DomainError::retrieval("connection refused")));
        retriever
            .expect_health_check()
            .returning(|| Err(DomainError::retrieval("connection refused")));
        retriever.expect_gateway_name().return_const("qdrant");
        retriever
    }

    fn post_answer(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/answer")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(scripted())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reflects_vector_index() {
        let response = app(scripted())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(Arc::new(failing_retriever()))
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = json_body(response).await;
        assert_eq!(body["checks"][0]["name"], "qdrant");
        assert_eq!(body["checks"][0]["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_answer_endpoint() {
        let response = app(scripted())
            .oneshot(post_answer(r#"{"query": "ما التزامات المؤجر؟"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ANSWERED");
        assert_eq!(body["citations"][0]["article_ref"], "564");
        assert_eq!(body["trace"]["retrieval_rounds"], 1);
    }

    #[tokio::test]
    async fn test_answer_declined_is_ok() {
        let response = app(Arc::new(ScriptedRetriever::new()))
            .oneshot(post_answer(r#"{"query": "سؤال بلا مصادر"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "DECLINED");
        assert_eq!(body["trace"]["rewrite_attempts"], 2);
    }

    #[tokio::test]
    async fn test_answer_retrieval_failure_is_unavailable() {
        let response = app(Arc::new(failing_retriever()))
            .oneshot(post_answer(r#"{"query": "سؤال"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ERROR");
        assert_eq!(body["error_detail"]["kind"], "retrieval");
    }

    #[tokio::test]
    async fn test_empty_query_is_bad_request() {
        let response = app(scripted())
            .oneshot(post_answer(r#"{"query": "   "}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["type"], "invalid_request_error");
        assert_eq!(body["error"]["param"], "query");
    }

    #[tokio::test]
    async fn test_malformed_json_uses_error_envelope() {
        let response = app(scripted())
            .oneshot(post_answer("{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "json_parse_error");
    }

    #[tokio::test]
    async fn test_metrics_route_absent_without_recorder() {
        let response = app(scripted())
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
