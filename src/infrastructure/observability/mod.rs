//! Observability infrastructure - Prometheus metrics and CRAG telemetry hooks

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_crag_grade, record_crag_grade_failure,
    record_crag_rewrite, record_crag_session, record_http_request, PrometheusMetrics,
};
