//! Answer endpoint handler

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::api::middleware::truncate_for_log;
use crate::api::state::AppState;
use crate::api::types::{AnswerRequest, ApiError, Json};
use crate::domain::crag::{AnswerResult, AnswerStatus, ErrorKind};

/// POST /v1/answer
///
/// Dropping the request (client disconnect) drops the session future, which
/// abandons any in-flight collaborator call.
pub async fn create_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Response, ApiError> {
    if request.query.trim().is_empty() {
        return Err(ApiError::bad_request("Query must not be empty")
            .with_param("query")
            .with_code("invalid_query"));
    }

    info!(
        query = %truncate_for_log(request.query.trim(), 120),
        "Processing answer request"
    );

    let result = state.controller.answer(&request.query).await;

    Ok((status_code(&result), Json(result)).into_response())
}

/// HTTP status for a session outcome; the body is the same in every case
fn status_code(result: &AnswerResult) -> StatusCode {
    match result.status {
        AnswerStatus::Answered | AnswerStatus::Declined => StatusCode::OK,
        AnswerStatus::Error => match result.error_detail.as_ref().map(|d| d.kind) {
            Some(ErrorKind::Generation) => StatusCode::BAD_GATEWAY,
            Some(ErrorKind::InvalidQuery) => StatusCode::BAD_REQUEST,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        },
    }
}
