//! JSON extractor that answers rejections with the API error envelope

use axum::{
    extract::{rejection::JsonRejection as AxumJsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::{ApiErrorDetail, ApiErrorResponse, ApiErrorType};

/// Wrapper around `axum::Json` whose rejections use the API error format
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> std::ops::Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Rejected request body
#[derive(Debug)]
pub struct JsonRejection {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<AxumJsonRejection> for JsonRejection {
    fn from(rejection: AxumJsonRejection) -> Self {
        let (code, message) = match &rejection {
            AxumJsonRejection::JsonDataError(err) => {
                ("invalid_body", format!("Invalid request body: {}", err.body_text()))
            }
            AxumJsonRejection::JsonSyntaxError(err) => {
                ("json_parse_error", format!("Invalid JSON syntax: {}", err.body_text()))
            }
            AxumJsonRejection::MissingJsonContentType(_) => (
                "missing_content_type",
                "Missing Content-Type header. Expected 'application/json'.".to_string(),
            ),
            AxumJsonRejection::BytesRejection(err) => {
                ("unreadable_body", format!("Failed to read request body: {}", err.body_text()))
            }
            _ => ("invalid_body", "Invalid JSON request".to_string()),
        };

        Self {
            status: rejection.status(),
            code,
            message,
        }
    }
}

impl IntoResponse for JsonRejection {
    fn into_response(self) -> Response {
        let response = ApiErrorResponse {
            error: ApiErrorDetail {
                message: self.message,
                error_type: ApiErrorType::InvalidRequestError,
                param: None,
                code: Some(self.code.to_string()),
            },
        };

        (self.status, AxumJson(response)).into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let AxumJson(value) = AxumJson::<T>::from_request(req, state).await?;
        Ok(Json(value))
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}
