//! REST API types.
//!
//! A successful upload returns [`crate::models::ClimbingSummary`] as-is.
//! Failures return an [`ErrorResponse`] whose `kind` and `line` point at the
//! offending row.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CsvError, PipelineError, RowError, ServerError};

/// Body returned when an upload cannot be summarized.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Upload id, as logged in the log stream when the upload was accepted
    pub request_id: String,

    /// Always "error"
    pub status: String,

    /// Machine-readable failure category
    pub kind: String,

    /// Human-readable message
    pub error: String,

    /// CSV line of the offending record, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl ErrorResponse {
    pub fn new(kind: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            status: "error".to_string(),
            kind: kind.into(),
            error: error.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id.to_string();
        self
    }
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Csv(CsvError::IoError(_))) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Pipeline(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Config(_) | ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error body for this error.
    pub fn to_response(&self) -> ErrorResponse {
        let message = self.to_string();
        match self {
            ServerError::BadRequest(_) => ErrorResponse::new("bad_request", message),
            ServerError::Pipeline(PipelineError::Row(row)) => {
                let kind = match row {
                    RowError::MalformedGrade { .. } => "malformed_grade",
                    RowError::MalformedField { .. } => "malformed_field",
                    RowError::UnsupportedSchema { .. } => "unsupported_schema",
                };
                ErrorResponse::new(kind, message).with_line(row.line())
            }
            ServerError::Pipeline(PipelineError::Csv(CsvError::MissingColumns(_))) => {
                ErrorResponse::new("unsupported_schema", message)
            }
            ServerError::Pipeline(PipelineError::Csv(CsvError::ParseError { line, .. })) => {
                ErrorResponse::new("malformed_csv", message).with_line(*line)
            }
            ServerError::Pipeline(PipelineError::Csv(_)) => {
                ErrorResponse::new("malformed_csv", message)
            }
            ServerError::Pipeline(PipelineError::Aggregate(_)) => {
                ErrorResponse::new("mixed_grade_families", message)
            }
            ServerError::Config(_) | ServerError::Io(_) => ErrorResponse::new("internal", message),
        }
    }
}

impl ServerError {
    /// Response for a failed upload, tagged with its upload id.
    pub fn into_response_for(self, request_id: Uuid) -> Response {
        let body = self.to_response().with_request_id(request_id);
        (self.status(), Json(body)).into_response()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_response())).into_response()
    }
}
