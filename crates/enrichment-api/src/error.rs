//! Errors returned by the enrichment handlers.

use axum::extract::rejection::JsonRejection;
use axum::response::{IntoResponse, Response};
use enrichment_kit::{HttpError, StatusCode};
use std::fmt;

#[derive(Debug)]
pub enum ApiError {
    /// Valid JSON, but no usable `transactionId`.
    MissingTransactionId,
    /// Body is not JSON. Carries the parser detail for logs.
    MalformedBody(String),
    /// Body could not be buffered, e.g. it exceeds the size limit.
    UnreadableBody { status: StatusCode, detail: String },
    /// `Content-Type` is not `application/json`.
    UnsupportedMediaType,
}

impl HttpError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingTransactionId | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::UnreadableBody { status, .. } => *status,
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::MissingTransactionId => "Missing transactionId",
            Self::MalformedBody(_) => "Invalid JSON body",
            Self::UnsupportedMediaType => "Expected request with Content-Type: application/json",
            Self::UnreadableBody { status, .. } => {
                status.canonical_reason().unwrap_or("Unreadable request body")
            }
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedBody(detail) | Self::UnreadableBody { detail, .. } => {
                write!(f, "{}: {}", self.message(), detail)
            }
            _ => f.write_str(self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            // Well-formed JSON of the wrong shape: a non-object body or a non-string id.
            JsonRejection::JsonDataError(_) => Self::MissingTransactionId,
            JsonRejection::MissingJsonContentType(_) => Self::UnsupportedMediaType,
            JsonRejection::BytesRejection(rejection) => Self::UnreadableBody {
                status: rejection.status(),
                detail: rejection.body_text(),
            },
            other => Self::MalformedBody(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}
