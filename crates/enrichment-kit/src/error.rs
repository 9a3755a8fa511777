use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Trait for converting errors into HTTP responses.
///
/// Every implementor renders the same envelope, `{"error": "<message>"}`.
///
/// # Example
///
/// ```ignore
/// use enrichment_kit::HttpError;
/// use axum::http::StatusCode;
/// use axum::response::{IntoResponse, Response};
///
/// #[derive(Debug)]
/// enum AppError {
///     MissingField,
/// }
///
/// impl HttpError for AppError {
///     fn status_code(&self) -> StatusCode {
///         StatusCode::BAD_REQUEST
///     }
///
///     fn message(&self) -> &str {
///         "Missing field"
///     }
/// }
///
/// impl IntoResponse for AppError {
///     fn into_response(self) -> Response {
///         self.into_http_response()
///     }
/// }
/// ```
pub trait HttpError: std::fmt::Debug {
    fn status_code(&self) -> StatusCode;
    fn message(&self) -> &str;

    fn into_http_response(self) -> Response
    where
        Self: Sized,
    {
        (self.status_code(), axum::Json(ErrorResponse::new(self.message()))).into_response()
    }
}

/// JSON error envelope shared by handlers, middleware and the fallback route.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    /// Envelope carrying the canonical reason phrase of `status`.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status.canonical_reason().unwrap_or("Error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn serializes_as_error_object() {
        let body = serde_json::to_string(&ErrorResponse::new("Missing transactionId")).unwrap();
        assert_eq!(body, r#"{"error":"Missing transactionId"}"#);
    }

    #[test]
    fn from_status_uses_reason_phrase() {
        assert_eq!(
            ErrorResponse::from_status(StatusCode::NOT_FOUND).error,
            "Not Found"
        );
        assert_eq!(
            ErrorResponse::from_status(StatusCode::INTERNAL_SERVER_ERROR).error,
            "Internal Server Error"
        );
    }

    #[derive(Debug)]
    struct TestError {
        status: StatusCode,
        msg: String,
    }

    impl HttpError for TestError {
        fn status_code(&self) -> StatusCode {
            self.status
        }

        fn message(&self) -> &str {
            &self.msg
        }
    }

    #[tokio::test]
    async fn http_error_into_response() {
        let err = TestError {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            msg: "bad input".to_string(),
        };
        let response = err.into_http_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], br#"{"error":"bad input"}"#);
    }
}
