//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`vlib_common::Error`] so that route handlers
//! can return `Result<T, AppError>` and use `?` directly.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vlib_common::Error;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: Error,
}

impl AppError {
    pub fn new(inner: Error) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Error {
        &self.inner
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Range failures carry no body, only the resource length.
        if let Error::InvalidRange { total } = self.inner {
            return (
                status,
                [(header::CONTENT_RANGE, format!("bytes */{total}"))],
            )
                .into_response();
        }

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let code = match &self.inner {
            Error::NotFound(_) => "not_found",
            Error::InvalidInput(_) => "invalid_input",
            Error::Configuration(_) => "configuration_error",
            Error::Database(_) => "database_error",
            Error::Io(_) | Error::StreamIo(_) => "io_error",
            Error::MetadataLookup(_) => "metadata_error",
            Error::InvalidRange { .. } | Error::Internal(_) => "internal_error",
        };

        let body = json!({
            "error": self.inner.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn not_found_produces_404() {
        let response = AppError::new(Error::not_found("video 1")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_range_produces_empty_416() {
        let response = AppError::new(Error::invalid_range(1000)).into_response();
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert_eq!(
            response.headers().get(header::CONTENT_RANGE).unwrap(),
            "bytes */1000"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn database_error_produces_500() {
        let response = AppError::new(Error::database("locked")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
