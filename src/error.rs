//! Error taxonomy and the JSON error envelope
//!
//! Every failure leaves the service as `{message, timestamp, status, path}`;
//! validation failures additionally carry a field-level `errors` array.
//! Handlers and middleware construct an `AppError`; the outermost
//! `error_envelope` layer rewrites it with the request path attached.

use axum::{
    Json,
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::json;

use crate::domain::person::FieldError;

/// Stable failure reasons surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed or missing input (400)
    Validation,
    /// Missing or malformed token (401)
    Unauthenticated,
    /// Token valid but role insufficient, or no decision obtainable (403)
    Forbidden,
    /// Resource not found (404)
    NotFound,
    /// Email or document collides with an existing record (409)
    Conflict,
    /// A collaborator is unreachable or erroring (503)
    DependencyUnavailable,
}

impl ErrorCode {
    /// HTTP status for this error
    pub fn status(self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Conflict => StatusCode::CONFLICT,
            Self::DependencyUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Default message for this error
    pub fn default_message(self) -> &'static str {
        match self {
            Self::Validation => "Validation failed",
            Self::Unauthenticated => "Authentication required",
            Self::Forbidden => "Permission denied",
            Self::NotFound => "Resource not found",
            Self::Conflict => "Resource already exists",
            Self::DependencyUnavailable => "Dependency unavailable",
        }
    }
}

/// Unified service error. Never retried, never swallowed.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl AppError {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().into(),
            errors: Vec::new(),
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Wrap the first failing validation check.
    pub fn validation(err: FieldError) -> Self {
        Self {
            code: ErrorCode::Validation,
            message: err.message.into(),
            errors: vec![err],
        }
    }
}

/// Error payload stashed in response extensions so the envelope layer can
/// re-render it with the request path.
#[derive(Debug, Clone)]
pub struct ErrorPayload {
    pub message: String,
    pub errors: Vec<FieldError>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.code.status();
        let payload = ErrorPayload {
            message: self.message,
            errors: self.errors,
        };

        let mut body = json!({
            "message": &payload.message,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "status": status.as_u16(),
        });
        if !payload.errors.is_empty() {
            body["errors"] = serde_json::to_value(&payload.errors).unwrap_or_default();
        }

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(payload);
        response
    }
}

/// Outermost layer: rewrite failures into the standard envelope with the
/// request path and method attached.
pub async fn error_envelope(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let method = request.method().clone();

    let response = next.run(request).await;

    let Some(payload) = response.extensions().get::<ErrorPayload>().cloned() else {
        return response;
    };

    let status = response.status();
    let mut body = json!({
        "message": &payload.message,
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "status": status.as_u16(),
        "path": format!("{path}({method})"),
    });
    if !payload.errors.is_empty() {
        body["errors"] = serde_json::to_value(&payload.errors).unwrap_or_default();
    }

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ErrorCode::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::DependencyUnavailable.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn validation_error_carries_field_breakdown() {
        let err = AppError::validation(FieldError {
            field: "names",
            message: "Names required",
        });
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "names");
    }
}
