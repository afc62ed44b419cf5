//! Error handling - maps failures to RFC 7807 envelopes.

use actix_web::http::StatusCode;
use posts_core::{DomainError, StoreError};
use posts_shared::{BodyError, Envelope, ErrorResponse};
use std::fmt;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    BadGateway(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::BadGateway(msg) => write!(f, "Bad gateway: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render as an envelope. Details of server-side failures are logged, not returned.
    pub fn to_envelope(&self, request_id: Option<&str>) -> Envelope {
        let mut error = match self {
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::BadGateway(detail) => {
                tracing::error!(request_id, "Store unavailable: {}", detail);
                ErrorResponse::bad_gateway().with_detail("The backing store is unavailable")
            }
            AppError::Internal(detail) => {
                tracing::error!(request_id, "Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        if let Some(request_id) = request_id {
            error = error.with_request_id(request_id);
        }

        Envelope::problem(&error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} with id {} not found", entity_type, id))
            }
            DomainError::Validation(msg) => AppError::BadRequest(msg),
            DomainError::Store(err) => err.into(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::BadGateway(msg),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<BodyError> for AppError {
    fn from(err: BodyError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("response serialization failed: {}", err))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn body(envelope: &Envelope) -> Value {
        serde_json::from_str(envelope.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn test_domain_errors_map_to_statuses() {
        let cases = [
            (DomainError::post_not_found("1"), 404),
            (DomainError::Validation("bad".into()), 400),
            (StoreError::Unavailable("down".into()).into(), 502),
            (StoreError::Write("rejected".into()).into(), 500),
            (StoreError::Marshal("garbled".into()).into(), 500),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).status().as_u16(), status);
        }
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let envelope = AppError::Internal("secret table arn".into()).to_envelope(Some("req-9"));

        let body = body(&envelope);
        assert_eq!(envelope.status_code, 500);
        assert_eq!(body["request_id"], "req-9");
        assert!(body.get("detail").is_none());
    }

    #[test]
    fn test_not_found_detail_names_the_post() {
        let envelope = AppError::from(DomainError::post_not_found("abc")).to_envelope(None);

        assert_eq!(body(&envelope)["detail"], "post with id abc not found");
    }
}
