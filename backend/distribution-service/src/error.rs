/// Error types for Distribution Service
///
/// Errors are converted to HTTP responses at the handler edge. A rate-limited
/// attempt is modeled as `RateLimited` only there; inside the core it is an
/// ordinary `allowed = false` decision.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;
use throttle::{RetryUnit, ThrottleError};

/// Result type for distribution-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed content or sponsored item, or bad request input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Caller has no identity
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Attempt denied by a throttle
    #[error("Rate limit exceeded, try again in {retry_after} {}", .unit.as_str())]
    RateLimited { retry_after: u64, unit: RetryUnit },

    /// Persistence collaborator failed
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Repository(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        if let AppError::RateLimited { retry_after, unit } = self {
            let field = match unit {
                RetryUnit::Seconds => "retry_after_seconds",
                RetryUnit::Minutes => "retry_after_minutes",
            };
            body[field] = serde_json::json!(retry_after);
        }

        let mut response = HttpResponse::build(status);
        if let AppError::RateLimited { retry_after, unit } = self {
            let seconds = match unit {
                RetryUnit::Seconds => *retry_after,
                RetryUnit::Minutes => retry_after * 60,
            };
            response.insert_header(("Retry-After", seconds.to_string()));
        }
        response.json(body)
    }
}

impl From<ThrottleError> for AppError {
    fn from(err: ThrottleError) -> Self {
        match err {
            ThrottleError::Unauthenticated => {
                AppError::Unauthenticated("authentication required".to_string())
            }
            ThrottleError::InvalidPolicy(msg) => AppError::Config(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::RateLimited {
                retry_after: 3,
                unit: RetryUnit::Minutes
            }
            .status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::Repository("x".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_rate_limited_message_names_the_wait() {
        let err = AppError::RateLimited {
            retry_after: 12,
            unit: RetryUnit::Minutes,
        };
        assert_eq!(err.to_string(), "Rate limit exceeded, try again in 12 minutes");
    }

    #[test]
    fn test_throttle_error_conversion() {
        assert!(matches!(
            AppError::from(ThrottleError::Unauthenticated),
            AppError::Unauthenticated(_)
        ));
        assert!(matches!(
            AppError::from(ThrottleError::InvalidPolicy("bad".into())),
            AppError::Config(_)
        ));
    }
}
