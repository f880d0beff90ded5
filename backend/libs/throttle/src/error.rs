//! Error types for the throttle library

use thiserror::Error;

/// Result type for throttle operations
pub type ThrottleResult<T> = Result<T, ThrottleError>;

/// Errors raised by the throttle store and limiters
///
/// A denied attempt is NOT an error: it is reported as
/// `LimiterDecision { allowed: false, .. }`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThrottleError {
    /// The caller has no identity; nothing was recorded
    #[error("Authentication required")]
    Unauthenticated,

    /// Limit parameters are out of range (zero attempts, non-positive window)
    #[error("Invalid throttle policy: {0}")]
    InvalidPolicy(String),
}
