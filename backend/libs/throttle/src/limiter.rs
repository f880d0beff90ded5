//! Configured limiters over a shared [`ThrottleStore`]
//!
//! A [`RateLimiter`] binds one policy (attempts per window) and one action name
//! to the store. Keys are namespaced as `"{action}:{subject}"` so several
//! limiters can share a store without colliding.
//!
//! The event-creation limiter is the same state machine with a fixed policy
//! (5 attempts per hour) that reports its retry delay in whole minutes.

use crate::clock::SharedClock;
use crate::error::{ThrottleError, ThrottleResult};
use crate::metrics::ThrottleMetrics;
use crate::store::ThrottleStore;
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, warn};

/// Action name used for the event-creation limiter
pub const EVENT_CREATE_ACTION: &str = "event_create";
const EVENT_CREATE_MAX_ATTEMPTS: u32 = 5;
const EVENT_CREATE_WINDOW_SECONDS: u64 = 60 * 60;

/// Unit used when presenting the retry delay to a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryUnit {
    Seconds,
    Minutes,
}

impl RetryUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryUnit::Seconds => "seconds",
            RetryUnit::Minutes => "minutes",
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Namespace for keys and label for metrics
    pub action: String,
    /// Maximum number of attempts per window
    pub max_attempts: u32,
    /// Window length in seconds
    pub window_seconds: u64,
    /// How the retry delay is reported to callers
    pub retry_unit: RetryUnit,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            action: "write".to_string(),
            max_attempts: 100,
            window_seconds: 900, // 15 minutes
            retry_unit: RetryUnit::Seconds,
        }
    }
}

impl RateLimitConfig {
    /// Fixed policy for event creation: 5 per hour, reported in minutes
    pub fn event_creation() -> Self {
        Self {
            action: EVENT_CREATE_ACTION.to_string(),
            max_attempts: EVENT_CREATE_MAX_ATTEMPTS,
            window_seconds: EVENT_CREATE_WINDOW_SECONDS,
            retry_unit: RetryUnit::Minutes,
        }
    }

    /// Window as a duration; lengths chrono cannot represent are rejected
    pub fn window(&self) -> ThrottleResult<Duration> {
        i64::try_from(self.window_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                ThrottleError::InvalidPolicy(format!(
                    "window of {}s is out of range",
                    self.window_seconds
                ))
            })
    }
}

/// Result of a limiter check, ready for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimiterDecision {
    pub allowed: bool,
    /// Exact remaining window in whole seconds (denied only)
    pub retry_after_seconds: Option<u64>,
    pub unit: RetryUnit,
}

impl LimiterDecision {
    /// Retry delay expressed in the limiter's display unit, rounded up
    pub fn retry_after(&self) -> Option<u64> {
        self.retry_after_seconds.map(|secs| match self.unit {
            RetryUnit::Seconds => secs,
            RetryUnit::Minutes => secs.div_ceil(60),
        })
    }
}

/// Limiter bound to one policy over a shared store
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<ThrottleStore>,
    clock: SharedClock,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, store: Arc<ThrottleStore>, clock: SharedClock) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    /// Event-creation limiter sharing `store`
    pub fn event_creation(store: Arc<ThrottleStore>, clock: SharedClock) -> Self {
        Self::new(RateLimitConfig::event_creation(), store, clock)
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Record an attempt by `subject`
    ///
    /// A missing or blank subject fails closed with
    /// [`ThrottleError::Unauthenticated`] and records nothing.
    pub fn check(&self, subject: Option<&str>) -> ThrottleResult<LimiterDecision> {
        let subject = match subject.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => {
                warn!(action = %self.config.action, "Throttle check without identity, refusing");
                ThrottleMetrics::record_decision(&self.config.action, "unauthenticated");
                return Err(ThrottleError::Unauthenticated);
            }
        };

        let key = self.key_for(subject);
        let decision = self.store.check(
            &key,
            self.config.max_attempts,
            self.config.window()?,
            self.clock.now(),
        )?;

        let result = LimiterDecision {
            allowed: decision.allowed,
            retry_after_seconds: decision.retry_after_seconds,
            unit: self.config.retry_unit,
        };

        if result.allowed {
            ThrottleMetrics::record_decision(&self.config.action, "allowed");
            debug!(action = %self.config.action, subject = %subject, "Attempt allowed");
        } else {
            ThrottleMetrics::record_decision(&self.config.action, "denied");
            warn!(
                action = %self.config.action,
                subject = %subject,
                retry_after = ?result.retry_after(),
                unit = result.unit.as_str(),
                "Rate limit exceeded"
            );
        }

        Ok(result)
    }

    /// Attempts used in the current window for `subject` (0 when absent/expired)
    pub fn attempts(&self, subject: &str) -> u32 {
        self.store
            .peek(&self.key_for(subject), self.clock.now())
            .map(|record| record.count)
            .unwrap_or(0)
    }

    /// Clear `subject`'s window (administrative unlock)
    pub fn reset(&self, subject: &str) -> bool {
        self.store.reset(&self.key_for(subject))
    }

    fn key_for(&self, subject: &str) -> String {
        format!("{}:{}", self.config.action, subject)
    }
}
