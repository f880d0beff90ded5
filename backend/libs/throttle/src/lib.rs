//! Abuse throttling for write endpoints
//!
//! This library provides:
//! - **ThrottleStore**: fixed-window attempt counters in a sharded concurrent map
//! - **RateLimiter**: a configured policy over the store, failing closed without identity
//! - **SweepScheduler**: background eviction of expired records
//! - **Clock**: injectable time source (`SystemClock`, `ManualClock`)
//!
//! # Example: event-creation limiter
//!
//! ```rust
//! use std::sync::Arc;
//! use throttle::{RateLimiter, SystemClock, ThrottleStore};
//!
//! let store = Arc::new(ThrottleStore::new());
//! let limiter = RateLimiter::event_creation(store, Arc::new(SystemClock));
//!
//! let decision = limiter.check(Some("user-42")).unwrap();
//! assert!(decision.allowed);
//! ```

pub mod clock;
pub mod error;
pub mod limiter;
pub mod metrics;
pub mod store;
pub mod sweeper;

// Re-export main types for convenience
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use error::{ThrottleError, ThrottleResult};
pub use limiter::{LimiterDecision, RateLimitConfig, RateLimiter, RetryUnit, EVENT_CREATE_ACTION};
pub use store::{ThrottleDecision, ThrottleRecord, ThrottleStore};
pub use sweeper::{SweepScheduler, DEFAULT_SWEEP_INTERVAL};
