//! Fixed-window attempt counters keyed by subject
//!
//! # State machine (per key)
//! - Absent → `{count: 1, window_reset_at: now + window}`, allowed
//! - Active, `count < max` → `count += 1`, allowed
//! - Active, `count >= max` → unchanged, denied with retry-after
//! - Expired (`now > window_reset_at`) → reset to a fresh window, allowed
//!
//! Expiry is evaluated before the limit comparison on every call, so a stale
//! record is never treated as saturated and the sweeper is purely a memory
//! optimization.
//!
//! # Concurrency
//! Records live in a [`DashMap`]. Each `check` runs its read-modify-write while
//! holding the shard lock for its key, which linearizes calls on the same key.
//! Keys hashed to different shards never contend.

use crate::error::{ThrottleError, ThrottleResult};
use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

/// Counter state for a single key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleRecord {
    pub count: u32,
    pub window_reset_at: DateTime<Utc>,
}

impl ThrottleRecord {
    fn fresh(window_reset_at: DateTime<Utc>) -> Self {
        Self {
            count: 1,
            window_reset_at,
        }
    }

    /// A record past its reset instant is logically absent
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.window_reset_at
    }
}

/// Outcome of a single attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleDecision {
    pub allowed: bool,
    /// Whole seconds until the window resets; only set when denied
    pub retry_after_seconds: Option<u64>,
}

impl ThrottleDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_seconds: None,
        }
    }

    fn denied(retry_after_seconds: u64) -> Self {
        Self {
            allowed: false,
            retry_after_seconds: Some(retry_after_seconds),
        }
    }
}

/// Keyed, time-windowed counter store shared by all limiters
#[derive(Debug, Default)]
pub struct ThrottleStore {
    records: DashMap<String, ThrottleRecord>,
}

impl ThrottleStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Record an attempt for `key` and decide whether it is allowed
    ///
    /// Every call is an attempt: allowed calls create or advance the record,
    /// denied calls leave it untouched.
    pub fn check(
        &self,
        key: &str,
        max_attempts: u32,
        window: Duration,
        now: DateTime<Utc>,
    ) -> ThrottleResult<ThrottleDecision> {
        validate_policy(max_attempts, window)?;
        let reset_at = window_end(now, window)?;

        let decision = match self.records.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(ThrottleRecord::fresh(reset_at));
                ThrottleDecision::allowed()
            }
            Entry::Occupied(mut occupied) => {
                let record = occupied.get_mut();
                if record.is_expired(now) {
                    *record = ThrottleRecord::fresh(reset_at);
                    ThrottleDecision::allowed()
                } else if record.count < max_attempts {
                    record.count += 1;
                    ThrottleDecision::allowed()
                } else {
                    ThrottleDecision::denied(seconds_until(record.window_reset_at, now))
                }
            }
        };

        debug!(
            key = %key,
            allowed = decision.allowed,
            retry_after_seconds = ?decision.retry_after_seconds,
            "Throttle check"
        );

        Ok(decision)
    }

    /// Live record for `key`, or `None` if absent or expired
    pub fn peek(&self, key: &str, now: DateTime<Utc>) -> Option<ThrottleRecord> {
        self.records
            .get(key)
            .map(|entry| *entry.value())
            .filter(|record| !record.is_expired(now))
    }

    /// Drop the record for `key` regardless of its state
    ///
    /// Returns true if a record was removed.
    pub fn reset(&self, key: &str) -> bool {
        self.records.remove(key).is_some()
    }

    /// Remove every record whose window has elapsed at `now`
    ///
    /// Expiry is re-evaluated under each shard's write lock, so a record
    /// refreshed by a concurrent `check` is never evicted.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.records.retain(|_, record| {
            if record.is_expired(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Number of tracked keys, expired or not (for monitoring)
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn validate_policy(max_attempts: u32, window: Duration) -> ThrottleResult<()> {
    if max_attempts == 0 {
        return Err(ThrottleError::InvalidPolicy(
            "max_attempts must be greater than zero".to_string(),
        ));
    }
    if window <= Duration::zero() {
        return Err(ThrottleError::InvalidPolicy(format!(
            "window must be positive, got {}ms",
            window.num_milliseconds()
        )));
    }
    Ok(())
}

/// Reset instant for a window opened at `now`
///
/// A window reaching past the representable date range is a policy error.
fn window_end(now: DateTime<Utc>, window: Duration) -> ThrottleResult<DateTime<Utc>> {
    now.checked_add_signed(window).ok_or_else(|| {
        ThrottleError::InvalidPolicy(format!(
            "window of {}s overflows the clock range",
            window.num_seconds()
        ))
    })
}

/// `ceil((reset_at - now) / 1s)`, never negative
fn seconds_until(reset_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let remaining_ms = (reset_at - now).num_milliseconds().max(0) as u64;
    remaining_ms.div_ceil(1000)
}
