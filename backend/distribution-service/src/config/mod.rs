use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use throttle::{RateLimitConfig, RetryUnit};

/// Longest accepted post rate-limit window (30 days)
pub const MAX_POST_WINDOW_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub throttle: ThrottleConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Period of the expired-record sweep
    pub sweep_interval_secs: u64,
    /// Generic write limiter (post creation)
    pub post_max_attempts: u32,
    pub post_window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl ThrottleConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn post_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            action: "post_create".to_string(),
            max_attempts: self.post_max_attempts,
            window_seconds: self.post_window_secs,
            retry_unit: RetryUnit::Seconds,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig {
                env: "development".to_string(),
                port: 8080,
                log_level: "info".to_string(),
            },
            throttle: ThrottleConfig {
                sweep_interval_secs: default_sweep_interval_secs(),
                post_max_attempts: 30,
                post_window_secs: 900,
            },
            feed: FeedConfig {
                default_limit: 20,
                max_limit: 100,
            },
        }
    }
}

impl Config {
    /// Load from process environment, reading `.env` first if present
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; unset keys take defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let config = Config {
            app: AppConfig {
                env: lookup("APP_ENV").unwrap_or(defaults.app.env),
                port: parse_or(&lookup, "APP_PORT", defaults.app.port)?,
                log_level: lookup("LOG_LEVEL").unwrap_or(defaults.app.log_level),
            },
            throttle: ThrottleConfig {
                sweep_interval_secs: parse_or(
                    &lookup,
                    "THROTTLE_SWEEP_INTERVAL_SECS",
                    defaults.throttle.sweep_interval_secs,
                )?,
                post_max_attempts: parse_or(
                    &lookup,
                    "POST_RATE_LIMIT_MAX",
                    defaults.throttle.post_max_attempts,
                )?,
                post_window_secs: parse_or(
                    &lookup,
                    "POST_RATE_LIMIT_WINDOW_SECS",
                    defaults.throttle.post_window_secs,
                )?,
            },
            feed: FeedConfig {
                default_limit: parse_or(&lookup, "FEED_DEFAULT_LIMIT", defaults.feed.default_limit)?,
                max_limit: parse_or(&lookup, "FEED_MAX_LIMIT", defaults.feed.max_limit)?,
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.throttle.sweep_interval_secs == 0 {
            return Err(AppError::Config(
                "THROTTLE_SWEEP_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if self.throttle.post_max_attempts == 0 || self.throttle.post_window_secs == 0 {
            return Err(AppError::Config(
                "post rate limit must allow at least one attempt per non-empty window".to_string(),
            ));
        }
        if self.throttle.post_window_secs > MAX_POST_WINDOW_SECS {
            return Err(AppError::Config(format!(
                "POST_RATE_LIMIT_WINDOW_SECS must be at most {}",
                MAX_POST_WINDOW_SECS
            )));
        }
        if self.feed.default_limit == 0 || self.feed.default_limit > self.feed.max_limit {
            return Err(AppError::Config(format!(
                "FEED_DEFAULT_LIMIT must be within 1..={}",
                self.feed.max_limit
            )));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{} is invalid ({}): {}", key, raw, e))),
        None => Ok(default),
    }
}

fn default_sweep_interval_secs() -> u64 {
    throttle::DEFAULT_SWEEP_INTERVAL.as_secs()
}
