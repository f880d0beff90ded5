pub mod feed;
pub mod metrics;
pub mod writes;

use crate::config::FeedConfig;
use crate::db::ContentRepository;
use crate::services::FeedAssembler;
use actix_web::web;
use std::sync::Arc;
use throttle::RateLimiter;

pub use feed::{get_feed, FeedQueryParams};
pub use metrics::{health, metrics_endpoint};
pub use writes::{create_event, create_post};

/// Shared state for all handlers
pub struct AppState {
    pub feed: FeedAssembler,
    pub repository: Arc<dyn ContentRepository>,
    /// Generic write limiter (configurable)
    pub post_limiter: RateLimiter,
    /// Fixed 5-per-hour limiter
    pub event_limiter: RateLimiter,
    pub feed_config: FeedConfig,
}

/// Register every route under the service root
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(get_feed)
            .service(create_post)
            .service(create_event),
    )
    .service(metrics_endpoint)
    .service(health);
}
