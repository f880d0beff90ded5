pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

pub use db::{ContentRepository, InMemoryContentRepository};
pub use handlers::AppState;
pub use models::{ContentItem, FeedEntry, FeedResponse, ScoredItem, SponsoredItem, ViewerContext};
pub use services::FeedAssembler;
