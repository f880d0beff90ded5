use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::handlers::AppState;
use crate::middleware::UserId;

#[derive(Debug, Deserialize)]
pub struct FeedQueryParams {
    pub limit: Option<usize>,
}

/// Composed feed for the caller; anonymous callers get an untargeted feed
#[get("/feed")]
pub async fn get_feed(
    query: web::Query<FeedQueryParams>,
    user: Option<UserId>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let limit = query
        .limit
        .unwrap_or(state.feed_config.default_limit)
        .clamp(1, state.feed_config.max_limit);

    debug!(user = ?user, limit = limit, "Getting feed");

    let response = state.feed.assemble(user.map(|u| u.0), limit).await;

    Ok(HttpResponse::Ok().json(response))
}
