//! Throttled write endpoints
//!
//! Every write passes its limiter before reaching the repository. A caller
//! without identity is refused by the limiter itself, so no attempt is
//! recorded for an empty or shared key.

use actix_web::{post, web, HttpResponse};
use tracing::info;

use crate::error::{AppError, Result};
use crate::handlers::AppState;
use crate::middleware::UserId;
use crate::models::{CreateEventRequest, CreatedResponse, CreatePostRequest};
use throttle::RateLimiter;

#[post("/posts")]
pub async fn create_post(
    user: Option<UserId>,
    body: web::Json<CreatePostRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let author = admit(&state.post_limiter, user)?;
    let request = body.into_inner();

    if request.content.trim().is_empty() {
        return Err(AppError::Validation("post content must not be empty".to_string()));
    }

    let id = state.repository.create_post(author.0, request).await?;
    info!(post_id = %id, author = %author.0, "Post created");

    Ok(HttpResponse::Created().json(CreatedResponse {
        id,
        remaining_attempts: remaining(&state.post_limiter, author),
    }))
}

#[post("/events")]
pub async fn create_event(
    user: Option<UserId>,
    body: web::Json<CreateEventRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let organizer = admit(&state.event_limiter, user)?;
    let request = body.into_inner();

    if request.title.trim().is_empty() {
        return Err(AppError::Validation("event title must not be empty".to_string()));
    }

    let id = state.repository.create_event(organizer.0, request).await?;
    info!(event_id = %id, organizer = %organizer.0, "Event created");

    Ok(HttpResponse::Created().json(CreatedResponse {
        id,
        remaining_attempts: remaining(&state.event_limiter, organizer),
    }))
}

/// Run the limiter for `user`, turning a denial into `RateLimited`
fn admit(limiter: &RateLimiter, user: Option<UserId>) -> Result<UserId> {
    let subject = user.map(|u| u.0.to_string());
    let decision = limiter.check(subject.as_deref())?;

    if !decision.allowed {
        return Err(AppError::RateLimited {
            retry_after: decision.retry_after().unwrap_or(0),
            unit: decision.unit,
        });
    }

    user.ok_or_else(|| AppError::Unauthenticated("authentication required".to_string()))
}

fn remaining(limiter: &RateLimiter, user: UserId) -> u32 {
    limiter
        .config()
        .max_attempts
        .saturating_sub(limiter.attempts(&user.0.to_string()))
}
