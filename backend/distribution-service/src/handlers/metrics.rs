use actix_web::{get, HttpResponse};

use crate::error::{AppError, Result};
use crate::metrics;

#[get("/metrics")]
pub async fn metrics_endpoint() -> Result<HttpResponse> {
    let body = metrics::render().map_err(|e| {
        tracing::error!("Metrics encoding failed: {}", e);
        AppError::Internal("metrics encoding error".to_string())
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(body))
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
