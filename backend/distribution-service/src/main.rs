use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use throttle::{RateLimiter, SharedClock, SweepScheduler, SystemClock, ThrottleStore};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use distribution_service::handlers::{configure, AppState};
use distribution_service::{Config, ContentRepository, FeedAssembler, InMemoryContentRepository};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.app.log_level.clone().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    info!(
        "Starting distribution-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Environment: {}", config.app.env);

    let clock: SharedClock = Arc::new(SystemClock);
    let store = Arc::new(ThrottleStore::new());

    // Background sweep of expired throttle records
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = SweepScheduler::new(
        store.clone(),
        clock.clone(),
        config.throttle.sweep_interval(),
    )
    .spawn(shutdown_rx);

    let repository: Arc<dyn ContentRepository> =
        Arc::new(InMemoryContentRepository::new(clock.clone()));

    let state = web::Data::new(AppState {
        feed: FeedAssembler::new(repository.clone(), clock.clone()),
        repository,
        post_limiter: RateLimiter::new(config.throttle.post_limit(), store.clone(), clock.clone()),
        event_limiter: RateLimiter::event_creation(store, clock),
        feed_config: config.feed.clone(),
    });

    let bind_addr = format!("0.0.0.0:{}", config.app.port);
    info!("HTTP server listening on {}", bind_addr);

    let result = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(configure)
    })
    .bind(&bind_addr)?
    .run()
    .await;

    // Stop the sweeper once the server has drained
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "Throttle sweeper did not shut down cleanly");
    }

    result?;
    info!("distribution-service stopped");
    Ok(())
}
