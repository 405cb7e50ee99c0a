//! Technotes Backend
//!
//! Notes and user administration behind JWT authentication.
//!
//! ## Architecture
//!
//! The backend follows a layered architecture:
//! - Routes: HTTP request handling and routing
//! - Services: Business logic
//! - Repositories: Credential and note stores (PostgreSQL or in-process)
//! - Database: PostgreSQL with SQLx

use anyhow::Result;
use std::net::SocketAddr;
use std::time::Duration;
use technotes_backend::{config, db, routes, services::UserService, state::AppState};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let config = config::AppConfig::load()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        env = if config::AppConfig::is_production() { "production" } else { "development" },
        "Starting Technotes Backend"
    );

    if config::AppConfig::is_production() {
        validate_production_config(&config)?;
    }

    let state = if config.database.is_memory() {
        warn!("Using the in-memory store; data is lost on restart");
        AppState::in_memory(config.clone())
    } else {
        info!("Connecting to database...");
        let db_pool = db::create_pool(&config.database).await?;
        db::run_migrations(&db_pool).await?;
        AppState::new(db_pool, config.clone())
    };

    if UserService::bootstrap_admin(state.users(), &config.bootstrap)
        .await?
        .is_none()
    {
        info!("Bootstrap administrator not needed");
    }

    spawn_limiter_purge(&state, Duration::from_secs(config.rate_limit.login_window_secs));

    let app = routes::create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(address = %addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    // Peer addresses feed the login rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Periodically drop expired rate-limit windows so the table stays bounded
fn spawn_limiter_purge(state: &AppState, every: Duration) {
    let limiter = state.login_limiter.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every.max(Duration::from_secs(1)));
        loop {
            interval.tick().await;
            limiter.purge_expired();
        }
    });
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if config::AppConfig::is_production() {
            "technotes_backend=info,tower_http=info".into()
        } else {
            "technotes_backend=debug,tower_http=debug,sqlx=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if config::AppConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Refuse to start in production with unsafe settings
fn validate_production_config(config: &config::AppConfig) -> Result<()> {
    let errors = config.production_errors();

    if config.database.url.contains("localhost") || config.database.url.contains("127.0.0.1") {
        warn!("Database URL contains localhost - ensure this is intentional for production");
    }

    if !errors.is_empty() {
        for err in &errors {
            error!("Configuration error: {}", err);
        }
        anyhow::bail!("Invalid production configuration");
    }

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
