//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request-level errors are rendered by
//! the auth crate through `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use auth::models::{App, AppId, AppSecret};
use auth::{InMemoryAuthRepository, PgAuthRepository, RevocationStore, auth_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, StorageBackend};

/// Service prefix of the RPC routes
const SERVICE_PATH: &str = "/auth.v1.Auth";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("invalid configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.default_log_filter().into());
    let registry = tracing_subscriber::registry().with(filter);
    if config.json_logs() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(config = ?config, "Configuration loaded");

    let auth_config = config.auth_config();
    auth_config
        .password_codec()
        .context("invalid Argon2 parameters")?;

    let auth_api = match &config.storage {
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            // Database connection
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .acquire_timeout(config.storage_timeout)
                .connect(database_url)
                .await
                .context("failed to connect to database")?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let repo = PgAuthRepository::new(pool);
            spawn_revocation_purge(repo.clone(), config.revocation_purge_interval).await;
            auth_router(repo, auth_config)
        }
        StorageBackend::Memory { seed_apps } => {
            let repo = InMemoryAuthRepository::new();
            for seed in seed_apps {
                let app_id = AppId::new(seed.id)?;
                repo.insert_app(App::new(
                    app_id,
                    seed.name.clone(),
                    AppSecret::new(seed.secret.clone()),
                ))
                .await;
                tracing::info!(app_id = %app_id, name = %seed.name, "Provisioned app");
            }

            tracing::warn!("Using in-memory storage; data is lost on restart");

            spawn_revocation_purge(repo.clone(), config.revocation_purge_interval).await;
            auth_router(repo, auth_config)
        }
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    // Build router
    let app = Router::new()
        .nest(SERVICE_PATH, auth_api)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");

    Ok(())
}

/// Purge once now, then every `every` in the background
///
/// Failures are logged and never stop the server.
async fn spawn_revocation_purge<R>(store: R, every: Duration)
where
    R: RevocationStore + Send + Sync + 'static,
{
    purge_revocations(&store).await;

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            purge_revocations(&store).await;
        }
    });
}

async fn purge_revocations<R>(store: &R)
where
    R: RevocationStore + Sync,
{
    match store.purge_expired(chrono::Utc::now()).await {
        Ok(0) => {}
        Ok(deleted) => {
            tracing::info!(
                revocations_deleted = deleted,
                "Expired revocation cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Expired revocation cleanup failed, continuing anyway"
            );
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests");
}
