//! Application builder: wires repositories, services, router, and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::watch;

use booble_auth::jwt::{JwtDecoder, JwtEncoder, RevocationList};
use booble_core::config::AppConfig;
use booble_core::error::AppError;
use booble_database::repositories::{
    FileRepository, PublicLinkRepository, RefreshTokenRepository, ShareRepository,
    TagRepository, UserRepository,
};
use booble_service::{
    FileService, PublicLinkService, TagService, ThumbnailService, UploadService, UserService,
};

use crate::router::build_router;
use crate::state::AppState;

/// Constructs every repository and service on top of `db_pool`.
pub fn build_state(config: AppConfig, db_pool: PgPool) -> AppState {
    // ── Step 1: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let file_repo = Arc::new(FileRepository::new(db_pool.clone()));
    let share_repo = Arc::new(ShareRepository::new(db_pool.clone()));
    let tag_repo = Arc::new(TagRepository::new(db_pool.clone()));
    let link_repo = Arc::new(PublicLinkRepository::new(db_pool.clone()));
    let token_repo = Arc::new(RefreshTokenRepository::new(db_pool.clone()));

    // ── Step 2: Auth ─────────────────────────────────────────────
    let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
    let revocations = RevocationList::new(jwt_encoder.access_ttl());
    let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth, revocations.clone()));

    // ── Step 3: Services ─────────────────────────────────────────
    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repo),
        token_repo,
        jwt_encoder,
        revocations,
        &config.auth,
        &config.storage,
    ));
    let file_service = Arc::new(FileService::new(
        file_repo,
        share_repo,
        Arc::clone(&tag_repo),
        Arc::clone(&user_repo),
        config.storage.clone(),
    ));
    let upload_service = Arc::new(UploadService::new(
        Arc::clone(&file_service),
        user_repo,
        config.upload.clone(),
    ));
    let link_service = Arc::new(PublicLinkService::new(
        link_repo,
        Arc::clone(&file_service),
    ));
    let thumbnail_service = Arc::new(ThumbnailService::new(
        Arc::clone(&file_service),
        Arc::clone(&link_service),
        config.thumbnail.clone(),
    ));
    let tag_service = Arc::new(TagService::new(tag_repo));

    AppState {
        config: Arc::new(config),
        started_at: Utc::now(),
        db_pool,
        jwt_decoder,
        user_service,
        file_service,
        upload_service,
        link_service,
        thumbnail_service,
        tag_service,
    }
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the BoobleDrive server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    tokio::fs::create_dir_all(&config.upload.temp_dir)
        .await
        .map_err(|e| {
            AppError::configuration(format!(
                "Failed to create upload directory '{}': {e}",
                config.upload.temp_dir
            ))
        })?;

    let addr = config.server.bind_address();
    let grace = config.server.shutdown_grace();
    let state = build_state(config, db_pool);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let janitor = tokio::spawn(upload_janitor(
        Arc::clone(&state.upload_service),
        Duration::from_secs(state.config.upload.purge_interval_seconds.max(1)),
        shutdown_rx,
    ));

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("BoobleDrive server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    if tokio::time::timeout(grace, janitor).await.is_err() {
        tracing::warn!("Upload janitor did not stop within the grace period");
    }
    tracing::info!("BoobleDrive server stopped");
    Ok(())
}

/// Periodically discards idle chunked-upload sessions.
async fn upload_janitor(
    uploads: Arc<UploadService>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = uploads.purge_expired().await;
                if purged > 0 {
                    tracing::info!(purged, "Expired upload sessions purged");
                }
            }
            _ = shutdown.changed() => break,
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received");
}
