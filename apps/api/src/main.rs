use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use jobboard_api::auth::TokenService;
use jobboard_api::config::Config;
use jobboard_api::db::{create_pool, run_migrations};
use jobboard_api::notifications::mailer::{LogMailer, SmtpMailer};
use jobboard_api::notifications::{Mailer, Notifier};
use jobboard_api::routes::build_router;
use jobboard_api::scheduler::{CleanupScheduler, ExpiredUserSweep};
use jobboard_api::shutdown::install_shutdown_handler;
use jobboard_api::state::AppState;
use jobboard_api::storage::s3::{build_s3_client, S3ObjectStore};
use jobboard_api::storage::ResumeStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("jobboard_api={},tower_http=info", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Job Board API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.database_max_connections).await?;
    run_migrations(&db).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let resumes = ResumeStorage::new(
        Arc::new(S3ObjectStore::new(s3, config.s3_bucket.clone())),
        config.s3_public_url.clone(),
    );
    info!("Resume storage initialized (bucket: {})", config.s3_bucket);

    // Initialize mail delivery
    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(smtp) => {
            info!("SMTP mailer initialized ({}:{})", smtp.host, smtp.port);
            Arc::new(SmtpMailer::new(smtp, &config.mail_from, &config.mail_from_name)?)
        }
        None => {
            warn!("SMTP_HOST not set; emails will be logged, not delivered");
            Arc::new(LogMailer)
        }
    };
    let notifier = Notifier::new(mailer, config.base_url.clone());

    let tokens = TokenService::new(
        &config.jwt_secret,
        config.jwt_expiration_secs,
        config.jwt_verification_expiration_secs,
    );

    let shutdown = install_shutdown_handler()?;

    // Purge unverified accounts past their verification window
    let cleanup = CleanupScheduler::new(
        Arc::new(ExpiredUserSweep::new(db.clone())),
        Duration::from_secs(config.cleanup_interval_secs),
    );
    let cleanup_task = tokio::spawn(cleanup.run(shutdown.clone()));

    // Build app state
    let state = AppState {
        db,
        tokens,
        notifier,
        resumes,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await?;

    shutdown.cancel();
    cleanup_task.await?;
    info!("Shutdown complete");

    Ok(())
}
