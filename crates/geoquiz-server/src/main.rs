mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use geoquiz_api::auth::hash_password;
use geoquiz_api::images::ImageStore;
use geoquiz_api::routes::router;
use geoquiz_api::state::AppStateInner;
use geoquiz_db::Database;
use geoquiz_db::legacy::{self, ImportOwner};
use geoquiz_types::models::AttributionMode;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "geoquiz=debug,geoquiz_api=debug,geoquiz_db=info,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = Arc::new(
        Database::open(&config.db_path)
            .with_context(|| format!("opening database at {}", config.db_path.display()))?,
    );

    // One-shot import of the legacy document
    let owner = match config.mode {
        AttributionMode::Authenticated => ImportOwner::Account {
            username: legacy::MIGRATION_USERNAME.to_string(),
            password_hash: hash_password(legacy::MIGRATION_PASSWORD)?,
        },
        AttributionMode::Anonymous => ImportOwner::Creator(legacy::MIGRATION_CREATOR.to_string()),
    };
    let import_db = db.clone();
    let legacy_path = config.legacy_path.clone();
    let report = tokio::task::spawn_blocking(move || {
        legacy::import_if_empty(&import_db, &legacy_path, &owner)
    })
    .await?;
    match report {
        Ok(report) if !report.skipped => info!(
            imported = report.imported,
            failed = report.failed,
            "Migrated legacy quizzes from {}",
            config.legacy_path.display()
        ),
        Ok(_) => {}
        // A broken legacy file must not keep the service down.
        Err(e) => warn!("Legacy import failed: {}", e),
    }

    let images = ImageStore::new(config.images_dir.clone())
        .await
        .with_context(|| format!("creating image directory {}", config.images_dir.display()))?;

    let state = AppStateInner::new(
        db.clone(),
        images,
        config.mode,
        config.jwt_secret.clone(),
        config.token_ttl,
    );
    let app = router(state, config.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Quiz server listening on {} ({:?} mode)", addr, config.mode);
    info!("Images stored in {}", config.images_dir.display());
    info!("Database: {}", config.db_path.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and its state) is gone; this is the last handle.
    match Arc::try_unwrap(db) {
        Ok(db) => db.close()?,
        Err(_) => warn!("Database still shared at shutdown; closing on drop"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        else {
            ctrl_c.await.ok();
            info!("Received Ctrl+C, shutting down...");
            return;
        };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
