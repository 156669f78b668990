/*****************************************************************************************
 *
 *  items-board – Items list service
 *  --------------------------------
 *
 *  JSON item API + server-rendered UI, backed by an in-memory store with
 *  JSON snapshot persistence.
 *
 *****************************************************************************************/

use std::path::Path;

use anyhow::Context;
use axum::serve;
use tokio::net::TcpListener;
use tokio::task;
use tracing_subscriber::FmtSubscriber;

use items_board::app;
use items_board::config::AppConfig;
use items_board::persistence::{autosave_loop, load_snapshot, save_snapshot};
use items_board::state::items::ItemStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    //
    // ────────────────────────────────────────────────────────
    //  Load configuration (EXE folder or one level up)
    // ────────────────────────────────────────────────────────
    //
    let config_path = AppConfig::locate();
    let cfg = match &config_path {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_overrides();

    //
    // ────────────────────────────────────────────────────────
    //  Configure logging
    // ────────────────────────────────────────────────────────
    //
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cfg.level_filter())
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    match &config_path {
        Some(path) => tracing::info!("Loaded config.json from {}", path.display()),
        None => tracing::warn!("config.json not found, using defaults"),
    }
    tracing::info!("Starting items-board…");
    tracing::info!("Loaded configuration: {:?}", cfg);

    //
    // ────────────────────────────────────────────────────────
    //  Create item store, load snapshot, start autosave
    // ────────────────────────────────────────────────────────
    //
    let store = ItemStore::new();

    if let Some(path) = cfg.snapshot_path.clone() {
        load_snapshot(Path::new(&path), &store)
            .with_context(|| format!("Failed to load snapshot {path}"))?;

        let store_clone = store.clone();
        let interval = cfg.snapshot_interval;
        task::spawn(async move {
            autosave_loop(path, store_clone, interval).await;
        });
    }

    //
    // ────────────────────────────────────────────────────────
    //  Build Axum app and start listening
    // ────────────────────────────────────────────────────────
    //
    let app = app::build_app(store.clone(), &cfg);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], cfg.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Listening on http://{}", addr);

    serve(listener, app)
        .with_graceful_shutdown(shutdown(store, cfg.snapshot_path.clone()))
        .await
        .context("Server error")?;

    Ok(())
}

//
// ─────────────────────────────────────────────────────────────
//  Graceful shutdown handler
// ─────────────────────────────────────────────────────────────
//
async fn shutdown(store: ItemStore, snapshot_path: Option<String>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        // Without a signal handler the server just runs until killed.
        std::future::pending::<()>().await;
    }

    let Some(path) = snapshot_path else {
        tracing::warn!("CTRL+C received — shutting down");
        return;
    };

    tracing::warn!("CTRL+C received — saving snapshot…");
    match save_snapshot(Path::new(&path), &store) {
        Ok(()) => tracing::info!("Snapshot saved. Goodbye."),
        Err(e) => tracing::error!("Failed to save snapshot to {path}: {e}"),
    }
}
