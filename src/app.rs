use axum::{http::Uri, Router};
use tower_http::{
    compression::CompressionLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::AppConfig;
use crate::routes::{item_routes, not_found, system_routes, ui_routes, ResponseMode};
use crate::state::items::ItemStore;

/// Build the complete Axum application:
/// - `cfg.items_path`   (JSON item API, "/api/items" by default)
/// - /, /ui/items       (HTML page and item fragments)
/// - /static/items.js   (browser script)
/// - /system            (alive + version)
///
/// Anything else is a 404, rendered as JSON under the API path and as HTML
/// everywhere else.
pub fn build_app(store: ItemStore, cfg: &AppConfig) -> Router {
    let api_prefix = cfg.items_path.clone();

    Router::new()
        .merge(item_routes::routes(store.clone(), &cfg.items_path))
        .merge(ui_routes::routes(store.clone(), &cfg.items_path))
        .nest("/system", system_routes::routes(cfg, store))
        .fallback(move |uri: Uri| {
            let mode = ResponseMode::for_path(uri.path(), &api_prefix);
            not_found(mode, uri)
        })
        .layer(CompressionLayer::new())
        // Logging middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
