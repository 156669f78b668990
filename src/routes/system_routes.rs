use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::config::AppConfig;
use crate::errors::ApiError;
use crate::state::items::ItemStore;

#[derive(Clone)]
pub struct SystemState {
    version: String,
    store: ItemStore,
}

pub fn routes(config: &AppConfig, store: ItemStore) -> Router {
    Router::new()
        .route("/alive", get(is_alive))
        .route("/version", get(version))
        .with_state(SystemState {
            version: config.server_version.clone(),
            store,
        })
}

/// GET /system/alive
async fn is_alive() -> &'static str {
    "OK"
}

/// GET /system/version
async fn version(State(state): State<SystemState>) -> Result<Json<serde_json::Value>, ApiError> {
    Ok(Json(json!({
        "version": state.version,
        "items": state.store.len()?,
    })))
}
