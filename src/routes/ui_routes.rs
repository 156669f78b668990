use axum::{
    extract::State,
    http::{header, Uri},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};

use crate::errors::ApiError;
use crate::routes::item_routes::ItemPayload;
use crate::routes::{not_found, ResponseMode};
use crate::services::item_service;
use crate::state::items::ItemStore;
use crate::views;

/// Where the browser posts new items to get back a rendered list element.
pub const FRAGMENT_PATH: &str = "/ui/items";

pub const SCRIPT_PATH: &str = "/static/items.js";

const ITEMS_JS: &str = include_str!("../../assets/items.js");

#[derive(Clone)]
pub struct UiState {
    store: ItemStore,
    api_path: String,
}

/// Build the browser-facing routes. `api_path` is handed to the page so its
/// script knows where the JSON API lives.
pub fn routes(store: ItemStore, api_path: &str) -> Router {
    Router::new()
        .route("/", get(index).fallback(unmatched_method))
        .route(FRAGMENT_PATH, post(create_fragment).fallback(unmatched_method))
        .route(SCRIPT_PATH, get(script).fallback(unmatched_method))
        .with_state(UiState {
            store,
            api_path: api_path.to_string(),
        })
}

async fn unmatched_method(uri: Uri) -> Response {
    not_found(ResponseMode::Html, uri).await
}

/// GET /
async fn index(State(state): State<UiState>) -> Response {
    match item_service::list(&state.store) {
        Ok(items) => Html(views::index_page(&items, &state.api_path, FRAGMENT_PATH)).into_response(),
        Err(e) => ResponseMode::Html.error(e),
    }
}

/// POST /ui/items
async fn create_fragment(
    State(state): State<UiState>,
    payload: Result<ItemPayload, ApiError>,
) -> Response {
    let result = payload.and_then(|ItemPayload(body)| item_service::create(&state.store, &body));
    ResponseMode::Html.created(result)
}

/// GET /static/items.js
async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        ITEMS_JS,
    )
}
