use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Path, Request, State},
    http::{header, StatusCode, Uri},
    response::Response,
    routing::get,
    Form, Json, Router,
};
use serde_json::{Map, Value};

use crate::errors::ApiError;
use crate::routes::{not_found, ResponseMode};
use crate::services::item_service::{self, DeleteSummary};
use crate::state::items::{Item, ItemStore};

/// Write payload, accepted as JSON or as an urlencoded form.
///
/// An empty body becomes `Value::Null`, which validation reports as a
/// missing name.
#[derive(Debug)]
pub struct ItemPayload(pub Value);

#[async_trait]
impl<S> FromRequest<S> for ItemPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
            .unwrap_or(false);

        if is_form {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| body_rejection(e.status(), e.body_text()))?;

            let map: Map<String, Value> = fields
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            return Ok(Self(Value::Object(map)));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| body_rejection(e.status(), e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(Value::Null));
        }

        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| ApiError::MalformedBody(e.to_string()))
    }
}

/// Over-limit bodies keep their 413, every other read failure is a 400.
fn body_rejection(status: StatusCode, text: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::MalformedBody(text)
    }
}

/// Build the item API routes under `items_path`. The collection also
/// answers with a trailing slash.
pub fn routes(store: ItemStore, items_path: &str) -> Router {
    let item_path = format!("{items_path}/:id");
    let collection = get(list_items)
        .post(create_item)
        .delete(delete_all_items)
        .fallback(unmatched_method);

    Router::new()
        .route(items_path, collection.clone())
        .route(&format!("{items_path}/"), collection)
        .route(
            &item_path,
            get(get_item)
                .put(update_item)
                .delete(delete_item)
                .fallback(unmatched_method),
        )
        .with_state(store)
}

async fn unmatched_method(uri: Uri) -> Response {
    not_found(ResponseMode::Json, uri).await
}

//
// ─────────────────────────────────────────────────────────────
// GET /items
// Every item, newest first
// ─────────────────────────────────────────────────────────────
//
async fn list_items(State(store): State<ItemStore>) -> Result<Json<Vec<Item>>, ApiError> {
    item_service::list(&store).map(Json)
}

//
// ─────────────────────────────────────────────────────────────
// POST /items
// Validate the name and create an item
// ─────────────────────────────────────────────────────────────
//
async fn create_item(
    State(store): State<ItemStore>,
    payload: Result<ItemPayload, ApiError>,
) -> Response {
    let result = payload.and_then(|ItemPayload(body)| item_service::create(&store, &body));
    ResponseMode::Json.created(result)
}

//
// ─────────────────────────────────────────────────────────────
// DELETE /items
// Clear the collection, 404 if it was already empty
// ─────────────────────────────────────────────────────────────
//
async fn delete_all_items(State(store): State<ItemStore>) -> Result<Json<DeleteSummary>, ApiError> {
    item_service::delete_all(&store).map(Json)
}

//
// ─────────────────────────────────────────────────────────────
// GET /items/{id}
// ─────────────────────────────────────────────────────────────
//
async fn get_item(
    Path(id): Path<String>,
    State(store): State<ItemStore>,
) -> Result<Json<Item>, ApiError> {
    item_service::get(&store, &id).map(Json)
}

//
// ─────────────────────────────────────────────────────────────
// PUT /items/{id}
// Rename an item
// ─────────────────────────────────────────────────────────────
//
async fn update_item(
    Path(id): Path<String>,
    State(store): State<ItemStore>,
    payload: Result<ItemPayload, ApiError>,
) -> Result<Json<Item>, ApiError> {
    // A malformed id wins over a malformed body.
    item_service::parse_id(&id)?;
    let ItemPayload(body) = payload?;
    item_service::update(&store, &id, &body).map(Json)
}

//
// ─────────────────────────────────────────────────────────────
// DELETE /items/{id}
// ─────────────────────────────────────────────────────────────
//
async fn delete_item(
    Path(id): Path<String>,
    State(store): State<ItemStore>,
) -> Result<StatusCode, ApiError> {
    item_service::delete(&store, &id)?;
    Ok(StatusCode::OK)
}
