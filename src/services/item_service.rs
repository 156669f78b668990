use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiError;
use crate::services::validation;
use crate::state::items::{Item, ItemId, ItemStore};

/// Result of clearing the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteSummary {
    pub deleted_count: usize,
}

/// Check an id's shape before the store is consulted.
pub fn parse_id(raw: &str) -> Result<ItemId, ApiError> {
    raw.parse().map_err(|_| ApiError::MalformedId)
}

/// All items, newest first.
pub fn list(store: &ItemStore) -> Result<Vec<Item>, ApiError> {
    Ok(store.list()?)
}

/// Validate the payload's name and create an item from it.
pub fn create(store: &ItemStore, payload: &Value) -> Result<Item, ApiError> {
    let name = validation::validate_name(payload)?;
    let item = store.create(name)?;
    tracing::debug!("Created item {}", item.id);
    Ok(item)
}

pub fn get(store: &ItemStore, raw_id: &str) -> Result<Item, ApiError> {
    let id = parse_id(raw_id)?;
    store.get(&id)?.ok_or(ApiError::NotFound)
}

/// Rename an item. The id is checked first, then the payload.
pub fn update(store: &ItemStore, raw_id: &str, payload: &Value) -> Result<Item, ApiError> {
    let id = parse_id(raw_id)?;
    let name = validation::validate_name(payload)?;
    let item = store.update_name(&id, name)?.ok_or(ApiError::NotFound)?;
    tracing::debug!("Renamed item {}", item.id);
    Ok(item)
}

pub fn delete(store: &ItemStore, raw_id: &str) -> Result<(), ApiError> {
    let id = parse_id(raw_id)?;
    store.delete(&id)?.ok_or(ApiError::NotFound)?;
    tracing::debug!("Deleted item {id}");
    Ok(())
}

/// Clear the collection. An already empty collection is reported as
/// `NothingToDelete` rather than success.
pub fn delete_all(store: &ItemStore) -> Result<DeleteSummary, ApiError> {
    let deleted_count = store.delete_all()?;
    if deleted_count == 0 {
        return Err(ApiError::NothingToDelete);
    }

    tracing::info!("Deleted all {deleted_count} items");
    Ok(DeleteSummary { deleted_count })
}
