use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tokio::time::{sleep, Duration};

use crate::errors::StoreError;
use crate::state::items::{Item, ItemStore};

/// Load a snapshot from disk into the store, replacing its contents.
///
/// A missing file is not an error: the store starts empty. Entries whose
/// name is empty are dropped.
pub fn load_snapshot(path: &Path, store: &ItemStore) -> Result<usize, StoreError> {
    let data = match fs::read_to_string(path) {
        Ok(d) => d,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::info!("No snapshot found at startup (path = {})", path.display());
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    let items: Vec<Item> = serde_json::from_str(&data)?;
    let total = items.len();

    let kept: Vec<Item> = items
        .into_iter()
        .filter(|item| !item.name.trim().is_empty())
        .collect();

    if kept.len() < total {
        tracing::warn!("Dropped {} snapshot entries with empty names", total - kept.len());
    }

    let loaded = store.replace_all(kept)?;
    tracing::info!("Loaded snapshot: {} items", loaded);
    Ok(loaded)
}

/// Save the current collection to `path`.
///
/// The snapshot is written to a temporary file in the same directory and then
/// moved over the target, so readers never see a half-written file.
pub fn save_snapshot(path: &Path, store: &ItemStore) -> Result<(), StoreError> {
    let items = store.snapshot()?;
    let json = serde_json::to_string_pretty(&items)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| StoreError::Io(e.error))?;

    tracing::debug!("Snapshot saved: {} items", items.len());
    Ok(())
}

/// Background task that periodically saves the snapshot.
pub async fn autosave_loop(path: String, store: ItemStore, every_sec: u64) {
    let every = Duration::from_secs(every_sec.max(1));
    loop {
        sleep(every).await;
        if let Err(e) = save_snapshot(Path::new(&path), &store) {
            tracing::warn!("Failed to save snapshot to {}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::item_service;
    use serde_json::json;

    #[test]
    fn missing_snapshot_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ItemStore::new();
        let loaded = load_snapshot(&dir.path().join("absent.json"), &store).unwrap();
        assert_eq!(loaded, 0);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn save_then_load_restores_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");

        let store = ItemStore::new();
        item_service::create(&store, &json!({ "name": "Apple" })).unwrap();
        item_service::create(&store, &json!({ "name": "<Orange>" })).unwrap();
        save_snapshot(&path, &store).unwrap();

        let restored = ItemStore::new();
        assert_eq!(load_snapshot(&path, &restored).unwrap(), 2);
        assert_eq!(restored.list().unwrap(), store.list().unwrap());
    }

    #[test]
    fn load_drops_blank_names_and_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        fs::write(
            &path,
            r#"[
                {"_id": "5ccb1fac5572f3b82688dc40", "name": "first", "created": "2024-01-01T00:00:00Z"},
                {"_id": "5ccb1fac5572f3b82688dc40", "name": "second", "created": "2024-01-01T00:00:00Z"},
                {"_id": "5ccb1fac5572f3b82688dc41", "name": "   ", "created": "2024-01-02T00:00:00Z"}
            ]"#,
        )
        .unwrap();

        let store = ItemStore::new();
        assert_eq!(load_snapshot(&path, &store).unwrap(), 1);
        assert_eq!(store.list().unwrap()[0].name, "second");
    }

    #[test]
    fn corrupt_snapshot_is_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("items.json");
        fs::write(&path, "{ not json").unwrap();

        let store = ItemStore::new();
        assert!(matches!(
            load_snapshot(&path, &store),
            Err(StoreError::Encoding(_))
        ));
    }
}
