use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::StoreError;

/// Length of an item id in hex characters.
pub const ITEM_ID_HEX_LEN: usize = 24;

lazy_static! {
    /// Five random bytes shared by every id minted in this process.
    static ref PROCESS_UNIQUE: [u8; 5] = {
        let b = Uuid::new_v4().into_bytes();
        [b[0], b[1], b[2], b[3], b[4]]
    };

    /// Per-process counter, randomly seeded like the id's other random part.
    static ref ID_COUNTER: AtomicU32 = {
        let b = Uuid::new_v4().into_bytes();
        AtomicU32::new(u32::from_be_bytes([0, b[5], b[6], b[7]]))
    };
}

/// 12-byte item identifier, rendered as 24 lowercase hex characters.
///
/// Layout: 4-byte big-endian seconds since the epoch, 5 process-unique bytes,
/// 3-byte big-endian counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId([u8; 12]);

impl ItemId {
    /// Mint a fresh id for an item created at `at`.
    pub fn generate(at: DateTime<Utc>) -> Self {
        let secs = at.timestamp().clamp(0, u32::MAX as i64) as u32;
        let count = ID_COUNTER.fetch_add(1, Ordering::Relaxed) & 0x00FF_FFFF;

        let mut bytes = [0u8; 12];
        bytes[..4].copy_from_slice(&secs.to_be_bytes());
        bytes[4..9].copy_from_slice(&*PROCESS_UNIQUE);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        Self(bytes)
    }
}

/// Returned when a string is not a 24-character hex id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedItemId(pub String);

impl fmt::Display for MalformedItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed item id {:?}", self.0)
    }
}

impl std::error::Error for MalformedItemId {}

impl FromStr for ItemId {
    type Err = MalformedItemId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != ITEM_ID_HEX_LEN {
            return Err(MalformedItemId(s.to_string()));
        }
        let mut bytes = [0u8; 12];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| MalformedItemId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for ItemId {
    type Error = MalformedItemId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// A trimmed, non-empty, HTML-escaped item name.
///
/// Only the validation filter builds these, so the store never sees raw input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemName(String);

impl ItemName {
    pub(crate) fn from_sanitized(name: String) -> Self {
        debug_assert!(!name.is_empty());
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// A stored item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ItemId,
    pub name: String,
    pub created: DateTime<Utc>,
}

/// Internal map type.
type InnerMap = HashMap<ItemId, Item>;

/// Shared item collection used across the app. Cloning is cheap.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    inner: Arc<RwLock<InnerMap>>,
}

impl ItemStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, InnerMap>, StoreError> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, InnerMap>, StoreError> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }

    /// All items, newest first.
    pub fn list(&self) -> Result<Vec<Item>, StoreError> {
        let map = self.read()?;
        let mut items: Vec<Item> = map.values().cloned().collect();
        drop(map);

        items.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        Ok(items)
    }

    pub fn create(&self, name: ItemName) -> Result<Item, StoreError> {
        let created = Utc::now();
        let item = Item {
            id: ItemId::generate(created),
            name: name.into_inner(),
            created,
        };

        let mut map = self.write()?;
        map.insert(item.id, item.clone());
        Ok(item)
    }

    pub fn get(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.read()?.get(id).cloned())
    }

    /// Replace the name of an existing item. `id` and `created` are untouched.
    pub fn update_name(&self, id: &ItemId, name: ItemName) -> Result<Option<Item>, StoreError> {
        let mut map = self.write()?;
        Ok(map.get_mut(id).map(|item| {
            item.name = name.into_inner();
            item.clone()
        }))
    }

    /// Remove one item, returning it if it existed.
    pub fn delete(&self, id: &ItemId) -> Result<Option<Item>, StoreError> {
        Ok(self.write()?.remove(id))
    }

    /// Remove every item and return how many were removed.
    pub fn delete_all(&self) -> Result<usize, StoreError> {
        let mut map = self.write()?;
        let removed = map.len();
        map.clear();
        Ok(removed)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// Copy of the whole collection for persistence.
    pub(crate) fn snapshot(&self) -> Result<Vec<Item>, StoreError> {
        self.list()
    }

    /// Swap the collection for `items`. Later duplicates of an id win.
    pub(crate) fn replace_all(&self, items: Vec<Item>) -> Result<usize, StoreError> {
        let mut map = self.write()?;
        map.clear();
        for item in items {
            map.insert(item.id, item);
        }
        Ok(map.len())
    }

    /// Poison the lock so every later call fails.
    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let inner = Arc::clone(&self.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.write().unwrap();
            panic!("poisoning item store for test");
        })
        .join();
    }
}
