//! Items: short text snippets with an expiry date.

use super::StoreError;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use pressbox_middleware::BoxFuture;
use serde::Serialize;
use std::collections::BTreeMap;

/// How many items [`ItemStore::latest`] returns.
pub const LATEST_LIMIT: usize = 10;

/// A stored item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    /// Identifier, starting at 1.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Time after which the item is no longer visible.
    pub expires: DateTime<Utc>,
}

impl Item {
    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires > now
    }
}

/// Access to stored items.
pub trait ItemStore: Send + Sync + 'static {
    /// Stores a new item that expires `expires_days` from now and returns its id.
    fn insert<'a>(
        &'a self,
        title: &'a str,
        content: &'a str,
        expires_days: u32,
    ) -> BoxFuture<'a, Result<i64, StoreError>>;

    /// Fetches an unexpired item.
    fn get(&self, id: i64) -> BoxFuture<'_, Result<Item, StoreError>>;

    /// The [`LATEST_LIMIT`] most recent unexpired items, newest first.
    fn latest(&self) -> BoxFuture<'_, Result<Vec<Item>, StoreError>>;
}

#[derive(Debug, Default)]
struct ItemTable {
    last_id: i64,
    items: BTreeMap<i64, Item>,
}

/// In-memory [`ItemStore`].
///
/// Ids are assigned in insertion order, so "newest first" is descending id.
#[derive(Debug, Default)]
pub struct MemoryItemStore {
    table: RwLock<ItemTable>,
}

impl MemoryItemStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an item with explicit timestamps and returns its id.
    ///
    /// Useful for seeding, including items that are already expired.
    pub fn insert_with_times(
        &self,
        title: impl Into<String>,
        content: impl Into<String>,
        created: DateTime<Utc>,
        expires: DateTime<Utc>,
    ) -> i64 {
        let mut table = self.table.write();
        table.last_id += 1;
        let id = table.last_id;
        table.items.insert(
            id,
            Item {
                id,
                title: title.into(),
                content: content.into(),
                created,
                expires,
            },
        );
        id
    }

    /// Number of stored items, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().items.len()
    }

    /// Whether nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.read().items.is_empty()
    }
}

impl ItemStore for MemoryItemStore {
    fn insert<'a>(
        &'a self,
        title: &'a str,
        content: &'a str,
        expires_days: u32,
    ) -> BoxFuture<'a, Result<i64, StoreError>> {
        Box::pin(async move {
            let created = Utc::now();
            let expires = created
                .checked_add_signed(Duration::days(i64::from(expires_days)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            let id = self.insert_with_times(title, content, created, expires);
            tracing::debug!(item_id = id, expires_days, "item stored");
            Ok(id)
        })
    }

    fn get(&self, id: i64) -> BoxFuture<'_, Result<Item, StoreError>> {
        Box::pin(async move {
            let table = self.table.read();
            table
                .items
                .get(&id)
                .filter(|item| item.is_live_at(Utc::now()))
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    fn latest(&self) -> BoxFuture<'_, Result<Vec<Item>, StoreError>> {
        Box::pin(async move {
            let now = Utc::now();
            let table = self.table.read();
            Ok(table
                .items
                .values()
                .rev()
                .filter(|item| item.is_live_at(now))
                .take(LATEST_LIMIT)
                .cloned()
                .collect())
        })
    }
}
