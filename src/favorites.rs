//! Persisted set of favorite POI ids
//!
//! The ids live under a single key as a JSON array of strings. The on-disk
//! store is a fjall keyspace; every blocking call runs on the blocking pool.

use async_trait::async_trait;
use fjall::Keyspace;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio::task;
use tracing::{debug, warn};

use crate::error::PoiFinderError;
use crate::models::Poi;

/// String key-value storage the favorites set is kept in
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> crate::Result<Option<String>>;
    async fn put(&self, key: &str, value: String) -> crate::Result<()>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, value: String) -> crate::Result<()> {
        (**self).put(key, value).await
    }
}

/// Fjall-backed persistent store
#[derive(Clone)]
pub struct FjallStore {
    items: Keyspace,
}

fn read_value(items: &Keyspace, key: &[u8]) -> anyhow::Result<Option<Vec<u8>>> {
    Ok(items.get(key)?.map(|v| v.to_vec()))
}

impl FjallStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        let db = fjall::Database::builder(path)
            .open()
            .map_err(|e| PoiFinderError::store(format!("Failed to open {}: {e}", path.display())))?;
        let items = db
            .keyspace("favorites", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| PoiFinderError::store(format!("Failed to open keyspace: {e}")))?;
        Ok(Self { items })
    }
}

#[async_trait]
impl KeyValueStore for FjallStore {
    #[tracing::instrument(name = "get_favorites", level = "debug", skip(self))]
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        let items = self.items.clone();
        let key = key.as_bytes().to_vec();

        let bytes = task::spawn_blocking(move || read_value(&items, &key))
            .await
            .map_err(|e| PoiFinderError::store(e.to_string()))?
            .map_err(|e| PoiFinderError::store(e.to_string()))?;

        match bytes {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| PoiFinderError::store(format!("Stored value is not UTF-8: {e}"))),
            None => Ok(None),
        }
    }

    #[tracing::instrument(name = "put_favorites", level = "debug", skip(self, value))]
    async fn put(&self, key: &str, value: String) -> crate::Result<()> {
        let items = self.items.clone();
        let key = key.as_bytes().to_vec();

        task::spawn_blocking(move || items.insert(key, value.into_bytes()))
            .await
            .map_err(|e| PoiFinderError::store(e.to_string()))?
            .map_err(|e| PoiFinderError::store(e.to_string()))?;
        Ok(())
    }
}

/// In-process store, used when nothing should touch the disk
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> crate::Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| PoiFinderError::store("memory store poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> crate::Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| PoiFinderError::store("memory store poisoned"))?;
        values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Favorite ids, loaded once and written through on every change
pub struct Favorites<S: KeyValueStore> {
    store: S,
    key: String,
    ids: BTreeSet<String>,
}

impl<S: KeyValueStore> Favorites<S> {
    /// Load the favorites kept under `key`.
    ///
    /// A missing value is an empty set. So is a value that does not parse,
    /// which is logged and overwritten on the next toggle.
    pub async fn load(store: S, key: impl Into<String>) -> crate::Result<Self> {
        let key = key.into();
        let ids = match store.get(&key).await? {
            Some(raw) => serde_json::from_str::<Vec<String>>(&raw).unwrap_or_else(|e| {
                warn!("Ignoring corrupt favorites value under '{}': {}", key, e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        debug!("Loaded {} favorites", ids.len());

        Ok(Self {
            store,
            key,
            ids: ids.into_iter().collect(),
        })
    }

    /// Flip membership of `id` and persist. Returns whether it is now a favorite.
    pub async fn toggle(&mut self, id: &str) -> crate::Result<bool> {
        let now_favorite = if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        };

        let raw = serde_json::to_string(&self.ids)
            .map_err(|e| PoiFinderError::store(format!("Failed to encode favorites: {e}")))?;
        self.store.put(&self.key, raw).await?;
        Ok(now_favorite)
    }

    #[must_use]
    pub fn is_favorite(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Favorited POIs from `pois`, in list order
    #[must_use]
    pub fn select<'a>(&self, pois: &'a [Poi]) -> Vec<&'a Poi> {
        pois.iter().filter(|poi| self.is_favorite(&poi.id)).collect()
    }
}

/// Favorites from the database at `path`.
///
/// When the database cannot be opened or read, this logs a warning and
/// returns an empty set kept in memory, so a search still shows its results.
pub async fn load_or_empty(path: &Path, key: &str) -> Favorites<Box<dyn KeyValueStore>> {
    let loaded = match FjallStore::open(path) {
        Ok(store) => Favorites::load(Box::new(store) as Box<dyn KeyValueStore>, key).await,
        Err(err) => Err(err),
    };

    match loaded {
        Ok(favorites) => favorites,
        Err(err) => {
            warn!(
                "Favorites unavailable at {} ({}), continuing without them",
                path.display(),
                err
            );
            Favorites {
                store: Box::new(MemoryStore::new()),
                key: key.to_string(),
                ids: BTreeSet::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PoiCategory;
    use tempfile::TempDir;

    const KEY: &str = "poi_favorites";

    fn poi(id: &str) -> Poi {
        Poi {
            id: id.to_string(),
            name: format!("Place {id}"),
            category: PoiCategory::Cafe,
            distance: 10.0,
            lat: 0.0,
            lon: 0.0,
            address: None,
            phone: None,
            website: None,
            opening_hours: None,
        }
    }

    #[tokio::test]
    async fn test_missing_value_loads_empty() {
        let favorites = Favorites::load(MemoryStore::new(), KEY).await.unwrap();
        assert!(favorites.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_value_loads_empty() {
        let store = MemoryStore::new();
        store.put(KEY, "{not json".to_string()).await.unwrap();

        let mut favorites = Favorites::load(store.clone(), KEY).await.unwrap();
        assert!(favorites.is_empty());

        favorites.toggle("1").await.unwrap();
        assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some(r#"["1"]"#));
    }

    #[tokio::test]
    async fn test_toggle_adds_and_removes() {
        let store = MemoryStore::new();
        let mut favorites = Favorites::load(store.clone(), KEY).await.unwrap();

        assert!(favorites.toggle("42").await.unwrap());
        assert!(favorites.toggle("7").await.unwrap());
        assert!(favorites.is_favorite("42"));
        assert_eq!(
            store.get(KEY).await.unwrap().as_deref(),
            Some(r#"["42","7"]"#)
        );

        assert!(!favorites.toggle("42").await.unwrap());
        assert!(!favorites.is_favorite("42"));
        assert_eq!(favorites.ids().collect::<Vec<_>>(), vec!["7"]);
        assert_eq!(store.get(KEY).await.unwrap().as_deref(), Some(r#"["7"]"#));
    }

    #[tokio::test]
    async fn test_select_keeps_list_order() {
        let store = MemoryStore::new();
        store.put(KEY, r#"["3","1"]"#.to_string()).await.unwrap();
        let favorites = Favorites::load(store, KEY).await.unwrap();

        let pois = vec![poi("1"), poi("2"), poi("3")];
        let selected: Vec<&str> = favorites.select(&pois).iter().map(|p| p.id.as_str()).collect();
        assert_eq!(selected, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn test_fjall_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let store = FjallStore::open(dir.path()).unwrap();
            let mut favorites = Favorites::load(store, KEY).await.unwrap();
            favorites.toggle("node-1").await.unwrap();
        }

        let store = FjallStore::open(dir.path()).unwrap();
        let favorites = Favorites::load(store, KEY).await.unwrap();
        assert!(favorites.is_favorite("node-1"));
        assert_eq!(favorites.len(), 1);
    }

    #[tokio::test]
    async fn test_load_or_empty_reads_existing_database() {
        let dir = TempDir::new().unwrap();
        {
            let store = FjallStore::open(dir.path()).unwrap();
            let mut favorites = Favorites::load(store, KEY).await.unwrap();
            favorites.toggle("node-2").await.unwrap();
        }

        let favorites = load_or_empty(dir.path(), KEY).await;
        assert!(favorites.is_favorite("node-2"));
    }

    #[tokio::test]
    async fn test_load_or_empty_survives_unusable_path() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let mut favorites = load_or_empty(file.path(), KEY).await;
        assert!(favorites.is_empty());
        assert!(favorites.toggle("node-3").await.unwrap());
        assert!(favorites.is_favorite("node-3"));
    }
}
