use super::{split_url, Document, DocumentStore, FieldFilter, ObjectStore, StoreError, StoreErrorCode, StoredDocument};
use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

fn poisoned() -> StoreError {
    StoreError::new(StoreErrorCode::Internal, "in-memory store lock poisoned")
}

/// Process-local document store. Used by the test suite and `STORE_BACKEND=memory`.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
    writes: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful mutating calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, BTreeMap<String, Document>>>, StoreError> {
        self.collections.lock().map_err(|_| poisoned())
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(key) {
            return Err(StoreError::new(
                StoreErrorCode::AlreadyExists,
                format!("document {} already exists in {}", key, collection),
            ));
        }
        docs.insert(key.to_string(), fields);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find(&self, collection: &str, filters: &[FieldFilter]) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.lock()?;
        let Some(docs) = collections.get(collection) else {
            return Ok(vec![]);
        };

        Ok(docs
            .iter()
            .filter(|(_, fields)| filters.iter().all(|f| fields.get(&f.field) == Some(&f.value)))
            .map(|(key, fields)| StoredDocument {
                key: key.clone(),
                fields: fields.clone(),
            })
            .collect())
    }

    async fn update(&self, collection: &str, key: &str, fields: Document) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(key))
            .ok_or_else(|| StoreError::new(StoreErrorCode::NotFound, format!("document {} not found", key)))?;
        doc.extend(fields);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(key);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_many(&self, collection: &str, keys: &[String]) -> Result<(), StoreError> {
        let mut collections = self.lock()?;
        if let Some(docs) = collections.get_mut(collection) {
            for key in keys {
                docs.remove(key);
            }
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub body: Bytes,
    pub content_type: String,
}

/// Process-local object store serving URLs under `base_url`.
#[derive(Debug)]
pub struct MemoryObjectStore {
    base_url: String,
    objects: Mutex<HashMap<String, MemoryObject>>,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<MemoryObject> {
        self.objects.lock().ok()?.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new("https://storage.local/media")
    }
}

impl ObjectStore for MemoryObjectStore {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().map_err(|_| poisoned())?;
        objects.insert(
            key.to_string(),
            MemoryObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().map_err(|_| poisoned())?;
        objects
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::new(StoreErrorCode::NotFound, format!("object {} not found", key)))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn key_from_url(&self, url: &str) -> Option<String> {
        split_url(url)?;
        let key = url.strip_prefix(&self.base_url)?.strip_prefix('/')?;
        let key = key.split(['?', '#']).next().unwrap_or(key);
        (!key.is_empty()).then(|| key.to_string())
    }
}
