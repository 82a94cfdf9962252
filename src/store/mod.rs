pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

/// On-device content store. Every blob is written whole; there are no
/// partial-key updates inside a collection.
#[derive(Debug)]
pub struct Store {
    db: Db,
    pub content: sled::Tree,
    pub meta: sled::Tree,
    /// 设置 blob 的读改写互斥锁。
    settings_lock: Mutex<()>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl StoreError {
    pub fn is_corrupt_blob(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let content = db.open_tree(trees::CONTENT)?;
        let meta = db.open_tree(trees::META)?;

        Ok(Self {
            db,
            content,
            meta,
            settings_lock: Mutex::new(()),
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn raw_db(&self) -> &Db {
        &self.db
    }

    /// `Ok(None)` when the blob was never written; `Err(Serialization)` when it
    /// exists but cannot be parsed.
    pub(crate) fn read_blob<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.content.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub(crate) fn write_blob<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.content.insert(key.as_bytes(), Self::serialize(value)?)?;
        Ok(())
    }

    /// Insert and remove several blobs as one atomic sled batch: either all
    /// of them land or none do.
    pub(crate) fn apply_blob_batch(&self, writes: Vec<(&str, Vec<u8>)>, removals: &[&str]) -> Result<(), StoreError> {
        let mut batch = sled::Batch::default();
        for (key, bytes) in writes {
            batch.insert(key.as_bytes(), bytes);
        }
        for key in removals {
            batch.remove(key.as_bytes());
        }
        self.content.apply_batch(batch)?;
        Ok(())
    }

    /// Held for the whole read-modify-write of the settings blob. No await
    /// point happens while it is held.
    pub(crate) fn lock_settings(&self) -> MutexGuard<'_, ()> {
        self.settings_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn has_blob(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.content.contains_key(key.as_bytes())?)
    }

    pub(crate) fn serialize<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn blob_roundtrip_and_remove() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("blob-db").to_str().unwrap()).unwrap();

        assert!(store.read_blob::<Vec<u32>>("numbers").unwrap().is_none());
        store.write_blob("numbers", &vec![1_u32, 2, 3]).unwrap();
        assert_eq!(store.read_blob::<Vec<u32>>("numbers").unwrap(), Some(vec![1, 2, 3]));

        store.apply_blob_batch(Vec::new(), &["numbers"]).unwrap();
        assert!(!store.has_blob("numbers").unwrap());
    }

    #[test]
    fn blob_batch_writes_and_removes_together() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("batch-db").to_str().unwrap()).unwrap();
        store.write_blob("a", &vec![1_u32]).unwrap();
        store.write_blob("gone", &vec![9_u32]).unwrap();

        let writes = vec![
            ("a", Store::serialize(&vec![0_u32]).unwrap()),
            ("b", Store::serialize(&vec![2_u32]).unwrap()),
        ];
        store.apply_blob_batch(writes, &["gone", "never-written"]).unwrap();

        assert_eq!(store.read_blob::<Vec<u32>>("a").unwrap(), Some(vec![0]));
        assert_eq!(store.read_blob::<Vec<u32>>("b").unwrap(), Some(vec![2]));
        assert!(!store.has_blob("gone").unwrap());
    }

    #[test]
    fn corrupt_blob_is_reported_not_hidden() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("corrupt-db").to_str().unwrap()).unwrap();

        store.content.insert("numbers", b"[1, 2,".to_vec()).unwrap();
        let err = store.read_blob::<Vec<u32>>("numbers").unwrap_err();
        assert!(err.is_corrupt_blob());
    }
}
