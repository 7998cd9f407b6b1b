use crate::error::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// Collection names used as cache file stems
pub const CRYPTO_BALANCES_KEY: &str = "crypto_wallet";
pub const FIAT_BALANCES_KEY: &str = "fiat_wallet";
pub const TRANSACTIONS_KEY: &str = "crypto_transactions";

/// Write-through JSON cache. One file per collection under `dir`.
///
/// This is a resilience fallback for offline display, never a source of truth.
#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    // Ensure storage directory exists with logging
    fn ensure_dir(&self) -> Result<(), StorageError> {
        match std::fs::create_dir_all(&self.dir) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("Failed to create storage directory {}: {}", self.dir.display(), e);
                Err(e.into())
            }
        }
    }

    /// Replace the stored collection with `value`
    pub fn save<T: Serialize + ?Sized>(&self, collection: &str, value: &T) -> Result<(), StorageError> {
        self.ensure_dir()?;
        let path = self.collection_path(collection);
        let serialized = serde_json::to_string_pretty(value)?;

        // Write a sibling file, then rename it into place
        let tmp_path = self.dir.join(format!("{collection}.json.tmp"));
        std::fs::write(&tmp_path, &serialized)?;
        std::fs::rename(&tmp_path, &path)?;

        log::debug!("Cached {} ({} bytes) to {}", collection, serialized.len(), path.display());
        Ok(())
    }

    /// Load a collection; `Ok(None)` when nothing has been cached yet
    pub fn load<T: DeserializeOwned>(&self, collection: &str) -> Result<Option<T>, StorageError> {
        let path = self.collection_path(collection);
        if !path.exists() {
            log::debug!("No cached {} at {}", collection, path.display());
            return Ok(None);
        }

        let data = std::fs::read_to_string(&path)?;
        match serde_json::from_str::<T>(&data) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::error!("Failed to parse cached {} from {}: {}", collection, path.display(), e);
                Err(StorageError::from(format!("Corrupt cache for {}: {}", collection, e)))
            }
        }
    }

    pub fn remove(&self, collection: &str) -> Result<(), StorageError> {
        let path = self.collection_path(collection);
        match std::fs::remove_file(&path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove every wallet collection (used on logout)
    pub fn clear(&self) -> Result<(), StorageError> {
        for collection in [CRYPTO_BALANCES_KEY, FIAT_BALANCES_KEY, TRANSACTIONS_KEY] {
            self.remove(collection)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Entry {
        id: String,
        balance: f64,
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path().join("nested"));
        let entries = vec![Entry { id: "btc".into(), balance: 0.5 }];

        cache.save(CRYPTO_BALANCES_KEY, &entries).unwrap();
        let loaded: Option<Vec<Entry>> = cache.load(CRYPTO_BALANCES_KEY).unwrap();
        assert_eq!(loaded, Some(entries));
    }

    #[test]
    fn test_missing_collection_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        let loaded: Option<Vec<Entry>> = cache.load(TRANSACTIONS_KEY).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_corrupt_cache_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        std::fs::write(dir.path().join("crypto_transactions.json"), "[{").unwrap();

        let loaded: Result<Option<Vec<Entry>>, _> = cache.load(TRANSACTIONS_KEY);
        assert!(loaded.is_err());
    }

    #[test]
    fn test_clear_removes_collections() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        cache.save(FIAT_BALANCES_KEY, &Vec::<Entry>::new()).unwrap();
        cache.clear().unwrap();
        // clearing twice is fine
        cache.clear().unwrap();

        let loaded: Option<Vec<Entry>> = cache.load(FIAT_BALANCES_KEY).unwrap();
        assert!(loaded.is_none());
    }
}
