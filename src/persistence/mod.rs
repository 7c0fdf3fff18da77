//! Durable key-value persistence
//!
//! Features:
//! - Synchronous string-keyed `Storage` trait (LocalStorage on web, memory elsewhere)
//! - JSON snapshot load/save helpers
//! - Typed load and persist failures, so callers decide whether to swallow them

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Synchronous key-value storage addressed by string keys.
pub trait Storage {
    /// Read the value stored under `key`, `Ok(None)` if absent.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing an absent key succeeds.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: Storage + ?Sized> Storage for Box<S> {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).write(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Failure reported by a storage backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage backend is unavailable")]
    Unavailable,
    #[error("reading `{key}` failed: {reason}")]
    ReadFailed { key: String, reason: String },
    #[error("storage rejected write to `{key}`: {reason}")]
    Rejected { key: String, reason: String },
}

/// Why a snapshot could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no snapshot stored under `{0}`")]
    Missing(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("snapshot under `{key}` is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a snapshot could not be written
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Load and decode the JSON snapshot stored under `key`
pub fn load_json<T, S>(storage: &S, key: &str) -> Result<T, LoadError>
where
    T: DeserializeOwned,
    S: Storage + ?Sized,
{
    let json = storage
        .read(key)?
        .ok_or_else(|| LoadError::Missing(key.to_string()))?;
    serde_json::from_str(&json).map_err(|source| LoadError::Malformed {
        key: key.to_string(),
        source,
    })
}

/// Encode `value` as JSON and store it under `key`
pub fn save_json<T, S>(storage: &mut S, key: &str, value: &T) -> Result<(), PersistError>
where
    T: Serialize + ?Sized,
    S: Storage + ?Sized,
{
    let json = serde_json::to_string(value)?;
    storage.write(key, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStorage;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_load_missing_key() {
        let storage = MemoryStorage::new();
        let result = load_json::<Sample, _>(&storage, "nothing");
        assert!(matches!(result, Err(LoadError::Missing(key)) if key == "nothing"));
    }

    #[test]
    fn test_load_malformed_json() {
        let storage = MemoryStorage::new().with_item("sample", "{not json");
        let result = load_json::<Sample, _>(&storage, "sample");
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_load_wrong_shape_is_malformed() {
        let storage = MemoryStorage::new().with_item("sample", r#"{"name": 3}"#);
        let result = load_json::<Sample, _>(&storage, "sample");
        assert!(matches!(result, Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_save_then_load() {
        let mut storage = MemoryStorage::new();
        let sample = Sample {
            name: "a".to_string(),
            count: 2,
        };
        save_json(&mut storage, "sample", &sample).unwrap();
        let loaded: Sample = load_json(&storage, "sample").unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn test_save_rejected_by_read_only_storage() {
        let mut storage = MemoryStorage::new();
        storage.set_read_only(true);
        let err = save_json(&mut storage, "sample", &1u32).unwrap_err();
        assert!(matches!(err, PersistError::Storage(StorageError::Rejected { .. })));
    }

    #[test]
    fn test_boxed_storage_delegates() {
        let mut storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        storage.write("k", "v").unwrap();
        assert_eq!(storage.read("k").unwrap().as_deref(), Some("v"));
        storage.remove("k").unwrap();
        assert_eq!(storage.read("k").unwrap(), None);
    }
}
