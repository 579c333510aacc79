//! Persistent key/value storage
//!
//! Everything park-keeper remembers lives in a flat string-keyed store whose
//! values are UTF-8 JSON documents.

pub mod file;
pub mod memory;

#[cfg(test)]
pub(crate) mod flaky;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key holding the single active timer record
pub const ACTIVE_TIMER_KEY: &str = "activeTimer";
/// Key holding the parking history array
pub const HISTORY_KEY: &str = "parkingHistory";
/// Legacy key for the current car location, cleared on reset
pub const CURRENT_LOCATION_KEY: &str = "currentParkingLocation";
/// Key holding app settings
pub const SETTINGS_KEY: &str = "appSettings";

/// All keys owned by the application
pub const ALL_KEYS: [&str; 4] = [
    HISTORY_KEY,
    CURRENT_LOCATION_KEY,
    ACTIVE_TIMER_KEY,
    SETTINGS_KEY,
];

/// Errors raised by store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("blocking store task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn io(key: &str, source: std::io::Error) -> Self {
        Self::Io {
            key: key.to_string(),
            source,
        }
    }
}

/// Async key/value store with string values
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Insert or replace a value
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a value; removing an absent key succeeds
    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// Remove several keys, stopping at the first failure
    async fn remove_many(&self, keys: &[&str]) -> Result<(), StoreError> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }
}

/// Validate that a key maps safely onto a file name
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_keys_are_valid() {
        for key in ALL_KEYS {
            assert!(validate_key(key).is_ok(), "{key} should be valid");
        }
    }

    #[test]
    fn test_rejects_path_like_keys() {
        assert!(validate_key("").is_err());
        assert!(validate_key("../secret").is_err());
        assert!(validate_key("a/b").is_err());
        assert!(validate_key("with space").is_err());
    }
}
