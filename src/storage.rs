//! Secure key/value persistence for session credentials
//!
//! The backing store only ever sees opaque strings under three keys:
//! the access token, the refresh token, and the serialized user profile.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Error;

/// Storage key for the access token
pub const KEY_ACCESS_TOKEN: &str = "userToken";

/// Storage key for the refresh token
pub const KEY_REFRESH_TOKEN: &str = "refreshToken";

/// Storage key for the cached user profile
pub const KEY_USER_DATA: &str = "userData";

/// Device-level persistence for session credentials
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read a value, if present
    async fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    async fn set(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Delete a value; best-effort, missing keys are not an error
    async fn delete(&self, key: &str);
}

/// In-memory store, used as the default and in tests
#[derive(Default)]
pub struct MemoryTokenStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) {
        self.values.lock().unwrap().remove(key);
    }
}

/// File-backed store holding a single JSON object, readable only by the
/// owning user on unix
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    /// Create a store backed by the given file; the file is created lazily
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> HashMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_default(),
            Err(_) => HashMap::new(),
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), Error> {
        let raw = serde_json::to_string(values)?;
        std::fs::write(&self.path, raw).map_err(Error::storage)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms).map_err(Error::storage)?;
        }

        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap();
        self.load().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), Error> {
        let _guard = self.lock.lock().unwrap();
        let mut values = self.load();
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    async fn delete(&self, key: &str) {
        let _guard = self.lock.lock().unwrap();
        let mut values = self.load();
        if values.remove(key).is_some() {
            if let Err(err) = self.save(&values) {
                tracing::warn!("failed to persist token deletion: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("session.json"));

        store.set(KEY_ACCESS_TOKEN, "tok1").await.unwrap();
        assert_eq!(store.get(KEY_ACCESS_TOKEN).await.as_deref(), Some("tok1"));

        store.delete(KEY_ACCESS_TOKEN).await;
        assert_eq!(store.get(KEY_ACCESS_TOKEN).await, None);
    }

    #[tokio::test]
    async fn delete_of_missing_key_is_a_noop() {
        let store = MemoryTokenStore::new();
        store.delete(KEY_REFRESH_TOKEN).await;
        assert_eq!(store.get(KEY_REFRESH_TOKEN).await, None);
    }
}
