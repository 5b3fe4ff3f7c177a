use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::auth::token::Session;
use crate::error::AdminResult;

/// Key/value persistence backing the token store.
///
/// Modelled on browser local storage: string keys, string values.
#[async_trait::async_trait]
pub trait SessionStorage: Send + Sync {
    async fn get_item(&self, key: &str) -> AdminResult<Option<String>>;
    async fn set_item(&self, key: &str, value: String) -> AdminResult<()>;
    async fn remove_item(&self, key: &str) -> AdminResult<()>;
}

/// In-memory storage, used by tests and throwaway shells
#[derive(Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStorage for MemoryStorage {
    async fn get_item(&self, key: &str) -> AdminResult<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: String) -> AdminResult<()> {
        self.items.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> AdminResult<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}

/// JSON key/value file on disk
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> AdminResult<HashMap<String, String>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        match serde_json::from_str(&content) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Storage file is malformed, starting empty");
                Ok(HashMap::new())
            }
        }
    }

    async fn write_map(&self, map: &HashMap<String, String>) -> AdminResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(map)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionStorage for FileStorage {
    async fn get_item(&self, key: &str) -> AdminResult<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_map().await?.remove(key))
    }

    async fn set_item(&self, key: &str, value: String) -> AdminResult<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), value);
        self.write_map(&map).await
    }

    async fn remove_item(&self, key: &str) -> AdminResult<()> {
        let _guard = self.lock.lock().await;
        let mut map = self.read_map().await?;
        if map.remove(key).is_some() {
            self.write_map(&map).await?;
        }
        Ok(())
    }
}

/// Owns the single persisted session record
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn SessionStorage>,
    key: String,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn SessionStorage>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Read the session; unreadable or malformed data counts as no session
    pub async fn load(&self) -> Option<Session> {
        let raw = match self.storage.get_item(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read session from storage");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "Stored session is malformed, ignoring it");
                None
            }
        }
    }

    /// Persist the full session record, replacing any previous one
    pub async fn save(&self, session: &Session) -> AdminResult<()> {
        let raw = serde_json::to_string(session)?;
        self.storage.set_item(&self.key, raw).await?;
        debug!(role = %session.role, expires_at = %session.expires_at, "Session stored");
        Ok(())
    }

    /// Remove the session record
    pub async fn clear(&self) -> AdminResult<()> {
        self.storage.remove_item(&self.key).await?;
        info!("Session cleared from storage");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn session() -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            role: "CompanyAdmin".into(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_token_store_save_load_clear() {
        let store = TokenStore::new(Arc::new(MemoryStorage::new()), "auth");
        assert!(store.load().await.is_none());

        let session = session();
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await, Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_session_is_none() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item("auth", "{not json".to_string())
            .await
            .unwrap();
        let store = TokenStore::new(storage.clone(), "auth");
        assert!(store.load().await.is_none());

        // Valid JSON, wrong shape
        storage
            .set_item("auth", r#"{"token":"x"}"#.to_string())
            .await
            .unwrap();
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn test_file_storage_persists_across_instances() {
        let path = std::env::temp_dir().join(format!("rafactory-session-{}.json", uuid::Uuid::new_v4()));

        let first = TokenStore::new(Arc::new(FileStorage::new(&path)), "auth");
        let session = session();
        first.save(&session).await.unwrap();

        let second = TokenStore::new(Arc::new(FileStorage::new(&path)), "auth");
        assert_eq!(second.load().await, Some(session));

        second.clear().await.unwrap();
        assert!(first.load().await.is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_file_storage_keeps_other_keys() {
        let path = std::env::temp_dir().join(format!("rafactory-kv-{}.json", uuid::Uuid::new_v4()));
        let storage = FileStorage::new(&path);

        storage.set_item("theme", "dark".into()).await.unwrap();
        storage.set_item("auth", "{}".into()).await.unwrap();
        storage.remove_item("auth").await.unwrap();

        assert_eq!(storage.get_item("theme").await.unwrap().as_deref(), Some("dark"));
        assert!(storage.get_item("auth").await.unwrap().is_none());

        let _ = std::fs::remove_file(&path);
    }
}
