// ABOUTME: Durable key-value storage for the persisted Slack token record
// ABOUTME: Provides file-backed and in-memory stores behind a get/set/remove port

use std::{
    collections::HashMap,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use emojipost_config::constants;
use tokio::fs;
use tracing::{debug, warn};

use crate::{
    error::{AuthError, AuthResult},
    oauth::types::TokenRecord,
};

/// Storage key of the token record
pub const TOKEN_RECORD_KEY: &str = "slackOAuthToken";

/// Durable string slot store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AuthResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> AuthResult<()>;
    async fn remove(&self, key: &str) -> AuthResult<()>;
}

/// In-memory store. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> AuthResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| AuthError::Storage("Memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under `~/.emojipost`
    pub fn default_location() -> AuthResult<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            AuthError::Configuration("Could not determine home directory".to_string())
        })?;
        Ok(Self::new(home.join(constants::DEFAULT_STORE_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> AuthResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> AuthResult<()> {
        fs::create_dir_all(&self.dir).await?;

        // Write then rename so readers never see a half-written slot
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> AuthResult<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Typed access to the token record slot
pub struct TokenStorage<S> {
    store: S,
}

impl<S: KeyValueStore> TokenStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Read the record; a missing or unreadable slot is the empty record
    pub async fn load(&self) -> AuthResult<TokenRecord> {
        let Some(raw) = self.store.get(TOKEN_RECORD_KEY).await? else {
            debug!("No stored token record");
            return Ok(TokenRecord::default());
        };

        match serde_json::from_str::<TokenRecord>(&raw) {
            Ok(record) => Ok(record),
            Err(e) => {
                warn!("Ignoring corrupt token record: {}", e);
                Ok(TokenRecord::default())
            }
        }
    }

    pub async fn save(&self, record: &TokenRecord) -> AuthResult<()> {
        let json = serde_json::to_string(record)?;
        self.store.set(TOKEN_RECORD_KEY, &json).await?;
        debug!("Stored token record");
        Ok(())
    }

    pub async fn clear(&self) -> AuthResult<()> {
        self.store.remove(TOKEN_RECORD_KEY).await?;
        debug!("Removed token record");
        Ok(())
    }
}
