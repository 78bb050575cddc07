//! Token storage trait and implementations.
//!
//! Defines the [`TokenStore`] trait, a tiny async string-keyed store with
//! the two fixed session keys, and provides [`MemoryTokenStore`] for tests
//! and ephemeral sessions plus [`FileTokenStore`] for persistence across
//! restarts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

/// Storage key holding the bearer token.
pub const KEY_TOKEN: &str = "token";

/// Storage key holding the persisted user id.
pub const KEY_USER_ID: &str = "userId";

/// Errors raised by token storage backends.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backing store could not be read.
    #[error("storage read failed: {0}")]
    Read(String),

    /// The backing store could not be written.
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Result of a storage operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Async session value storage.
///
/// A minimal string key-value surface. The session manager is the only
/// writer of the fixed keys [`KEY_TOKEN`] and [`KEY_USER_ID`]; backends
/// just persist what they are handed.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Read a value by key. `Ok(None)` when the key is absent.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Write a value, overwriting any previous one.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a key. Returns `Ok(())` even when the key was absent.
    async fn remove(&self, key: &str) -> StoreResult<()>;
}

/// In-memory token store for tests and ephemeral sessions.
///
/// Values live in an `Arc<RwLock<HashMap>>` and vanish on drop.
/// Thread-safe and cheaply cloneable.
#[derive(Debug, Clone)]
pub struct MemoryTokenStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryTokenStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            values: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let values = self.values.read().await;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut values = self.values.write().await;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let mut values = self.values.write().await;
        values.remove(key);
        Ok(())
    }
}

/// Filesystem-backed token store.
///
/// All keys live in one JSON object file, written atomically (temp file +
/// fsync + rename) so a crash never leaves a torn file. Mutations
/// serialise on an in-process lock; readers see only complete files
/// thanks to the rename.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileTokenStore {
    /// Create a store at the given file path.
    ///
    /// Creates the parent directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the parent directory cannot be
    /// created.
    pub fn new(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Write(format!(
                    "failed to create session directory {}: {e}",
                    parent.display()
                ))
            })?;
        }
        Ok(Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create a store at the default platform location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] if the directory cannot be created.
    pub fn at_default_path() -> StoreResult<Self> {
        Self::new(default_session_path())
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_values(&self) -> StoreResult<HashMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => {
                return Err(StoreError::Read(format!(
                    "failed to read session file {}: {e}",
                    self.path.display()
                )));
            }
        };
        serde_json::from_str(&content).map_err(|e| {
            StoreError::Read(format!(
                "failed to parse session file {}: {e}",
                self.path.display()
            ))
        })
    }

    /// Atomically replace the session file with the given values.
    fn write_values_atomic(&self, values: &HashMap<String, String>) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| StoreError::Write(format!("failed to serialize session values: {e}")))?;

        // Temp file in the same directory so the rename stays on one
        // filesystem.
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, json.as_bytes()).map_err(|e| {
            StoreError::Write(format!(
                "failed to write temp file {}: {e}",
                tmp_path.display()
            ))
        })?;

        if let Ok(file) = std::fs::File::open(&tmp_path) {
            let _ = file.sync_all();
        }

        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            StoreError::Write(format!(
                "failed to rename temp file to {}: {e}",
                self.path.display()
            ))
        })?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.read_values()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.read_values()?;
        values.insert(key.to_string(), value.to_string());
        self.write_values_atomic(&values)
    }

    async fn remove(&self, key: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut values = self.read_values()?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        self.write_values_atomic(&values)
    }
}

/// Default session file location.
///
/// Resolves to `dirs::data_dir()/tasklight/session.json` by default.
/// Override the directory with the `TASKLIGHT_DATA_DIR` environment
/// variable.
#[must_use]
pub fn default_session_path() -> PathBuf {
    let dir = if let Some(override_dir) = std::env::var_os("TASKLIGHT_DATA_DIR") {
        PathBuf::from(override_dir)
    } else {
        dirs::data_dir()
            .map(|d| d.join("tasklight"))
            .unwrap_or_else(|| PathBuf::from("/tmp/tasklight-data"))
    };
    dir.join("session.json")
}
