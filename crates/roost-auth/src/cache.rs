//! Session artifact cache.
//!
//! The cache is a key-value collaborator owned by the host. Keys follow
//! `<namespace>/<username>/cookies`; values are JSON.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::artifact::SessionArtifact;
use crate::errors::AuthError;

/// Cache key for an account's session cookies.
pub fn cookie_cache_key(namespace: &str, username: &str) -> String {
    format!("{namespace}/{username}/cookies")
}

/// Key-value store for session artifacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArtifactCache: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, AuthError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), AuthError>;
}

/// Serialise `artifact` into `cache` under the account's cookie key.
pub async fn save_session_artifact(
    cache: &dyn ArtifactCache,
    namespace: &str,
    username: &str,
    artifact: &SessionArtifact,
) -> Result<(), AuthError> {
    let value = serde_json::to_value(artifact)?;
    cache.set(&cookie_cache_key(namespace, username), value).await
}

/// Load the account's cached artifact.
///
/// A value that no longer parses, or one holding an expired cookie, is
/// treated as absent.
pub async fn load_session_artifact(
    cache: &dyn ArtifactCache,
    namespace: &str,
    username: &str,
) -> Result<Option<SessionArtifact>, AuthError> {
    let key = cookie_cache_key(namespace, username);
    let Some(value) = cache.get(&key).await? else {
        return Ok(None);
    };
    match serde_json::from_value::<SessionArtifact>(value) {
        Ok(artifact) if artifact.has_expired_cookie(Utc::now()) => {
            tracing::debug!(%key, "cached session artifact has expired");
            Ok(None)
        }
        Ok(artifact) => Ok(Some(artifact)),
        Err(e) => {
            tracing::warn!(%key, error = %e, "ignoring unreadable cached session artifact");
            Ok(None)
        }
    }
}

/// Process-local cache.
#[derive(Debug, Default)]
pub struct MemoryArtifactCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryArtifactCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait]
impl ArtifactCache for MemoryArtifactCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, AuthError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), AuthError> {
        let _ = self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }
}

const CACHE_FILE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheFile {
    version: u32,
    last_updated: String,
    entries: BTreeMap<String, Value>,
}

impl Default for CacheFile {
    fn default() -> Self {
        Self {
            version: CACHE_FILE_VERSION,
            last_updated: String::new(),
            entries: BTreeMap::new(),
        }
    }
}

/// Cache persisted as a single JSON document.
///
/// The file is rewritten on every `set` with 0o600 permissions on unix.
/// A missing, unreadable or wrong-version file reads as empty. Writes
/// refuse to replace a file that exists but cannot be read.
#[derive(Debug)]
pub struct FileArtifactCache {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileArtifactCache {
    /// Cache backed by the file at `path` (created on first write).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the document. A missing file is empty; an unreadable file or
    /// one written by another version is an error.
    async fn read(&self) -> Result<CacheFile, AuthError> {
        let data = match tokio::fs::read_to_string(&self.path).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CacheFile::default()),
            Err(e) => return Err(e.into()),
        };

        let file: CacheFile = serde_json::from_str(&data)?;
        if file.version != CACHE_FILE_VERSION {
            return Err(AuthError::Cache(format!(
                "unsupported artifact cache version {}",
                file.version
            )));
        }
        Ok(file)
    }

    async fn load(&self) -> CacheFile {
        self.read().await.unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "artifact cache unreadable, treating as empty");
            CacheFile::default()
        })
    }

    async fn save(&self, file: &mut CacheFile) -> Result<(), AuthError> {
        file.last_updated = chrono::Utc::now().to_rfc3339();

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(file)?;
        tokio::fs::write(&self.path, json).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = tokio::fs::set_permissions(&self.path, perms).await;
        }

        Ok(())
    }
}

#[async_trait]
impl ArtifactCache for FileArtifactCache {
    async fn get(&self, key: &str) -> Result<Option<Value>, AuthError> {
        Ok(self.load().await.entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), AuthError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read().await?;
        let _ = file.entries.insert(key.to_string(), value);
        self.save(&mut file).await
    }
}
