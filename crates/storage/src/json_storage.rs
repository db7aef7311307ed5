//! JSON file storage implementation.
//!
//! Stores the persistent tier in `persistent.json` and the current session in
//! `session.json` under a root directory. Ending the session deletes
//! `session.json`; the next session write starts a fresh session document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};
use waypoint_core::{SessionId, Time};
use super::{Result, Storage, Tier};

/// Contents of `session.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Session this document belongs to
    pub session_id: SessionId,
    /// When the session's first value was written
    pub started_at: Time,
    /// Stored values
    pub values: BTreeMap<String, String>,
}

impl SessionDocument {
    fn new() -> Self {
        Self {
            session_id: SessionId::new(),
            started_at: chrono::Utc::now(),
            values: BTreeMap::new(),
        }
    }
}

/// Contents of `persistent.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistentDocument {
    updated_at: Time,
    values: BTreeMap<String, String>,
}

impl PersistentDocument {
    fn new() -> Self {
        Self {
            updated_at: chrono::Utc::now(),
            values: BTreeMap::new(),
        }
    }
}

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Create storage rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn session_path(&self) -> PathBuf {
        self.root.join("session.json")
    }

    fn persistent_path(&self) -> PathBuf {
        self.root.join("persistent.json")
    }

    /// The current session document, if a session is in progress.
    pub async fn session(&self) -> Result<Option<SessionDocument>> {
        read_json(&self.session_path()).await
    }

    async fn read_values(&self, tier: Tier) -> Result<Option<BTreeMap<String, String>>> {
        Ok(match tier {
            Tier::Session => self.session().await?.map(|doc| doc.values),
            Tier::Persistent => read_json::<PersistentDocument>(&self.persistent_path())
                .await?
                .map(|doc| doc.values),
        })
    }

    async fn update(&self, tier: Tier, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        match tier {
            Tier::Session => {
                let path = self.session_path();
                let mut doc = load_or_new(&path, SessionDocument::new).await;
                f(&mut doc.values);
                write_json(&path, &doc).await
            }
            Tier::Persistent => {
                let path = self.persistent_path();
                let mut doc = load_or_new(&path, PersistentDocument::new).await;
                f(&mut doc.values);
                doc.updated_at = chrono::Utc::now();
                write_json(&path, &doc).await
            }
        }
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn read(&self, tier: Tier, key: &str) -> Result<Option<String>> {
        let values = self.read_values(tier).await?;
        Ok(values.and_then(|mut v| v.remove(key)))
    }

    async fn write(&mut self, tier: Tier, key: &str, value: &str) -> Result<()> {
        self.update(tier, |values| {
            values.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&mut self, tier: Tier, key: &str) -> Result<()> {
        self.update(tier, |values| {
            values.remove(key);
        })
        .await
    }

    async fn end_session(&mut self) -> Result<()> {
        fs::remove_file(self.session_path()).await.or_else(|e| {
            if e.kind() == std::io::ErrorKind::NotFound { Ok(()) } else { Err(e) }
        })?;
        debug!("session ended");
        Ok(())
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Load a document for update. A corrupt file is replaced rather than
/// blocking every later write.
async fn load_or_new<T: serde::de::DeserializeOwned>(path: &Path, new: impl FnOnce() -> T) -> T {
    match read_json(path).await {
        Ok(Some(doc)) => doc,
        Ok(None) => new(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "discarding unreadable storage file");
            new()
        }
    }
}

/// Write to a sibling temp file, then rename over `path`, so readers never
/// see a partially written document.
async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, json.as_bytes()).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}
