//! Storage trait abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Write would exceed the tier's byte quota
    #[error("{tier} storage quota exceeded: {needed} bytes needed, limit {limit}")]
    QuotaExceeded {
        /// Tier that rejected the write
        tier: Tier,
        /// Bytes the tier would hold after the write
        needed: usize,
        /// Configured limit
        limit: usize,
    },

    /// Backend cannot be reached at all
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Lifetime class of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Cleared when the browsing session ends
    Session,
    /// Survives indefinitely
    Persistent,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Session => write!(f, "session"),
            Tier::Persistent => write!(f, "persistent"),
        }
    }
}

/// String key-value storage with a session tier and a persistent tier.
///
/// Backends report failures; the swallow-and-continue policy lives in
/// [`crate::StorageAdapter`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`.
    async fn read(&self, tier: Tier, key: &str) -> Result<Option<String>>;

    /// Write (create or replace) a value.
    async fn write(&mut self, tier: Tier, key: &str, value: &str) -> Result<()>;

    /// Remove a value. Removing a missing key succeeds.
    async fn remove(&mut self, tier: Tier, key: &str) -> Result<()>;

    /// Discard the whole session tier.
    async fn end_session(&mut self) -> Result<()>;
}

#[async_trait]
impl<S: Storage + ?Sized> Storage for Box<S> {
    async fn read(&self, tier: Tier, key: &str) -> Result<Option<String>> {
        (**self).read(tier, key).await
    }

    async fn write(&mut self, tier: Tier, key: &str, value: &str) -> Result<()> {
        (**self).write(tier, key, value).await
    }

    async fn remove(&mut self, tier: Tier, key: &str) -> Result<()> {
        (**self).remove(tier, key).await
    }

    async fn end_session(&mut self) -> Result<()> {
        (**self).end_session().await
    }
}
