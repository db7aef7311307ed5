//! Fire-and-forget access to a [`Storage`] backend.

use tracing::warn;
use crate::{Storage, Tier};

/// Wraps a backend so that failures never reach the caller.
///
/// Reads that fail are reported as absent. Writes that fail are logged and
/// dropped; the caller's in-memory state stays authoritative.
pub struct StorageAdapter<S: Storage> {
    backend: S,
}

impl<S: Storage> StorageAdapter<S> {
    /// Wrap a backend.
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Read from the session tier.
    pub async fn read_session(&self, key: &str) -> Option<String> {
        self.read(Tier::Session, key).await
    }

    /// Write to the session tier.
    pub async fn write_session(&mut self, key: &str, value: &str) {
        self.write(Tier::Session, key, value).await
    }

    /// Read from the persistent tier.
    pub async fn read_persistent(&self, key: &str) -> Option<String> {
        self.read(Tier::Persistent, key).await
    }

    /// Write to the persistent tier.
    pub async fn write_persistent(&mut self, key: &str, value: &str) {
        self.write(Tier::Persistent, key, value).await
    }

    /// Borrow the backend.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Mutably borrow the backend.
    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    /// Unwrap the backend.
    pub fn into_inner(self) -> S {
        self.backend
    }

    async fn read(&self, tier: Tier, key: &str) -> Option<String> {
        match self.backend.read(tier, key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(%tier, key, error = %e, "storage read failed, treating as absent");
                None
            }
        }
    }

    async fn write(&mut self, tier: Tier, key: &str, value: &str) {
        if let Err(e) = self.backend.write(tier, key, value).await {
            warn!(%tier, key, error = %e, "storage write dropped");
        }
    }
}
