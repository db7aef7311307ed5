//! In-memory storage backend.
//!
//! Holds both tiers in process memory. An optional per-tier byte quota and an
//! availability switch reproduce the failure modes of browser storage.

use std::collections::HashMap;
use async_trait::async_trait;
use super::{Result, Storage, StorageError, Tier};

/// Two in-memory maps, one per tier.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    session: HashMap<String, String>,
    persistent: HashMap<String, String>,
    quota: Option<usize>,
    available: bool,
}

impl MemoryStorage {
    /// Create empty storage with no quota.
    pub fn new() -> Self {
        Self {
            session: HashMap::new(),
            persistent: HashMap::new(),
            quota: None,
            available: true,
        }
    }

    /// Limit each tier to `bytes` of keys plus values.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Make every operation fail (or succeed again).
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    fn tier(&self, tier: Tier) -> &HashMap<String, String> {
        match tier {
            Tier::Session => &self.session,
            Tier::Persistent => &self.persistent,
        }
    }

    fn tier_mut(&mut self, tier: Tier) -> &mut HashMap<String, String> {
        match tier {
            Tier::Session => &mut self.session,
            Tier::Persistent => &mut self.persistent,
        }
    }

    fn check_available(&self) -> Result<()> {
        if self.available {
            Ok(())
        } else {
            Err(StorageError::Unavailable("memory storage disabled".to_string()))
        }
    }

    /// Bytes the tier would hold if `key` were set to `value`.
    fn size_after(&self, tier: Tier, key: &str, value: &str) -> usize {
        self.tier(tier)
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum::<usize>()
            + key.len()
            + value.len()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn read(&self, tier: Tier, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.tier(tier).get(key).cloned())
    }

    async fn write(&mut self, tier: Tier, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        if let Some(limit) = self.quota {
            let needed = self.size_after(tier, key, value);
            if needed > limit {
                return Err(StorageError::QuotaExceeded { tier, needed, limit });
            }
        }
        self.tier_mut(tier).insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&mut self, tier: Tier, key: &str) -> Result<()> {
        self.check_available()?;
        self.tier_mut(tier).remove(key);
        Ok(())
    }

    async fn end_session(&mut self) -> Result<()> {
        self.check_available()?;
        self.session.clear();
        Ok(())
    }
}
