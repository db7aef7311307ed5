//! Progression store - the authoritative discovery state with write-through.

use std::collections::BTreeSet;
use std::str::FromStr;
use serde::Serialize;
use tracing::{debug, info, warn};
use waypoint_core::{keys, CaseStudyId, ProgressionState, RegionId};
use waypoint_storage::{Storage, StorageAdapter};

/// Owns the [`ProgressionState`] and keeps storage in step with it.
///
/// Every mutator writes through before returning. Storage failures are
/// swallowed by the adapter, so the in-memory state is always the source of
/// truth for the rest of the page lifetime.
pub struct ProgressionStore<S: Storage> {
    storage: StorageAdapter<S>,
    state: ProgressionState,
}

impl<S: Storage> ProgressionStore<S> {
    /// Create a store with empty state. Call [`rehydrate`](Self::rehydrate) next.
    pub fn new(storage: S) -> Self {
        Self {
            storage: StorageAdapter::new(storage),
            state: ProgressionState::new(),
        }
    }

    /// Create a store and rehydrate it immediately.
    pub async fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.rehydrate().await;
        store
    }

    /// Load state from both tiers, merging into what is already in memory.
    ///
    /// Absent or malformed values leave the corresponding field at its
    /// default.
    pub async fn rehydrate(&mut self) {
        if is_flag_set(self.storage.read_persistent(keys::REALITY_DISCOVERED).await) {
            self.state.set_reality_discovered();
        }
        if is_flag_set(self.storage.read_session(keys::EASTER_EGG_SHOWN).await) {
            self.state.set_hint_shown();
        }

        let regions = self.storage.read_session(keys::VIEWED_SECTIONS).await;
        for id in parse_id_list::<RegionId>(keys::VIEWED_SECTIONS, regions) {
            self.state.insert_region(id);
        }

        let case_studies = self.storage.read_session(keys::VIEWED_CASE_STUDIES).await;
        for id in parse_id_list::<CaseStudyId>(keys::VIEWED_CASE_STUDIES, case_studies) {
            self.state.insert_case_study(id);
        }

        info!(
            regions = self.state.viewed_regions().len(),
            case_studies = self.state.viewed_case_studies().len(),
            reality_discovered = self.state.reality_discovered(),
            hint_shown = self.state.hint_already_shown_this_session(),
            "progression rehydrated"
        );
    }

    /// Record a viewed region. Returns `false` (and writes nothing) if it was
    /// already recorded.
    pub async fn mark_region_viewed(&mut self, id: RegionId) -> bool {
        if !self.state.insert_region(id) {
            return false;
        }
        debug!(region = %id, "region viewed");
        if let Some(json) = encode_set(self.state.viewed_regions()) {
            self.storage.write_session(keys::VIEWED_SECTIONS, &json).await;
        }
        true
    }

    /// Record a completed case study. Returns `false` (and writes nothing) if
    /// it was already recorded.
    pub async fn mark_case_study_viewed(&mut self, id: CaseStudyId) -> bool {
        if !self.state.insert_case_study(id) {
            return false;
        }
        debug!(case_study = %id, "case study viewed");
        if let Some(json) = encode_set(self.state.viewed_case_studies()) {
            self.storage.write_session(keys::VIEWED_CASE_STUDIES, &json).await;
        }
        true
    }

    /// Latch the hidden-reality flag and persist it beyond the session.
    ///
    /// Always writes, so a previously failed write is retried.
    pub async fn mark_reality_discovered(&mut self) -> bool {
        let changed = self.state.set_reality_discovered();
        if changed {
            info!("hidden reality discovered");
        }
        self.storage
            .write_persistent(keys::REALITY_DISCOVERED, keys::FLAG_TRUE)
            .await;
        changed
    }

    /// Latch the session hint flag.
    pub async fn mark_hint_shown(&mut self) -> bool {
        let changed = self.state.set_hint_shown();
        self.storage
            .write_session(keys::EASTER_EGG_SHOWN, keys::FLAG_TRUE)
            .await;
        changed
    }

    /// Current state.
    pub fn state(&self) -> &ProgressionState {
        &self.state
    }

    /// Storage adapter, for inspection.
    pub fn storage(&self) -> &StorageAdapter<S> {
        &self.storage
    }

    /// Mutable storage adapter, e.g. to toggle a test backend.
    pub fn storage_mut(&mut self) -> &mut StorageAdapter<S> {
        &mut self.storage
    }

    /// Give the backend back, dropping the in-memory state.
    pub fn into_storage(self) -> S {
        self.storage.into_inner()
    }
}

fn is_flag_set(value: Option<String>) -> bool {
    value.as_deref() == Some(keys::FLAG_TRUE)
}

/// Decode a JSON array of ids. Malformed JSON yields nothing; unknown ids are
/// skipped individually.
fn parse_id_list<T: FromStr>(key: &str, raw: Option<String>) -> Vec<T>
where
    T::Err: std::fmt::Display,
{
    let Some(raw) = raw else {
        return Vec::new();
    };
    let ids: Vec<String> = match serde_json::from_str(&raw) {
        Ok(ids) => ids,
        Err(e) => {
            warn!(key, error = %e, "ignoring malformed stored list");
            return Vec::new();
        }
    };
    ids.iter()
        .filter_map(|id| match id.parse() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(key, error = %e, "ignoring stored id");
                None
            }
        })
        .collect()
}

fn encode_set<T: Serialize>(set: &BTreeSet<T>) -> Option<String> {
    match serde_json::to_string(set) {
        Ok(json) => Some(json),
        Err(e) => {
            warn!(error = %e, "failed to encode id set");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_storage::{MemoryStorage, Tier};

    async fn seeded(entries: &[(Tier, &str, &str)]) -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        for (tier, key, value) in entries {
            storage.write(*tier, key, value).await.unwrap();
        }
        storage
    }

    #[tokio::test]
    async fn test_rehydrate_empty_storage() {
        let store = ProgressionStore::open(MemoryStorage::new()).await;
        assert_eq!(store.state(), &ProgressionState::new());
    }

    #[tokio::test]
    async fn test_rehydrate_reads_both_tiers() {
        let storage = seeded(&[
            (Tier::Persistent, keys::REALITY_DISCOVERED, "true"),
            (Tier::Session, keys::EASTER_EGG_SHOWN, "true"),
            (Tier::Session, keys::VIEWED_SECTIONS, r#"["home","contact"]"#),
            (Tier::Session, keys::VIEWED_CASE_STUDIES, r#"["skillup"]"#),
        ])
        .await;

        let store = ProgressionStore::open(storage).await;
        let state = store.state();
        assert!(state.reality_discovered());
        assert!(state.hint_already_shown_this_session());
        assert!(state.has_viewed_region(RegionId::Home));
        assert!(state.has_viewed_region(RegionId::Contact));
        assert_eq!(state.viewed_regions().len(), 2);
        assert!(state.has_viewed_case_study(CaseStudyId::Skillup));
    }

    #[tokio::test]
    async fn test_rehydrate_ignores_flags_in_wrong_tier() {
        let storage = seeded(&[
            (Tier::Session, keys::REALITY_DISCOVERED, "true"),
            (Tier::Persistent, keys::EASTER_EGG_SHOWN, "true"),
        ])
        .await;

        let store = ProgressionStore::open(storage).await;
        assert!(!store.state().reality_discovered());
        assert!(!store.state().hint_already_shown_this_session());
    }

    #[tokio::test]
    async fn test_rehydrate_malformed_values_fall_back() {
        let storage = seeded(&[
            (Tier::Session, keys::VIEWED_SECTIONS, "[\"home\","),
            (Tier::Session, keys::VIEWED_CASE_STUDIES, r#"["swiggy","mystery"]"#),
            (Tier::Persistent, keys::REALITY_DISCOVERED, "yes"),
        ])
        .await;

        let store = ProgressionStore::open(storage).await;
        assert!(store.state().viewed_regions().is_empty());
        assert_eq!(store.state().viewed_case_studies().len(), 1);
        assert!(!store.state().reality_discovered());
    }

    #[tokio::test]
    async fn test_mark_region_writes_through() {
        let mut store = ProgressionStore::open(MemoryStorage::new()).await;
        assert!(store.mark_region_viewed(RegionId::Timeline).await);
        assert!(store.mark_region_viewed(RegionId::About).await);

        assert_eq!(
            store.storage().read_session(keys::VIEWED_SECTIONS).await.as_deref(),
            Some(r#"["about","timeline"]"#)
        );
    }

    #[tokio::test]
    async fn test_mark_region_twice_is_noop() {
        let mut store = ProgressionStore::open(MemoryStorage::new()).await;
        store.mark_region_viewed(RegionId::Home).await;
        let once = store.storage().read_session(keys::VIEWED_SECTIONS).await;

        assert!(!store.mark_region_viewed(RegionId::Home).await);
        let twice = store.storage().read_session(keys::VIEWED_SECTIONS).await;
        assert_eq!(once, twice);
        assert_eq!(store.state().viewed_regions().len(), 1);
    }

    #[tokio::test]
    async fn test_region_count_monotonic_and_bounded() {
        let mut store = ProgressionStore::open(MemoryStorage::new()).await;
        let sequence = [
            RegionId::Home, RegionId::Home, RegionId::Contact, RegionId::About,
            RegionId::Contact, RegionId::Timeline, RegionId::CaseStudies,
            RegionId::DesignInterests, RegionId::Home, RegionId::About,
        ];
        let mut last = 0;
        for id in sequence {
            store.mark_region_viewed(id).await;
            let count = store.state().viewed_regions().len();
            assert!(count >= last);
            assert!(count <= RegionId::ALL.len());
            last = count;
        }
        assert_eq!(last, RegionId::ALL.len());
    }

    #[tokio::test]
    async fn test_mark_case_study_writes_session() {
        let mut store = ProgressionStore::open(MemoryStorage::new()).await;
        assert!(store.mark_case_study_viewed(CaseStudyId::Connect).await);
        assert!(!store.mark_case_study_viewed(CaseStudyId::Connect).await);
        assert_eq!(
            store.storage().read_session(keys::VIEWED_CASE_STUDIES).await.as_deref(),
            Some(r#"["connect"]"#)
        );
    }

    #[tokio::test]
    async fn test_reality_discovered_is_persistent() {
        let mut store = ProgressionStore::open(MemoryStorage::new()).await;
        assert!(store.mark_reality_discovered().await);
        assert!(!store.mark_reality_discovered().await);

        let mut storage = store.into_storage();
        storage.end_session().await.unwrap();

        let store = ProgressionStore::open(storage).await;
        assert!(store.state().reality_discovered());
    }

    #[tokio::test]
    async fn test_hint_shown_is_session_scoped() {
        let mut store = ProgressionStore::open(MemoryStorage::new()).await;
        store.mark_hint_shown().await;

        let storage = store.into_storage();
        let reloaded = ProgressionStore::open(storage).await;
        assert!(reloaded.state().hint_already_shown_this_session());

        let mut storage = reloaded.into_storage();
        storage.end_session().await.unwrap();
        let next_session = ProgressionStore::open(storage).await;
        assert!(!next_session.state().hint_already_shown_this_session());
    }

    #[tokio::test]
    async fn test_failed_writes_keep_memory_state() {
        let mut storage = MemoryStorage::new();
        storage.set_available(false);
        let mut store = ProgressionStore::open(storage).await;

        assert!(store.mark_region_viewed(RegionId::About).await);
        assert!(store.mark_reality_discovered().await);
        assert!(store.state().has_viewed_region(RegionId::About));
        assert!(store.state().reality_discovered());
    }

    #[tokio::test]
    async fn test_dropped_write_keeps_last_stored_value() {
        let mut store = ProgressionStore::open(MemoryStorage::new().with_quota(40)).await;
        store.mark_region_viewed(RegionId::Home).await;
        store.mark_region_viewed(RegionId::About).await;
        // Exceeds the quota: the write is dropped.
        store.mark_region_viewed(RegionId::DesignInterests).await;
        assert_eq!(
            store.storage().read_session(keys::VIEWED_SECTIONS).await.as_deref(),
            Some(r#"["home","about"]"#)
        );
        assert_eq!(store.state().viewed_regions().len(), 3);
    }

    #[tokio::test]
    async fn test_next_write_resyncs_after_outage() {
        let mut storage = MemoryStorage::new();
        storage.set_available(false);
        let mut store = ProgressionStore::open(storage).await;

        store.mark_region_viewed(RegionId::Home).await;
        store.storage_mut().backend_mut().set_available(true);
        assert_eq!(store.storage().read_session(keys::VIEWED_SECTIONS).await, None);

        store.mark_region_viewed(RegionId::About).await;
        assert_eq!(
            store.storage().read_session(keys::VIEWED_SECTIONS).await.as_deref(),
            Some(r#"["home","about"]"#)
        );
    }

    #[tokio::test]
    async fn test_reality_flag_retried_after_outage() {
        let mut storage = MemoryStorage::new();
        storage.set_available(false);
        let mut store = ProgressionStore::open(storage).await;

        assert!(store.mark_reality_discovered().await);
        store.storage_mut().backend_mut().set_available(true);
        assert_eq!(store.storage().read_persistent(keys::REALITY_DISCOVERED).await, None);

        assert!(!store.mark_reality_discovered().await);
        assert_eq!(
            store.storage().read_persistent(keys::REALITY_DISCOVERED).await.as_deref(),
            Some(keys::FLAG_TRUE)
        );

        let mut storage = store.into_storage();
        storage.end_session().await.unwrap();
        let reloaded = ProgressionStore::open(storage).await;
        assert!(reloaded.state().reality_discovered());
    }
}
