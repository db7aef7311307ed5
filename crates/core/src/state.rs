//! Progression state - what a visitor has discovered so far.

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use crate::id::{CaseStudyId, RegionId};

/// The mutable discovery aggregate for one visitor.
///
/// Set membership only grows, and `reality_discovered` is never reset once
/// true. The insert methods are the only way to mutate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionState {
    viewed_regions: BTreeSet<RegionId>,
    viewed_case_studies: BTreeSet<CaseStudyId>,
    reality_discovered: bool,
    hint_already_shown_this_session: bool,
}

impl ProgressionState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Regions seen, in page order.
    pub fn viewed_regions(&self) -> &BTreeSet<RegionId> {
        &self.viewed_regions
    }

    /// Case studies read to completion.
    pub fn viewed_case_studies(&self) -> &BTreeSet<CaseStudyId> {
        &self.viewed_case_studies
    }

    /// Whether the hidden reality has ever been discovered on this device.
    pub fn reality_discovered(&self) -> bool {
        self.reality_discovered
    }

    /// Whether the hint popup was dismissed earlier in this session.
    pub fn hint_already_shown_this_session(&self) -> bool {
        self.hint_already_shown_this_session
    }

    /// Whether a region has been seen.
    pub fn has_viewed_region(&self, id: RegionId) -> bool {
        self.viewed_regions.contains(&id)
    }

    /// Whether a case study has been read.
    pub fn has_viewed_case_study(&self, id: CaseStudyId) -> bool {
        self.viewed_case_studies.contains(&id)
    }

    /// Record a region. Returns `false` if it was already present.
    pub fn insert_region(&mut self, id: RegionId) -> bool {
        self.viewed_regions.insert(id)
    }

    /// Record a case study. Returns `false` if it was already present.
    pub fn insert_case_study(&mut self, id: CaseStudyId) -> bool {
        self.viewed_case_studies.insert(id)
    }

    /// Latch the discovery flag. Returns `false` if it was already set.
    pub fn set_reality_discovered(&mut self) -> bool {
        !std::mem::replace(&mut self.reality_discovered, true)
    }

    /// Latch the session hint flag. Returns `false` if it was already set.
    pub fn set_hint_shown(&mut self) -> bool {
        !std::mem::replace(&mut self.hint_already_shown_this_session, true)
    }
}
