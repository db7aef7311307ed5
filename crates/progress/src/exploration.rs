//! Exploration percentage calculation.

use serde::{Deserialize, Serialize};
use waypoint_core::ProgressionState;

/// Highest percentage reachable without discovering the hidden reality.
pub const UNDISCOVERED_CAP: u8 = 99;

/// Points each discovery category is worth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationWeights {
    /// Awarded pro rata for viewed regions
    pub regions: f64,
    /// Awarded pro rata for completed case studies
    pub case_studies: f64,
    /// Awarded once the hidden reality is discovered
    pub reality: f64,
}

impl Default for ExplorationWeights {
    fn default() -> Self {
        Self {
            regions: 60.0,
            case_studies: 25.0,
            reality: 15.0,
        }
    }
}

/// The three shares behind a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationBreakdown {
    /// Points from viewed regions
    pub region_share: f64,
    /// Points from completed case studies
    pub case_study_share: f64,
    /// Points from the hidden reality
    pub reality_share: f64,
    /// Final rounded and capped percentage
    pub percentage: u8,
}

/// Exploration percentage with the default weights.
///
/// `total_regions` and `total_case_studies` describe the current content set.
pub fn compute_percentage(
    state: &ProgressionState,
    total_regions: usize,
    total_case_studies: usize,
) -> u8 {
    breakdown(&ExplorationWeights::default(), state, total_regions, total_case_studies).percentage
}

/// Compute every share and the final percentage.
///
/// The result is rounded first and then capped at [`UNDISCOVERED_CAP`] while
/// the hidden reality is undiscovered, so 100 is only reachable by discovery.
pub fn breakdown(
    weights: &ExplorationWeights,
    state: &ProgressionState,
    total_regions: usize,
    total_case_studies: usize,
) -> ExplorationBreakdown {
    let region_share = share(state.viewed_regions().len(), total_regions, weights.regions);
    let case_study_share = share(
        state.viewed_case_studies().len(),
        total_case_studies,
        weights.case_studies,
    );
    let reality_share = if state.reality_discovered() { weights.reality } else { 0.0 };

    let raw = region_share + case_study_share + reality_share;
    let mut percentage = raw.round().clamp(0.0, 100.0) as u8;
    if !state.reality_discovered() && percentage > UNDISCOVERED_CAP {
        percentage = UNDISCOVERED_CAP;
    }

    ExplorationBreakdown {
        region_share,
        case_study_share,
        reality_share,
        percentage,
    }
}

fn share(viewed: usize, total: usize, weight: f64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (viewed.min(total) as f64 / total as f64) * weight
}
