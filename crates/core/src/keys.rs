//! Storage keys shared by every backend.

/// Session tier: JSON array of region ids.
pub const VIEWED_SECTIONS: &str = "viewedSections";

/// Session tier: JSON array of case study ids.
pub const VIEWED_CASE_STUDIES: &str = "viewedCaseStudies";

/// Session tier: `"true"` once the hint popup has been dismissed.
pub const EASTER_EGG_SHOWN: &str = "easterEggShown";

/// Persistent tier: `"true"` once the hidden reality has been discovered.
pub const REALITY_DISCOVERED: &str = "unknownRealityDiscovered";

/// Encoded form of a set boolean flag.
pub const FLAG_TRUE: &str = "true";
