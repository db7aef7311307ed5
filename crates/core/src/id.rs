//! Identifiers for tracked regions, case studies and sessions.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Error returned when a string does not name a known region or case study.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} id: {value}")]
pub struct ParseIdError {
    /// Which id family was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

/// A named section of the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RegionId {
    /// Hero banner
    Home,
    /// About section
    About,
    /// Career timeline
    Timeline,
    /// Case study carousel
    CaseStudies,
    /// Design interests carousel
    DesignInterests,
    /// Contact section
    Contact,
}

impl RegionId {
    /// Every region, in page order.
    pub const ALL: [RegionId; 6] = [
        RegionId::Home,
        RegionId::About,
        RegionId::Timeline,
        RegionId::CaseStudies,
        RegionId::DesignInterests,
        RegionId::Contact,
    ];

    /// The element id the region is rendered under.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionId::Home => "home",
            RegionId::About => "about",
            RegionId::Timeline => "timeline",
            RegionId::CaseStudies => "case-studies",
            RegionId::DesignInterests => "design-interests",
            RegionId::Contact => "contact",
        }
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RegionId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RegionId::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseIdError {
                kind: "region",
                value: s.to_string(),
            })
    }
}

/// A case study page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStudyId {
    /// Food delivery redesign
    Swiggy,
    /// Learning platform
    Skillup,
    /// Social networking concept
    Connect,
}

impl CaseStudyId {
    /// Every case study, in carousel order.
    pub const ALL: [CaseStudyId; 3] = [CaseStudyId::Swiggy, CaseStudyId::Skillup, CaseStudyId::Connect];

    /// The id used in routes and completion payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStudyId::Swiggy => "swiggy",
            CaseStudyId::Skillup => "skillup",
            CaseStudyId::Connect => "connect",
        }
    }
}

impl std::fmt::Display for CaseStudyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseStudyId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CaseStudyId::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseIdError {
                kind: "case study",
                value: s.to_string(),
            })
    }
}

/// Unique identifier for a browsing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Ulid);

impl SessionId {
    /// Generate a new SessionId
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}
