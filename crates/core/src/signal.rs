//! Signals published by pages outside the home page.

use serde::{Deserialize, Serialize};

/// A typed cross-page notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "detail", rename_all = "camelCase")]
pub enum Signal {
    /// A case study page was read to the end.
    CaseStudyComplete {
        /// Raw id from the publishing page; validated by the subscriber
        #[serde(rename = "caseStudyId")]
        case_study_id: String,
    },
}

/// Discriminant used to subscribe to one kind of signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    /// `caseStudyComplete`
    CaseStudyComplete,
}

impl Signal {
    /// Build a completion signal.
    pub fn case_study_complete(case_study_id: impl Into<String>) -> Self {
        Signal::CaseStudyComplete {
            case_study_id: case_study_id.into(),
        }
    }

    /// Kind of this signal.
    pub fn kind(&self) -> SignalKind {
        match self {
            Signal::CaseStudyComplete { .. } => SignalKind::CaseStudyComplete,
        }
    }
}

impl SignalKind {
    /// Event name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            SignalKind::CaseStudyComplete => "caseStudyComplete",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let signal = Signal::case_study_complete("swiggy");
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "caseStudyComplete", "detail": {"caseStudyId": "swiggy"}})
        );
    }

    #[test]
    fn test_kind_name() {
        let signal: Signal = serde_json::from_str(
            r#"{"event":"caseStudyComplete","detail":{"caseStudyId":"connect"}}"#,
        )
        .unwrap();
        assert_eq!(signal.kind(), SignalKind::CaseStudyComplete);
        assert_eq!(signal.kind().name(), "caseStudyComplete");
    }
}
