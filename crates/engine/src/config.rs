//! Engine configuration.

use std::path::Path;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use waypoint_core::DEFAULT_VISIBILITY_THRESHOLD;
use waypoint_progress::ExplorationWeights;
use crate::EngineError;

/// Configuration for the discovery engine.
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Loading screen duration before content starts to appear (ms)
    pub loading_delay_ms: u64,
    /// Gap between the loading screen fading and content counting as visible (ms)
    pub content_reveal_delay_ms: u64,
    /// Time content must be visible before the hint appears (ms)
    pub hint_delay_ms: u64,
    /// Length of the reality transition effect (ms)
    pub transition_duration_ms: u64,
    /// Visible fraction required for a region to count as viewed
    pub visibility_threshold: f64,
    /// Points per discovery category
    pub weights: ExplorationWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            loading_delay_ms: 3000,
            content_reveal_delay_ms: 200,
            hint_delay_ms: 15_000,
            transition_duration_ms: 4500,
            visibility_threshold: DEFAULT_VISIBILITY_THRESHOLD,
            weights: ExplorationWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Set the hint delay.
    pub fn with_hint_delay(mut self, delay: Duration) -> Self {
        self.hint_delay_ms = millis(delay);
        self
    }

    /// Set the transition duration.
    pub fn with_transition_duration(mut self, duration: Duration) -> Self {
        self.transition_duration_ms = millis(duration);
        self
    }

    /// Set the loading screen and content reveal delays.
    pub fn with_loading_delays(mut self, loading: Duration, content_reveal: Duration) -> Self {
        self.loading_delay_ms = millis(loading);
        self.content_reveal_delay_ms = millis(content_reveal);
        self
    }

    /// Set the visibility threshold.
    pub fn with_visibility_threshold(mut self, threshold: f64) -> Self {
        self.visibility_threshold = threshold;
        self
    }

    /// Delay from page load start until content is visible.
    pub fn content_delay(&self) -> Duration {
        Duration::from_millis(
            self.loading_delay_ms
                .saturating_add(self.content_reveal_delay_ms),
        )
    }

    /// Hint delay as a [`Duration`].
    pub fn hint_delay(&self) -> Duration {
        Duration::from_millis(self.hint_delay_ms)
    }

    /// Transition duration as a [`Duration`].
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration_ms)
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.content_delay(), Duration::from_millis(3200));
        assert_eq!(config.hint_delay(), Duration::from_secs(15));
        assert_eq!(config.transition_duration(), Duration::from_millis(4500));
        assert_eq!(config.visibility_threshold, 0.8);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"hint_delay_ms": 500}"#).unwrap();
        assert_eq!(config.hint_delay(), Duration::from_millis(500));
        assert_eq!(config.transition_duration_ms, 4500);
        assert_eq!(config.weights, ExplorationWeights::default());
    }

    #[tokio::test]
    async fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint.json");
        std::fs::write(&path, r#"{"transition_duration_ms": 1000}"#).unwrap();

        let config = EngineConfig::from_file(&path).await.unwrap();
        assert_eq!(config.transition_duration(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_from_file_rejects_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waypoint.json");
        std::fs::write(&path, "hint_delay_ms = 5").unwrap();
        assert!(matches!(
            EngineConfig::from_file(&path).await,
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_hint_delay(Duration::from_secs(1))
            .with_transition_duration(Duration::from_millis(10))
            .with_loading_delays(Duration::ZERO, Duration::ZERO)
            .with_visibility_threshold(0.5);
        assert_eq!(config.hint_delay_ms, 1000);
        assert_eq!(config.transition_duration_ms, 10);
        assert_eq!(config.content_delay(), Duration::ZERO);
        assert_eq!(config.visibility_threshold, 0.5);
    }

    #[test]
    fn test_huge_delays_saturate() {
        let config: EngineConfig = serde_json::from_str(&format!(
            r#"{{"loading_delay_ms": {}, "content_reveal_delay_ms": 200}}"#,
            u64::MAX
        ))
        .unwrap();
        assert_eq!(config.content_delay(), Duration::from_millis(u64::MAX));

        let config = EngineConfig::default().with_hint_delay(Duration::MAX);
        assert_eq!(config.hint_delay_ms, u64::MAX);
    }
}
