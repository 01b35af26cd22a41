//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::recording::{DiscardPolicy, Duration};

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub max_duration: Option<String>,
    pub stop_timeout: Option<String>,
    pub audio_cues: Option<bool>,
    pub discard_policy: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            max_duration: Some(Duration::default_max_take().to_string()),
            stop_timeout: Some(Duration::default_stop_timeout().to_string()),
            audio_cues: Some(false),
            discard_policy: Some(DiscardPolicy::default().to_string()),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            max_duration: other.max_duration.or(self.max_duration),
            stop_timeout: other.stop_timeout.or(self.stop_timeout),
            audio_cues: other.audio_cues.or(self.audio_cues),
            discard_policy: other.discard_policy.or(self.discard_policy),
        }
    }

    pub fn audio_cues_or_default(&self) -> bool {
        self.audio_cues.unwrap_or(false)
    }

    pub fn discard_policy_or_default(&self) -> DiscardPolicy {
        self.discard_policy
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}
