//! Configuration file model
//!
//! Loaded from YAML; every field has a default so a missing file or a partial
//! file both work.

use std::time::Duration;

use action_locator::ScrollPolicy;
use droidlocate_core_types::Platform;
use serde::{Deserialize, Serialize};
use wd_bridge::BridgePolicy;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub platform: Platform,
    pub log_level: String,
    pub scroll: ScrollSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            platform: Platform::Android,
            log_level: "info".to_string(),
            scroll: ScrollSettings::default(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScrollSettings {
    pub max_attempts: usize,
    pub gesture_timeout_ms: u64,
    pub deadline_ms: Option<u64>,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        let policy = ScrollPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            gesture_timeout_ms: policy.gesture_timeout.as_millis() as u64,
            deadline_ms: None,
        }
    }
}

impl ScrollSettings {
    pub fn to_policy(&self) -> ScrollPolicy {
        let policy = ScrollPolicy::default()
            .with_max_attempts(self.max_attempts)
            .with_gesture_timeout(Duration::from_millis(self.gesture_timeout_ms));
        match self.deadline_ms {
            Some(ms) => policy.with_deadline(Duration::from_millis(ms)),
            None => policy,
        }
    }
}

impl Config {
    pub fn bridge_policy(&self) -> BridgePolicy {
        BridgePolicy {
            platform: self.platform,
            scroll: self.scroll.to_policy(),
        }
    }
}
