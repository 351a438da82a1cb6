use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlayerError, Result};

/// Element id of the container slot the page renders before mount
pub const DEFAULT_CONTAINER_ID: &str = "video-player";

/// Configuration for an embedded player instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Id of the DOM container the active provider writes into
    pub container_id: String,
    /// Period of the position/duration poll
    #[serde(rename = "poll_interval_ms", with = "millis")]
    pub poll_interval: Duration,
    /// Provider script loading policy
    pub bootstrap: BootstrapPolicy,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            poll_interval: Duration::from_millis(500),
            bootstrap: BootstrapPolicy::default(),
        }
    }
}

/// Bounded timeout and retry policy for provider script loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapPolicy {
    /// Time allowed for a single load attempt
    #[serde(rename = "timeout_ms", with = "millis")]
    pub timeout: Duration,
    /// Extra attempts after the first one fails
    pub retries: u32,
    /// Pause between attempts
    #[serde(rename = "retry_delay_ms", with = "millis")]
    pub retry_delay: Duration,
}

impl Default for BootstrapPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl BootstrapPolicy {
    pub fn attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }
}

impl PlayerConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| PlayerError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            PlayerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.container_id.trim().is_empty() {
            return Err(PlayerError::Config("container_id must not be empty".to_string()));
        }
        if self.poll_interval.is_zero() {
            return Err(PlayerError::Config("poll_interval_ms must be greater than zero".to_string()));
        }
        if self.bootstrap.timeout.is_zero() {
            return Err(PlayerError::Config("bootstrap.timeout_ms must be greater than zero".to_string()));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
