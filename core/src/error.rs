use thiserror::Error;

use crate::source::VideoSource;

/// Errors raised while bootstrapping, building or driving an embedded player
#[derive(Debug, Clone, Error)]
pub enum PlayerError {
    #[error("Failed to load provider script {src} after {attempts} attempt(s): {reason}")]
    Bootstrap {
        src: String,
        attempts: u32,
        reason: String,
    },

    #[error("Script load error: {0}")]
    ScriptLoad(String),

    #[error("Provider API for {0} is not available")]
    MissingApi(VideoSource),

    #[error("Player container '{0}' not found")]
    ContainerMissing(String),

    #[error("Failed to construct {provider} player: {reason}")]
    Construction { provider: VideoSource, reason: String },

    #[error("Failed to read playback state: {0}")]
    Read(String),

    #[error("Player control failed: {0}")]
    Control(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PlayerError>;
