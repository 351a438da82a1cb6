pub mod bootstrap;
pub mod config;
pub mod controls;
pub mod error;
pub mod host;
pub mod media;
pub mod player;
pub mod source;
mod sync;
pub mod video;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports
pub use bootstrap::ScriptLoader;
pub use config::{BootstrapPolicy, PlayerConfig};
pub use controls::Controls;
pub use error::{PlayerError, Result};
pub use host::{EmbedHost, FrameRef, ScriptReady, ScriptSpec};
pub use media::{Capabilities, ProviderAdapter, ProviderEvent, ProviderHandle, adapter_for};
pub use player::VideoPlayer;
pub use source::{IframeSpec, VideoInfo, VideoSource, escape_attr, resolve};
pub use video::{Phase, PlaybackState, PlayerSnapshot, Position};

/// Detect which provider hosts a video URL
pub fn detect_video_source(url: &str) -> Option<VideoSource> {
    resolve(url).map(|info| info.source)
}
