mod drive;
mod vimeo;
mod youtube;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::{PlayerError, Result};
use crate::host::{EmbedHost, FrameRef};
use crate::source::{VideoInfo, VideoSource};
use crate::video::Position;

pub use drive::DriveAdapter;
pub use vimeo::{VimeoAdapter, VimeoApi, VimeoCallback, VimeoEvent, VimeoSdkPlayer};
pub use youtube::{YouTubeAdapter, YouTubeApi, YouTubeEvents, YouTubePlayerState, YouTubeSdkPlayer};

/// What a provider handle can do beyond existing in the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Position and duration can be read
    pub polls: bool,
    /// Accepts play/pause/seek
    pub controls: bool,
}

impl Capabilities {
    pub const FULL: Self = Self {
        polls: true,
        controls: true,
    };
    pub const NONE: Self = Self {
        polls: false,
        controls: false,
    };
}

/// Push notification from a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderEvent {
    /// Controls and reads are now valid
    Ready,
    /// Playing state changed
    Playing(bool),
}

/// Delivers provider events for a single mount
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: UnboundedSender<ProviderEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: UnboundedSender<ProviderEvent>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, event: ProviderEvent) {
        // The receiver is gone once the mount is torn down
        let _ = self.tx.send(event);
    }
}

/// Inputs handed to an adapter when it builds a player
pub struct MountContext {
    pub info: VideoInfo,
    pub container_id: String,
    pub host: Arc<dyn EmbedHost>,
    pub events: EventSink,
}

/// Builds provider handles for one kind of video source
pub trait ProviderAdapter: Send + Sync {
    fn source(&self) -> VideoSource;

    /// Build the player inside the container. Called once the provider
    /// script (if any) is ready.
    fn construct(&self, ctx: MountContext) -> Result<Arc<dyn ProviderHandle>>;
}

/// An active embedded player
#[async_trait]
pub trait ProviderHandle: Send + Sync {
    fn source(&self) -> VideoSource;

    fn capabilities(&self) -> Capabilities;

    /// Read the current position. `None` when the provider exposes no state.
    async fn read_state(&self) -> Result<Option<Position>> {
        Ok(None)
    }

    async fn play(&self) -> Result<()> {
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        Ok(())
    }

    async fn seek_to(&self, _seconds: f64) -> Result<()> {
        Ok(())
    }

    /// Release provider resources. Called exactly once, at teardown.
    fn destroy(&self);
}

/// Adapter for a resolved source
pub fn adapter_for(source: VideoSource) -> Box<dyn ProviderAdapter> {
    match source {
        VideoSource::YouTube => Box::new(YouTubeAdapter),
        VideoSource::Drive => Box::new(DriveAdapter),
        VideoSource::Vimeo => Box::new(VimeoAdapter),
    }
}

/// Clear the container and attach the provider's iframe
fn inject_iframe(ctx: &MountContext) -> Result<FrameRef> {
    if !ctx.host.container_exists(&ctx.container_id) {
        return Err(PlayerError::ContainerMissing(ctx.container_id.clone()));
    }
    let spec = ctx.info.iframe().ok_or_else(|| PlayerError::Construction {
        provider: ctx.info.source,
        reason: "provider does not embed through an iframe".to_string(),
    })?;
    ctx.host.clear_container(&ctx.container_id);
    ctx.host.attach_iframe(&ctx.container_id, &spec)
}
