use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::{
    Capabilities, MountContext, ProviderAdapter, ProviderEvent, ProviderHandle, inject_iframe,
};
use crate::error::{PlayerError, Result};
use crate::host::FrameRef;
use crate::source::VideoSource;
use crate::video::Position;

/// Player SDK events the adapter subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VimeoEvent {
    Loaded,
    Play,
    Pause,
    Ended,
}

impl VimeoEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            VimeoEvent::Loaded => "loaded",
            VimeoEvent::Play => "play",
            VimeoEvent::Pause => "pause",
            VimeoEvent::Ended => "ended",
        }
    }
}

pub type VimeoCallback = Box<dyn Fn() + Send + Sync>;

/// The `Vimeo` global installed by `player.js`
pub trait VimeoApi: Send + Sync {
    /// `new Vimeo.Player(iframe, {})`
    fn create_player(&self, frame: &FrameRef) -> Result<Arc<dyn VimeoSdkPlayer>>;
}

/// A `Vimeo.Player` instance. Everything except `on` and `destroy` is a promise.
#[async_trait]
pub trait VimeoSdkPlayer: Send + Sync {
    async fn play(&self) -> Result<()>;
    async fn pause(&self) -> Result<()>;
    async fn set_current_time(&self, seconds: f64) -> Result<()>;
    async fn get_current_time(&self) -> Result<f64>;
    async fn get_duration(&self) -> Result<f64>;
    fn on(&self, event: VimeoEvent, callback: VimeoCallback);
    fn destroy(&self);
}

/// Vimeo: an iframe in the container wrapped by the SDK player
pub struct VimeoAdapter;

impl ProviderAdapter for VimeoAdapter {
    fn source(&self) -> VideoSource {
        VideoSource::Vimeo
    }

    fn construct(&self, ctx: MountContext) -> Result<Arc<dyn ProviderHandle>> {
        let api = ctx
            .host
            .vimeo_api()
            .ok_or(PlayerError::MissingApi(VideoSource::Vimeo))?;

        let frame = inject_iframe(&ctx)?;
        debug!("Creating Vimeo player for video {}", ctx.info.id);
        let player = api.create_player(&frame)?;

        let subscriptions = [
            (VimeoEvent::Loaded, ProviderEvent::Ready),
            (VimeoEvent::Play, ProviderEvent::Playing(true)),
            (VimeoEvent::Pause, ProviderEvent::Playing(false)),
            (VimeoEvent::Ended, ProviderEvent::Playing(false)),
        ];
        for (event, translated) in subscriptions {
            let sink = ctx.events.clone();
            player.on(event, Box::new(move || sink.emit(translated)));
        }

        Ok(Arc::new(VimeoHandle { player }))
    }
}

struct VimeoHandle {
    player: Arc<dyn VimeoSdkPlayer>,
}

#[async_trait]
impl ProviderHandle for VimeoHandle {
    fn source(&self) -> VideoSource {
        VideoSource::Vimeo
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    async fn read_state(&self) -> Result<Option<Position>> {
        let (current_time, duration) =
            futures::try_join!(self.player.get_current_time(), self.player.get_duration())?;
        Ok(Some(Position {
            current_time,
            duration,
        }))
    }

    async fn play(&self) -> Result<()> {
        self.player.play().await
    }

    async fn pause(&self) -> Result<()> {
        self.player.pause().await
    }

    async fn seek_to(&self, seconds: f64) -> Result<()> {
        self.player.set_current_time(seconds).await
    }

    fn destroy(&self) {
        self.player.destroy();
    }
}
