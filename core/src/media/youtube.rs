use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::{Capabilities, MountContext, ProviderAdapter, ProviderEvent, ProviderHandle};
use crate::error::{PlayerError, Result};
use crate::source::VideoSource;
use crate::video::Position;

/// `YT.PlayerState` codes reported through `onStateChange`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YouTubePlayerState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
    Unknown(i32),
}

impl YouTubePlayerState {
    pub fn from_code(code: i32) -> Self {
        match code {
            -1 => Self::Unstarted,
            0 => Self::Ended,
            1 => Self::Playing,
            2 => Self::Paused,
            3 => Self::Buffering,
            5 => Self::Cued,
            other => Self::Unknown(other),
        }
    }
}

/// Callbacks registered with `new YT.Player(...)`
pub struct YouTubeEvents {
    pub on_ready: Box<dyn Fn() + Send + Sync>,
    /// Receives the raw `YT.PlayerState` code
    pub on_state_change: Box<dyn Fn(i32) + Send + Sync>,
}

/// The `YT` global installed by the IFrame API script
pub trait YouTubeApi: Send + Sync {
    /// `new YT.Player(element_id, { videoId, events })`
    fn create_player(
        &self,
        element_id: &str,
        video_id: &str,
        events: YouTubeEvents,
    ) -> Result<Box<dyn YouTubeSdkPlayer>>;
}

/// A `YT.Player` instance. All calls are synchronous.
pub trait YouTubeSdkPlayer: Send + Sync {
    fn play_video(&self);
    fn pause_video(&self);
    fn seek_to(&self, seconds: f64);
    fn get_current_time(&self) -> f64;
    fn get_duration(&self) -> f64;
    fn destroy(&self);
}

/// YouTube: the SDK replaces the container element with its own iframe
pub struct YouTubeAdapter;

impl ProviderAdapter for YouTubeAdapter {
    fn source(&self) -> VideoSource {
        VideoSource::YouTube
    }

    fn construct(&self, ctx: MountContext) -> Result<Arc<dyn ProviderHandle>> {
        let api = ctx
            .host
            .youtube_api()
            .ok_or(PlayerError::MissingApi(VideoSource::YouTube))?;
        if !ctx.host.container_exists(&ctx.container_id) {
            return Err(PlayerError::ContainerMissing(ctx.container_id));
        }

        let ready_sink = ctx.events.clone();
        let state_sink = ctx.events;
        let events = YouTubeEvents {
            on_ready: Box::new(move || ready_sink.emit(ProviderEvent::Ready)),
            on_state_change: Box::new(move |code| {
                let playing = YouTubePlayerState::from_code(code) == YouTubePlayerState::Playing;
                state_sink.emit(ProviderEvent::Playing(playing));
            }),
        };

        debug!("Creating YouTube player for video {}", ctx.info.id);
        let player = api.create_player(&ctx.container_id, &ctx.info.id, events)?;
        Ok(Arc::new(YouTubeHandle { player }))
    }
}

struct YouTubeHandle {
    player: Box<dyn YouTubeSdkPlayer>,
}

#[async_trait]
impl ProviderHandle for YouTubeHandle {
    fn source(&self) -> VideoSource {
        VideoSource::YouTube
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::FULL
    }

    async fn read_state(&self) -> Result<Option<Position>> {
        Ok(Some(Position {
            current_time: self.player.get_current_time(),
            duration: self.player.get_duration(),
        }))
    }

    async fn play(&self) -> Result<()> {
        self.player.play_video();
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.player.pause_video();
        Ok(())
    }

    async fn seek_to(&self, seconds: f64) -> Result<()> {
        self.player.seek_to(seconds);
        Ok(())
    }

    fn destroy(&self) {
        self.player.destroy();
    }
}
