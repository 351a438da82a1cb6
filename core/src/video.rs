use serde::Serialize;

use crate::source::VideoSource;

/// Latest known playback state of the embedded player
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    /// Playback position in seconds
    pub current_time: f64,
    /// Total duration in seconds (0 until the provider reports it)
    pub duration: f64,
    pub is_playing: bool,
    /// Controls and state reads are valid
    pub is_ready: bool,
}

impl PlaybackState {
    /// Fraction of the video played, in `0.0..=1.0`
    pub fn progress(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub(crate) fn apply_position(&mut self, position: Position) {
        self.current_time = position.current_time;
        self.duration = position.duration;
    }
}

/// Position and duration read from a provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub current_time: f64,
    pub duration: f64,
}

/// Lifecycle phase of a player instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Nothing mounted
    Idle,
    /// Waiting for the provider script
    Bootstrapping,
    /// Provider handle built, waiting for its ready signal
    Constructing,
    Ready,
    /// Bootstrap or construction gave up
    Failed,
    /// Torn down by unmount or a URL change
    Destroyed,
}

/// Everything a view needs to render the player
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub is_ready: bool,
    pub video_source: Option<VideoSource>,
}

impl PlayerSnapshot {
    pub fn new(state: PlaybackState, video_source: Option<VideoSource>) -> Self {
        Self {
            current_time: state.current_time,
            duration: state.duration,
            is_playing: state.is_playing,
            is_ready: state.is_ready,
            video_source,
        }
    }
}
