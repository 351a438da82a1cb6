use std::fmt;
use std::str::FromStr;

use log::error;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PlayerError;
use crate::host::{ScriptReady, ScriptSpec};

/// YouTube IFrame Player API script
pub const YOUTUBE_SCRIPT_SRC: &str = "https://www.youtube.com/iframe_api";
/// Global callback the YouTube script invokes once `YT` is usable
pub const YOUTUBE_READY_CALLBACK: &str = "onYouTubeIframeAPIReady";
/// Vimeo Player SDK script
pub const VIMEO_SCRIPT_SRC: &str = "https://player.vimeo.com/api/player.js";

static YOUTUBE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"(?:youtube\.com/watch\?v=|youtu\.be/)([^&\n?#]+)",
        r"youtube\.com/embed/([^&\n?#]+)",
    ])
});

static DRIVE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    compile(&[
        r"drive\.google\.com/file/d/([^/]+)",
        r"drive\.google\.com/open\?id=([^&\n?#]+)",
    ])
});

static VIMEO_PATTERNS: Lazy<Vec<Regex>> =
    Lazy::new(|| compile(&[r"vimeo\.com/([0-9]+)", r"player\.vimeo\.com/video/([0-9]+)"]));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| match Regex::new(p) {
            Ok(re) => Some(re),
            Err(e) => {
                error!("Invalid video URL pattern {:?}: {}", p, e);
                None
            }
        })
        .collect()
}

/// Video hosting service a lesson video is embedded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoSource {
    YouTube,
    Drive,
    Vimeo,
}

impl VideoSource {
    /// Lowercase name used in logs, config and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoSource::YouTube => "youtube",
            VideoSource::Drive => "drive",
            VideoSource::Vimeo => "vimeo",
        }
    }

    /// External script the provider needs before a player can be built.
    /// Drive is a plain iframe and needs none.
    pub fn script(&self) -> Option<ScriptSpec> {
        match self {
            VideoSource::YouTube => Some(ScriptSpec {
                src: YOUTUBE_SCRIPT_SRC,
                ready: ScriptReady::GlobalCallback(YOUTUBE_READY_CALLBACK),
            }),
            VideoSource::Vimeo => Some(ScriptSpec {
                src: VIMEO_SCRIPT_SRC,
                ready: ScriptReady::OnLoad,
            }),
            VideoSource::Drive => None,
        }
    }

    /// Iframe injected into the container slot for this provider.
    /// YouTube builds its own iframe from the container id.
    pub fn iframe(&self, id: &str) -> Option<IframeSpec> {
        match self {
            VideoSource::Drive => Some(IframeSpec::new(
                format!("https://drive.google.com/file/d/{}/preview", id),
                "autoplay",
            )),
            VideoSource::Vimeo => Some(IframeSpec::new(
                format!("https://player.vimeo.com/video/{}", id),
                "autoplay; fullscreen",
            )),
            VideoSource::YouTube => None,
        }
    }
}

impl fmt::Display for VideoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoSource {
    type Err = PlayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "youtube" | "yt" => Ok(VideoSource::YouTube),
            "drive" | "gdrive" => Ok(VideoSource::Drive),
            "vimeo" => Ok(VideoSource::Vimeo),
            other => Err(PlayerError::Config(format!("Unknown video source: {}", other))),
        }
    }
}

/// A classified video URL: which provider, and its identifier for that provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoInfo {
    pub source: VideoSource,
    pub id: String,
}

impl VideoInfo {
    pub fn new(source: VideoSource, id: impl Into<String>) -> Self {
        Self {
            source,
            id: id.into(),
        }
    }

    /// Canonical embeddable URL for this video
    pub fn embed_url(&self) -> String {
        match self.source {
            VideoSource::YouTube => format!("https://www.youtube.com/embed/{}", self.id),
            VideoSource::Drive => format!("https://drive.google.com/file/d/{}/preview", self.id),
            VideoSource::Vimeo => format!("https://player.vimeo.com/video/{}", self.id),
        }
    }

    pub fn iframe(&self) -> Option<IframeSpec> {
        self.source.iframe(&self.id)
    }
}

/// Classify a video URL.
///
/// YouTube patterns are tried first, then Drive, then Vimeo; the first match
/// wins. Anything unrecognised (including input that is not a URL at all)
/// yields `None`.
pub fn resolve(url: &str) -> Option<VideoInfo> {
    let groups: [(VideoSource, &Lazy<Vec<Regex>>); 3] = [
        (VideoSource::YouTube, &YOUTUBE_PATTERNS),
        (VideoSource::Drive, &DRIVE_PATTERNS),
        (VideoSource::Vimeo, &VIMEO_PATTERNS),
    ];

    for (source, patterns) in groups {
        for pattern in patterns.iter() {
            if let Some(id) = pattern
                .captures(url)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .filter(|id| !id.is_empty())
            {
                return Some(VideoInfo::new(source, id));
            }
        }
    }

    None
}

/// An iframe element the adapter writes into the player container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IframeSpec {
    pub src: String,
    pub width: String,
    pub height: String,
    pub allow: String,
    pub borderless: bool,
}

impl IframeSpec {
    pub fn new(src: impl Into<String>, allow: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            width: "100%".to_string(),
            height: "100%".to_string(),
            allow: allow.into(),
            borderless: true,
        }
    }

    /// Render as HTML markup
    pub fn to_html(&self) -> String {
        let style = if self.borderless {
            " style=\"border: none\""
        } else {
            ""
        };
        format!(
            "<iframe src=\"{}\" width=\"{}\" height=\"{}\"{} allow=\"{}\"></iframe>",
            escape_attr(&self.src),
            escape_attr(&self.width),
            escape_attr(&self.height),
            style,
            escape_attr(&self.allow),
        )
    }
}

/// Escape a value for a double-quoted HTML attribute
pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
