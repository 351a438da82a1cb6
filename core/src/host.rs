//! Contract with the page that embeds the player.
//!
//! The adapter never touches a document directly. Everything it needs from
//! the embedding environment (script tags, the container slot, the provider
//! SDK globals) goes through [`EmbedHost`].

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::Result;
use crate::media::{VimeoApi, YouTubeApi};
use crate::source::IframeSpec;

/// How a provider script signals that its API is usable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptReady {
    /// The script tag's load event
    OnLoad,
    /// A named global callback the script invokes
    GlobalCallback(&'static str),
}

/// An external provider script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptSpec {
    pub src: &'static str,
    pub ready: ScriptReady,
}

/// Reference to an iframe the host attached to a container
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameRef {
    pub container_id: String,
    pub key: u64,
}

/// Embedding environment
pub trait EmbedHost: Send + Sync {
    /// Whether the provider's API global is already installed
    fn api_present(&self, script: &ScriptSpec) -> bool;

    /// Whether a script tag with this source is already in the document
    fn script_present(&self, src: &str) -> bool;

    /// Insert a script tag and resolve once the API is ready. Any existing
    /// tag with the same source is replaced.
    fn inject_script(&self, script: ScriptSpec) -> BoxFuture<'static, Result<()>>;

    /// Resolve once a script injected by someone else reports ready
    fn wait_for_script(&self, script: ScriptSpec) -> BoxFuture<'static, Result<()>>;

    fn container_exists(&self, id: &str) -> bool;

    /// Remove everything inside the container
    fn clear_container(&self, id: &str);

    /// Append an iframe to the container
    fn attach_iframe(&self, container_id: &str, frame: &IframeSpec) -> Result<FrameRef>;

    fn youtube_api(&self) -> Option<Arc<dyn YouTubeApi>>;

    fn vimeo_api(&self) -> Option<Arc<dyn VimeoApi>>;
}
