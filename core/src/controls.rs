use std::future::Future;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::Result;
use crate::media::ProviderHandle;
use crate::player::Inner;

/// Playback controls for whichever provider is mounted.
///
/// Calls are no-ops until the active player is ready, and for providers
/// without controls (Drive). Provider errors are logged, never returned.
#[derive(Clone)]
pub struct Controls {
    inner: Arc<Inner>,
}

/// A controllable handle and the mount it belongs to
struct Target {
    epoch: u64,
    handle: Arc<dyn ProviderHandle>,
}

impl Controls {
    pub(crate) fn new(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Whether control calls currently reach a player
    pub fn is_available(&self) -> bool {
        self.inner
            .ready_handle()
            .is_some_and(|(_, handle)| handle.capabilities().controls)
    }

    pub async fn play(&self) {
        if let Some(target) = self.target("play") {
            self.dispatch(target, "play", |handle| async move { handle.play().await })
                .await;
        }
    }

    pub async fn pause(&self) {
        if let Some(target) = self.target("pause") {
            self.dispatch(target, "pause", |handle| async move { handle.pause().await })
                .await;
        }
    }

    /// Seek to `seconds` from the start
    pub async fn seek_to(&self, seconds: f64) {
        if !seconds.is_finite() {
            warn!("Ignoring seek to non-finite position {}", seconds);
            return;
        }
        let seconds = seconds.max(0.0);
        if let Some(target) = self.target("seek") {
            self.dispatch(target, "seek", move |handle| async move {
                handle.seek_to(seconds).await
            })
            .await;
        }
    }

    fn target(&self, action: &str) -> Option<Target> {
        let target = self
            .inner
            .ready_handle()
            .filter(|(_, handle)| handle.capabilities().controls)
            .map(|(epoch, handle)| Target { epoch, handle });
        if target.is_none() {
            debug!("No controllable player for {}", action);
        }
        target
    }

    /// Call into the provider unless its mount was torn down since lookup
    async fn dispatch<F, Fut>(&self, target: Target, action: &str, call: F)
    where
        F: FnOnce(Arc<dyn ProviderHandle>) -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        if !self.inner.is_current(target.epoch) {
            debug!("Dropping {} for a torn-down {} player", action, target.handle.source());
            return;
        }
        let source = target.handle.source();
        if let Err(e) = call(target.handle).await {
            warn!("{} {} failed: {}", source, action, e);
        }
    }
}
