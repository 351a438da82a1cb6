//! Per-instance lifecycle of an embedded player.
//!
//! A [`VideoPlayer`] owns at most one provider handle. Every mount gets an
//! epoch; teardown bumps it, so any bootstrap completion, provider event or
//! poll tick belonging to an older mount is discarded when it arrives.


use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, error, info};
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::bootstrap::ScriptLoader;
use crate::config::PlayerConfig;
use crate::controls::Controls;
use crate::error::{PlayerError, Result};
use crate::host::EmbedHost;
use crate::media::{self, EventSink, MountContext, ProviderEvent, ProviderHandle};
use crate::source::{self, VideoInfo, VideoSource};
use crate::sync;
use crate::video::{Phase, PlaybackState, PlayerSnapshot, Position};

/// Multi-provider embedded video player
pub struct VideoPlayer {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    host: Arc<dyn EmbedHost>,
    loader: Arc<ScriptLoader>,
    pub(crate) config: PlayerConfig,
    epoch: AtomicU64,
    slot: Mutex<Slot>,
    pub(crate) state: watch::Sender<PlaybackState>,
    phase: watch::Sender<Phase>,
}

#[derive(Default)]
struct Slot {
    url: Option<String>,
    info: Option<VideoInfo>,
    active: Option<Active>,
    tasks: Vec<JoinHandle<()>>,
}

struct Active {
    handle: Arc<dyn ProviderHandle>,
    ready: bool,
}

impl VideoPlayer {
    /// Create a player that bootstraps scripts through the process-wide loader
    pub fn new(host: Arc<dyn EmbedHost>, config: PlayerConfig) -> Result<Self> {
        Self::with_loader(host, config, ScriptLoader::global())
    }

    pub fn with_loader(
        host: Arc<dyn EmbedHost>,
        config: PlayerConfig,
        loader: Arc<ScriptLoader>,
    ) -> Result<Self> {
        config.validate()?;
        let (state, _) = watch::channel(PlaybackState::default());
        let (phase, _) = watch::channel(Phase::Idle);

        Ok(Self {
            inner: Arc::new(Inner {
                host,
                loader,
                config,
                epoch: AtomicU64::new(0),
                slot: Mutex::new(Slot::default()),
                state,
                phase,
            }),
        })
    }

    /// Mount `url`, replacing whatever is mounted now.
    ///
    /// The previous player is torn down before this returns. Returns the
    /// resolved video, or `None` when the URL matches no provider, in which
    /// case nothing is mounted. Loading the URL that is already mounted does
    /// nothing unless the previous attempt failed.
    ///
    /// # Panics
    ///
    /// Must be called from within a tokio runtime.
    pub fn load(&self, url: &str) -> Option<VideoInfo> {
        let inner = &self.inner;
        let mut slot = inner.slot.lock();

        if slot.url.as_deref() == Some(url) && *inner.phase.borrow() != Phase::Failed {
            return slot.info.clone();
        }

        inner.teardown(&mut slot);
        slot.url = Some(url.to_string());

        let Some(info) = source::resolve(url) else {
            debug!("No video provider matches {:?}", url);
            inner.phase.send_replace(Phase::Idle);
            return None;
        };

        info!("Mounting {} video {}", info.source, info.id);
        slot.info = Some(info.clone());
        let epoch = inner.epoch.load(Ordering::SeqCst);
        inner.phase.send_replace(Phase::Bootstrapping);

        let (tx, rx) = mpsc::unbounded_channel();
        slot.tasks.push(tokio::spawn(pump_events(Arc::clone(inner), epoch, rx)));
        slot.tasks.push(tokio::spawn(mount(
            Arc::clone(inner),
            epoch,
            info.clone(),
            EventSink::new(tx),
        )));

        Some(info)
    }

    /// Tear down the mounted player, if any
    pub fn unmount(&self) {
        let mut slot = self.inner.slot.lock();
        self.inner.teardown(&mut slot);
    }

    pub fn state(&self) -> PlaybackState {
        *self.inner.state.borrow()
    }

    /// Receive every published state change
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.inner.state.subscribe()
    }

    pub fn phase(&self) -> Phase {
        *self.inner.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.inner.phase.subscribe()
    }

    pub fn video_info(&self) -> Option<VideoInfo> {
        self.inner.slot.lock().info.clone()
    }

    pub fn video_source(&self) -> Option<VideoSource> {
        self.inner.slot.lock().info.as_ref().map(|info| info.source)
    }

    pub fn controls(&self) -> Controls {
        Controls::new(Arc::clone(&self.inner))
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot::new(self.state(), self.video_source())
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.inner.config
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl Inner {
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    /// The active handle and its mount epoch, once it is ready
    pub(crate) fn ready_handle(&self) -> Option<(u64, Arc<dyn ProviderHandle>)> {
        let slot = self.slot.lock();
        let epoch = self.epoch.load(Ordering::SeqCst);
        slot.active
            .as_ref()
            .filter(|active| active.ready)
            .map(|active| (epoch, Arc::clone(&active.handle)))
    }

    /// Publish a polled position for `epoch`. Returns false once the mount
    /// is stale, in which case the state is left untouched.
    pub(crate) fn publish_position(&self, epoch: u64, position: Position) -> bool {
        // Teardown bumps the epoch before it resets the state, so the check
        // has to happen under the watch lock
        let mut live = false;
        self.state.send_if_modified(|state| {
            live = self.is_current(epoch);
            if live {
                state.apply_position(position);
            }
            live
        });
        live
    }

    fn teardown(&self, slot: &mut Slot) {
        self.epoch.fetch_add(1, Ordering::SeqCst);

        for task in slot.tasks.drain(..) {
            task.abort();
        }

        slot.url = None;
        let Some(info) = slot.info.take() else {
            return;
        };

        if let Some(active) = slot.active.take() {
            debug!("Destroying {} player", active.handle.source());
            active.handle.destroy();
        }
        self.host.clear_container(&self.config.container_id);

        self.state.send_replace(PlaybackState::default());
        self.phase.send_replace(Phase::Destroyed);
        debug!("Tore down {} video {}", info.source, info.id);
    }

    /// Build and install the provider handle for `epoch`.
    ///
    /// Runs under the slot lock, so it is never interleaved with a teardown.
    fn install(&self, epoch: u64, info: VideoInfo, events: EventSink) {
        let mut slot = self.slot.lock();
        if !self.is_current(epoch) {
            debug!("Discarding {} construction for a torn-down mount", info.source);
            return;
        }

        self.phase.send_replace(Phase::Constructing);
        let source = info.source;
        let ctx = MountContext {
            info,
            container_id: self.config.container_id.clone(),
            host: Arc::clone(&self.host),
            events,
        };

        match media::adapter_for(source).construct(ctx) {
            Ok(handle) => {
                slot.active = Some(Active {
                    handle,
                    ready: false,
                });
            }
            Err(e) => {
                error!("Failed to create {} player: {}", source, e);
                self.phase.send_replace(Phase::Failed);
            }
        }
    }

    fn fail(&self, epoch: u64, err: &PlayerError) {
        let _slot = self.slot.lock();
        if self.is_current(epoch) {
            error!("Video player failed: {}", err);
            self.phase.send_replace(Phase::Failed);
        }
    }

    /// Apply a provider event. Returns false once the mount is stale.
    fn handle_event(self: &Arc<Self>, epoch: u64, event: ProviderEvent) -> bool {
        let mut slot = self.slot.lock();
        if !self.is_current(epoch) {
            return false;
        }

        match event {
            ProviderEvent::Ready => {
                let Some(active) = slot.active.as_mut() else {
                    return true;
                };
                if active.ready {
                    return true;
                }
                active.ready = true;
                let handle = Arc::clone(&active.handle);

                self.state.send_modify(|state| state.is_ready = true);
                self.phase.send_replace(Phase::Ready);
                info!("{} player ready", handle.source());

                if handle.capabilities().polls {
                    let poller =
                        sync::spawn_poller(Arc::clone(self), epoch, handle, self.config.poll_interval);
                    slot.tasks.push(poller);
                }
            }
            ProviderEvent::Playing(playing) => {
                self.state.send_modify(|state| state.is_playing = playing);
            }
        }
        true
    }
}

async fn mount(inner: Arc<Inner>, epoch: u64, info: VideoInfo, events: EventSink) {
    if let Some(script) = info.source.script() {
        let host = Arc::clone(&inner.host);
        if let Err(e) = inner.loader.ensure(host, script, &inner.config.bootstrap).await {
            inner.fail(epoch, &e);
            return;
        }
    }
    inner.install(epoch, info, events);
}

async fn pump_events(inner: Arc<Inner>, epoch: u64, mut rx: mpsc::UnboundedReceiver<ProviderEvent>) {
    while let Some(event) = rx.recv().await {
        if !inner.handle_event(epoch, event) {
            break;
        }
    }
}
