//! Scripted host and provider SDK fakes shared by the unit tests

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::DEFAULT_CONTAINER_ID;
use crate::error::{PlayerError, Result};
use crate::host::{EmbedHost, FrameRef, ScriptSpec};
use crate::media::{
    VimeoApi, VimeoCallback, VimeoEvent, VimeoSdkPlayer, YouTubeApi, YouTubeEvents,
    YouTubeSdkPlayer,
};
use crate::source::IframeSpec;

type CallLog = Arc<Mutex<Vec<String>>>;

/// How script loads behave
#[derive(Clone)]
pub enum ScriptMode {
    Ready,
    Fail,
    Hang,
    /// Resolve once the gate holds `true`
    Gated(watch::Receiver<bool>),
    /// Fail the first `n` loads, then succeed
    Flaky(u32),
}

pub struct FakeHost {
    log: CallLog,
    mode: Mutex<ScriptMode>,
    loads: AtomicU32,
    injections: AtomicU32,
    api_present: AtomicBool,
    present_scripts: Mutex<HashSet<String>>,
    containers: Mutex<HashMap<String, Vec<String>>>,
    next_key: AtomicU64,
    pub youtube: Arc<FakeYouTube>,
    pub vimeo: Arc<FakeVimeo>,
}

impl FakeHost {
    pub fn new() -> Arc<Self> {
        let host = Self::without_container();
        host.containers
            .lock()
            .insert(DEFAULT_CONTAINER_ID.to_string(), Vec::new());
        host
    }

    pub fn without_container() -> Arc<Self> {
        let log: CallLog = Arc::default();
        Arc::new(Self {
            youtube: Arc::new(FakeYouTube::new(Arc::clone(&log))),
            vimeo: Arc::new(FakeVimeo::new(Arc::clone(&log))),
            log,
            mode: Mutex::new(ScriptMode::Ready),
            loads: AtomicU32::new(0),
            injections: AtomicU32::new(0),
            api_present: AtomicBool::new(false),
            present_scripts: Mutex::default(),
            containers: Mutex::default(),
            next_key: AtomicU64::new(1),
        })
    }

    pub fn set_mode(&self, mode: ScriptMode) {
        *self.mode.lock() = mode;
    }

    pub fn set_api_present(&self, present: bool) {
        self.api_present.store(present, Ordering::SeqCst);
    }

    /// Pretend another component already inserted this script tag
    pub fn add_script_tag(&self, src: &str) {
        self.present_scripts.lock().insert(src.to_string());
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn position_of(&self, entry: &str) -> Option<usize> {
        self.log.lock().iter().position(|e| e == entry)
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.log.lock().iter().filter(|e| e.starts_with(prefix)).count()
    }

    pub fn injections(&self) -> u32 {
        self.injections.load(Ordering::SeqCst)
    }

    pub fn container(&self, id: &str) -> Option<Vec<String>> {
        self.containers.lock().get(id).cloned()
    }

    fn pending_load(&self) -> BoxFuture<'static, Result<()>> {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        match self.mode.lock().clone() {
            ScriptMode::Ready => futures::future::ready(Ok(())).boxed(),
            ScriptMode::Fail => {
                futures::future::ready(Err(PlayerError::ScriptLoad("network error".to_string())))
                    .boxed()
            }
            ScriptMode::Hang => futures::future::pending::<Result<()>>().boxed(),
            ScriptMode::Gated(mut gate) => async move {
                loop {
                    let open = *gate.borrow_and_update();
                    if open {
                        return Ok(());
                    }
                    if gate.changed().await.is_err() {
                        return Err(PlayerError::ScriptLoad("gate dropped".to_string()));
                    }
                }
            }
            .boxed(),
            ScriptMode::Flaky(failures) => {
                let result = if attempt <= failures {
                    Err(PlayerError::ScriptLoad(format!("flaky failure {}", attempt)))
                } else {
                    Ok(())
                };
                futures::future::ready(result).boxed()
            }
        }
    }
}

impl EmbedHost for FakeHost {
    fn api_present(&self, _script: &ScriptSpec) -> bool {
        self.api_present.load(Ordering::SeqCst)
    }

    fn script_present(&self, src: &str) -> bool {
        self.present_scripts.lock().contains(src)
    }

    fn inject_script(&self, script: ScriptSpec) -> BoxFuture<'static, Result<()>> {
        self.log.lock().push(format!("inject:{}", script.src));
        self.injections.fetch_add(1, Ordering::SeqCst);
        self.present_scripts.lock().insert(script.src.to_string());
        self.pending_load()
    }

    fn wait_for_script(&self, script: ScriptSpec) -> BoxFuture<'static, Result<()>> {
        self.log.lock().push(format!("wait:{}", script.src));
        self.pending_load()
    }

    fn container_exists(&self, id: &str) -> bool {
        self.containers.lock().contains_key(id)
    }

    fn clear_container(&self, id: &str) {
        self.log.lock().push(format!("clear:{}", id));
        if let Some(children) = self.containers.lock().get_mut(id) {
            children.clear();
        }
    }

    fn attach_iframe(&self, container_id: &str, frame: &IframeSpec) -> Result<FrameRef> {
        let mut containers = self.containers.lock();
        let children = containers
            .get_mut(container_id)
            .ok_or_else(|| PlayerError::ContainerMissing(container_id.to_string()))?;
        children.push(frame.src.clone());
        self.log.lock().push(format!("attach:{}", frame.src));
        Ok(FrameRef {
            container_id: container_id.to_string(),
            key: self.next_key.fetch_add(1, Ordering::SeqCst),
        })
    }

    fn youtube_api(&self) -> Option<Arc<dyn YouTubeApi>> {
        Some(Arc::clone(&self.youtube) as Arc<dyn YouTubeApi>)
    }

    fn vimeo_api(&self) -> Option<Arc<dyn VimeoApi>> {
        Some(Arc::clone(&self.vimeo) as Arc<dyn VimeoApi>)
    }
}

/// Position and read counters shared between a fake SDK and its players
#[derive(Default)]
pub struct FakePosition {
    position: Mutex<(f64, f64)>,
    reads: AtomicU32,
    fail_reads: AtomicBool,
}

impl FakePosition {
    pub fn set(&self, current_time: f64, duration: f64) {
        *self.position.lock() = (current_time, duration);
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
    }

    pub fn reads(&self) -> u32 {
        self.reads.load(Ordering::SeqCst)
    }

    fn current_time(&self) -> f64 {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.position.lock().0
    }

    fn duration(&self) -> f64 {
        self.position.lock().1
    }
}

pub struct FakeYouTube {
    log: CallLog,
    events: Mutex<Option<YouTubeEvents>>,
    pub position: Arc<FakePosition>,
}

impl FakeYouTube {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            events: Mutex::new(None),
            position: Arc::default(),
        }
    }

    /// Invoke `onReady` of the most recently created player
    pub fn fire_ready(&self) {
        if let Some(events) = self.events.lock().as_ref() {
            (events.on_ready)();
        }
    }

    pub fn fire_state_change(&self, code: i32) {
        if let Some(events) = self.events.lock().as_ref() {
            (events.on_state_change)(code);
        }
    }
}

impl YouTubeApi for FakeYouTube {
    fn create_player(
        &self,
        element_id: &str,
        video_id: &str,
        events: YouTubeEvents,
    ) -> Result<Box<dyn YouTubeSdkPlayer>> {
        self.log
            .lock()
            .push(format!("yt:create:{}@{}", video_id, element_id));
        *self.events.lock() = Some(events);
        Ok(Box::new(FakeYouTubePlayer {
            log: Arc::clone(&self.log),
            video_id: video_id.to_string(),
            position: Arc::clone(&self.position),
        }))
    }
}

struct FakeYouTubePlayer {
    log: CallLog,
    video_id: String,
    position: Arc<FakePosition>,
}

impl YouTubeSdkPlayer for FakeYouTubePlayer {
    fn play_video(&self) {
        self.log.lock().push("yt:play".to_string());
    }

    fn pause_video(&self) {
        self.log.lock().push("yt:pause".to_string());
    }

    fn seek_to(&self, seconds: f64) {
        self.log.lock().push(format!("yt:seek:{}", seconds));
    }

    fn get_current_time(&self) -> f64 {
        self.position.current_time()
    }

    fn get_duration(&self) -> f64 {
        self.position.duration()
    }

    fn destroy(&self) {
        self.log.lock().push(format!("yt:destroy:{}", self.video_id));
    }
}

type CallbackMap = HashMap<VimeoEvent, Vec<VimeoCallback>>;

pub struct FakeVimeo {
    log: CallLog,
    callbacks: Arc<Mutex<CallbackMap>>,
    pub position: Arc<FakePosition>,
}

impl FakeVimeo {
    fn new(log: CallLog) -> Self {
        Self {
            log,
            callbacks: Arc::default(),
            position: Arc::default(),
        }
    }

    pub fn fire(&self, event: VimeoEvent) {
        if let Some(callbacks) = self.callbacks.lock().get(&event) {
            for callback in callbacks {
                callback();
            }
        }
    }
}

impl VimeoApi for FakeVimeo {
    fn create_player(&self, frame: &FrameRef) -> Result<Arc<dyn VimeoSdkPlayer>> {
        self.log.lock().push(format!("vimeo:create:{}", frame.key));
        self.callbacks.lock().clear();
        Ok(Arc::new(FakeVimeoPlayer {
            log: Arc::clone(&self.log),
            callbacks: Arc::clone(&self.callbacks),
            position: Arc::clone(&self.position),
        }))
    }
}

struct FakeVimeoPlayer {
    log: CallLog,
    callbacks: Arc<Mutex<CallbackMap>>,
    position: Arc<FakePosition>,
}

impl FakeVimeoPlayer {
    fn check_reads(&self) -> Result<()> {
        if self.position.fail_reads.load(Ordering::SeqCst) {
            Err(PlayerError::Read("player is not responding".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VimeoSdkPlayer for FakeVimeoPlayer {
    async fn play(&self) -> Result<()> {
        self.log.lock().push("vimeo:play".to_string());
        Ok(())
    }

    async fn pause(&self) -> Result<()> {
        self.log.lock().push("vimeo:pause".to_string());
        Ok(())
    }

    async fn set_current_time(&self, seconds: f64) -> Result<()> {
        self.log.lock().push(format!("vimeo:seek:{}", seconds));
        Ok(())
    }

    async fn get_current_time(&self) -> Result<f64> {
        self.check_reads()?;
        Ok(self.position.current_time())
    }

    async fn get_duration(&self) -> Result<f64> {
        self.check_reads()?;
        Ok(self.position.duration())
    }

    fn on(&self, event: VimeoEvent, callback: VimeoCallback) {
        self.callbacks.lock().entry(event).or_default().push(callback);
    }

    fn destroy(&self) {
        self.log.lock().push("vimeo:destroy".to_string());
    }
}
