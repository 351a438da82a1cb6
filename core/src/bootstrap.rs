//! Once-per-process loading of provider scripts.
//!
//! Every provider script is loaded through a single shared future keyed by
//! its source URL. Concurrent mounts await the same future instead of each
//! injecting a tag or overwriting a global ready callback.

use std::collections::HashMap;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::config::BootstrapPolicy;
use crate::error::{PlayerError, Result};
use crate::host::{EmbedHost, ScriptSpec};

type LoadFuture = Shared<BoxFuture<'static, Result<()>>>;

static GLOBAL_LOADER: Lazy<Arc<ScriptLoader>> = Lazy::new(|| Arc::new(ScriptLoader::new()));

/// Provider script loader
#[derive(Default)]
pub struct ScriptLoader {
    loads: Mutex<HashMap<&'static str, LoadFuture>>,
}

impl ScriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide loader shared by every player
    pub fn global() -> Arc<ScriptLoader> {
        Arc::clone(&GLOBAL_LOADER)
    }

    /// Resolve once the provider API behind `script` is usable.
    ///
    /// A load that exhausts its attempts is evicted so a later mount can try
    /// again; every caller waiting on it receives the same error.
    pub async fn ensure(
        &self,
        host: Arc<dyn EmbedHost>,
        script: ScriptSpec,
        policy: &BootstrapPolicy,
    ) -> Result<()> {
        if host.api_present(&script) {
            return Ok(());
        }

        let load = {
            let mut loads = self.loads.lock();
            loads
                .entry(script.src)
                .or_insert_with(|| {
                    debug!("Starting load of provider script {}", script.src);
                    load_with_policy(host, script, policy.clone()).boxed().shared()
                })
                .clone()
        };

        let result = load.clone().await;
        if result.is_err() {
            let mut loads = self.loads.lock();
            if loads.get(script.src).is_some_and(|current| current.ptr_eq(&load)) {
                loads.remove(script.src);
            }
        }
        result
    }

    /// Whether a load for this script has been started and not evicted
    pub fn is_tracked(&self, src: &str) -> bool {
        self.loads.lock().contains_key(src)
    }
}

async fn load_with_policy(
    host: Arc<dyn EmbedHost>,
    script: ScriptSpec,
    policy: BootstrapPolicy,
) -> Result<()> {
    let attempts = policy.attempts();
    let mut reason = String::new();

    for attempt in 1..=attempts {
        // Only the first attempt may adopt a tag someone else inserted
        let pending = if attempt == 1 && host.script_present(script.src) {
            debug!("Script {} already present, waiting for readiness", script.src);
            host.wait_for_script(script)
        } else {
            info!("Injecting provider script {} (attempt {}/{})", script.src, attempt, attempts);
            host.inject_script(script)
        };

        match tokio::time::timeout(policy.timeout, pending).await {
            Ok(Ok(())) => {
                info!("Provider script {} ready", script.src);
                return Ok(());
            }
            Ok(Err(e)) => {
                warn!("Loading {} failed: {}", script.src, e);
                reason = e.to_string();
            }
            Err(_) => {
                warn!("Loading {} timed out after {:?}", script.src, policy.timeout);
                reason = format!("timed out after {:?}", policy.timeout);
            }
        }

        if attempt < attempts {
            tokio::time::sleep(policy.retry_delay).await;
        }
    }

    Err(PlayerError::Bootstrap {
        src: script.src.to_string(),
        attempts,
        reason,
    })
}
