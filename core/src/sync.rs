use std::sync::Arc;
use std::time::Duration;

use log::{trace, warn};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::media::ProviderHandle;
use crate::player::Inner;

/// Poll position and duration from `handle` every `period` while `epoch`
/// is the live mount. The first read happens one period after start.
pub(crate) fn spawn_poller(
    inner: Arc<Inner>,
    epoch: u64,
    handle: Arc<dyn ProviderHandle>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if !inner.is_current(epoch) {
                break;
            }

            match handle.read_state().await {
                Ok(Some(position)) => {
                    trace!(
                        "{} at {:.2}s / {:.2}s",
                        handle.source(),
                        position.current_time,
                        position.duration
                    );
                    if !inner.publish_position(epoch, position) {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    // Transient; the next tick retries
                    warn!("Error tracking {} time: {}", handle.source(), e);
                }
            }
        }
    })
}
