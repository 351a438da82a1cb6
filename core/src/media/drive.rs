use std::sync::Arc;

use async_trait::async_trait;
use log::debug;

use super::{
    Capabilities, MountContext, ProviderAdapter, ProviderEvent, ProviderHandle, inject_iframe,
};
use crate::error::Result;
use crate::host::FrameRef;
use crate::source::VideoSource;

/// Google Drive: a bare preview iframe with no scripting API.
///
/// There is no ready event, so the player counts as ready as soon as the
/// iframe is attached. Position, duration and controls are unavailable.
pub struct DriveAdapter;

impl ProviderAdapter for DriveAdapter {
    fn source(&self) -> VideoSource {
        VideoSource::Drive
    }

    fn construct(&self, ctx: MountContext) -> Result<Arc<dyn ProviderHandle>> {
        let frame = inject_iframe(&ctx)?;
        debug!("Attached Drive preview for file {}", ctx.info.id);
        ctx.events.emit(ProviderEvent::Ready);
        Ok(Arc::new(DriveHandle { _frame: frame }))
    }
}

struct DriveHandle {
    _frame: FrameRef,
}

#[async_trait]
impl ProviderHandle for DriveHandle {
    fn source(&self) -> VideoSource {
        VideoSource::Drive
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::NONE
    }

    // The iframe goes away when teardown clears the container
    fn destroy(&self) {}
}
