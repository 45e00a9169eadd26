//! Console render target.
//!
//! Stands in for the map surface: logs attach/detach commands instead of
//! drawing. Attach replaces the previous layer in the same call, matching
//! the render-target contract.

use async_trait::async_trait;
use tracing::info;

use viewer_sync::{OverlayDescriptor, RenderTarget};

#[derive(Debug, Default)]
pub struct ConsoleRenderTarget {
    attached: Option<String>,
}

#[async_trait]
impl RenderTarget for ConsoleRenderTarget {
    async fn attach(&mut self, overlay: &OverlayDescriptor) {
        let replaced = self.attached.replace(overlay.source_url.clone());
        info!(
            url = %overlay.source_url,
            bytes = overlay.image.len(),
            lat_min = overlay.bounds.lat_min,
            lat_max = overlay.bounds.lat_max,
            lon_min = overlay.bounds.lon_min,
            lon_max = overlay.bounds.lon_max,
            opacity = overlay.opacity,
            replaced = replaced.is_some(),
            "Overlay attached"
        );
    }

    async fn detach(&mut self) {
        if self.attached.take().is_some() {
            info!("Overlay detached");
        }
    }
}
