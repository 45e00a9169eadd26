//! The seam to the map surface.

use async_trait::async_trait;
use bytes::Bytes;

use viewer_common::{GeoBounds, SelectionTuple};

use crate::fence::FenceToken;

/// Opacity the raster overlay is drawn with.
pub const OVERLAY_OPACITY: f64 = 0.6;

/// A preloaded raster layer ready to attach.
///
/// Created by the fetch pipeline on a successful preload and consumed
/// exactly once by the attach step; dropped without any render-target
/// mutation when its token is no longer current at consumption time.
/// Never mutated after creation.
#[derive(Debug, Clone)]
pub struct OverlayDescriptor {
    /// Preloaded raster bytes.
    pub image: Bytes,
    /// The image reference the raster was loaded from.
    pub source_url: String,
    /// Geographic rectangle the raster is stretched over.
    pub bounds: GeoBounds,
    /// Fence token of the request that produced this layer.
    pub token: FenceToken,
    /// The tuple the layer was rendered for.
    pub tuple: SelectionTuple,
    pub opacity: f64,
}

/// The map surface. It accepts exactly two commands: attach a layer and
/// detach the current one. Everything else about the map is outside this
/// subsystem.
#[async_trait]
pub trait RenderTarget: Send {
    /// Attach `overlay`, replacing any previously attached layer as a
    /// single step. Callers never observe an intermediate frame with zero
    /// or two overlays.
    async fn attach(&mut self, overlay: &OverlayDescriptor);

    /// Remove the current layer, if any.
    async fn detach(&mut self);
}
