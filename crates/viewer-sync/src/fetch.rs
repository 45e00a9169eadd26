//! Overlay fetching: bounds resolution, image preload, cancellation.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use pollution_client::PollutionService;
use viewer_common::{GeoBounds, SelectionTuple, TimeInfo, ViewerError};

use crate::fence::FenceToken;
use crate::render::OverlayDescriptor;

/// Why a fetch produced no descriptor.
#[derive(Debug)]
pub enum FetchError {
    /// A newer request superseded this one mid-flight. Not an error;
    /// dropped silently.
    Superseded,
    /// A collaborator call failed. Surfaced as a transient failure when
    /// the request was still current.
    Service(ViewerError),
}

impl From<ViewerError> for FetchError {
    fn from(err: ViewerError) -> Self {
        FetchError::Service(err)
    }
}

/// Turns a parameter tuple into a ready-to-attach overlay descriptor.
///
/// Each step is a suspension point: resolve geographic bounds (skipped
/// when the caller has them cached for the current dataset generation),
/// build the image reference, preload the raster, and read the time label.
/// The network portion honors `cancel` as a best-effort optimization;
/// correctness depends only on the caller's fence check at attach time.
pub struct OverlayFetcher {
    service: Arc<dyn PollutionService>,
    opacity: f64,
}

impl OverlayFetcher {
    pub fn new(service: Arc<dyn PollutionService>, opacity: f64) -> Self {
        Self { service, opacity }
    }

    pub async fn fetch(
        &self,
        tuple: SelectionTuple,
        token: FenceToken,
        cached_bounds: Option<GeoBounds>,
        cancel: &CancellationToken,
    ) -> Result<(OverlayDescriptor, Option<TimeInfo>), FetchError> {
        let bounds = match cached_bounds {
            Some(bounds) => bounds,
            None => {
                let bounds = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(FetchError::Superseded),
                    res = self.service.geo_bounds() => res?,
                };
                if !bounds.is_valid() {
                    return Err(FetchError::Service(ViewerError::Decode(format!(
                        "degenerate geographic bounds: {:?}",
                        bounds
                    ))));
                }
                bounds
            }
        };

        let source_url = self.service.image_url(&tuple);
        debug!(token = token.value(), url = %source_url, "Preloading overlay");

        let image = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Superseded),
            res = self.service.fetch_image(&tuple) => res?,
        };

        // The time label rides along with every overlay; a failure here is
        // not fatal to the layer itself.
        let time = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Superseded),
            res = self.service.time_info(tuple.time_index) => res.ok(),
        };

        Ok((
            OverlayDescriptor {
                image,
                source_url,
                bounds,
                token,
                tuple,
                opacity: self.opacity,
            },
            time,
        ))
    }
}
