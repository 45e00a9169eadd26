//! The service seam consumed by the synchronizer core.

use async_trait::async_trait;
use bytes::Bytes;

use viewer_common::{GeoBounds, SelectionTuple, TimeInfo, ViewerResult};

/// Collaborator services the synchronizer depends on.
///
/// Every method is a request/response call against the active dataset;
/// `switch_dataset` changes which dataset is active server-side.
/// Implementations must be cheap to share behind an `Arc`.
#[async_trait]
pub trait PollutionService: Send + Sync {
    /// Geographic extent of the active dataset.
    async fn geo_bounds(&self) -> ViewerResult<GeoBounds>;

    /// Species identifiers in server-declared order.
    async fn species(&self) -> ViewerResult<Vec<String>>;

    /// Available data-type identifiers.
    async fn data_types(&self) -> ViewerResult<Vec<String>>;

    /// Human-readable label for a time index plus the axis's current
    /// maximum index.
    async fn time_info(&self, time_index: u32) -> ViewerResult<TimeInfo>;

    /// The image reference a given tuple resolves to. All five tuple
    /// fields are encoded as query parameters.
    fn image_url(&self, tuple: &SelectionTuple) -> String;

    /// Fetch the raster for a tuple. This is the preload step; the caller
    /// decides whether the result is still current before attaching it.
    async fn fetch_image(&self, tuple: &SelectionTuple) -> ViewerResult<Bytes>;

    /// Identifiers of every dataset the server knows about.
    async fn datasets(&self) -> ViewerResult<Vec<String>>;

    /// Make `dataset` the server-side active dataset. Fails without side
    /// effects if the identifier is unknown.
    async fn switch_dataset(&self, dataset: &str) -> ViewerResult<()>;
}
