//! Temporal raster synchronizer core.
//!
//! Maps a mutable tuple of selection parameters to a single authoritative
//! image request, guarantees that only the most recent request's result is
//! ever displayed, drives a cancellable timer-based playback loop, and
//! coordinates full dataset switches without leaving the view in an
//! inconsistent state.
//!
//! All work runs on the tokio runtime as interleaved asynchronous
//! operations; state mutation and fence checks are synchronous with
//! respect to the state lock, so display order is decided by fence
//! currency at resolution time, never by call or completion order.

pub mod events;
pub mod fence;
pub mod fetch;
pub mod playback;
pub mod render;
pub mod selection;
mod switch;
pub mod synchronizer;

pub use events::ViewerEvent;
pub use fence::{FenceToken, RequestFence};
pub use fetch::{FetchError, OverlayFetcher};
pub use playback::{next_time_index, PlaybackClock};
pub use render::{OverlayDescriptor, RenderTarget, OVERLAY_OPACITY};
pub use selection::SelectionState;
pub use synchronizer::{Snapshot, Synchronizer, SynchronizerConfig};
