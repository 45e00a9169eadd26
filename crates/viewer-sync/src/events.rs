//! Events delivered to the host view.

use viewer_common::{GeoBounds, SelectionTuple, ViewerError};

/// Notifications the host uses to drive loading indicators and messages.
/// Stale results never produce an event; they are discarded silently.
#[derive(Debug)]
pub enum ViewerEvent {
    /// A fresh overlay was attached to the render target.
    LayerReady {
        dataset: String,
        tuple: SelectionTuple,
        time_label: Option<String>,
        bounds: GeoBounds,
    },
    /// The current (still-authoritative) fetch failed; the previous
    /// overlay remains attached. The next parameter change retries.
    LayerError { error: ViewerError },
    /// A dataset switch completed and the selection was reset to the new
    /// axis defaults.
    DatasetSwitched {
        dataset: String,
        tuple: SelectionTuple,
    },
    /// A dataset switch failed; the previous dataset remains fully active.
    SwitchFailed {
        dataset: String,
        error: ViewerError,
    },
    PlaybackStarted,
    PlaybackStopped,
}
