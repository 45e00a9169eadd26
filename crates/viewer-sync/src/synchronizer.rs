//! The synchronizer facade: host surface, fetch pipeline, playback glue.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pollution_client::PollutionService;
use viewer_common::{AxisBounds, GeoBounds, Param, SelectionTuple, ViewerResult};

use crate::events::ViewerEvent;
use crate::fence::{FenceToken, RequestFence};
use crate::fetch::{FetchError, OverlayFetcher};
use crate::playback::{next_time_index, PlaybackClock};
use crate::render::{RenderTarget, OVERLAY_OPACITY};
use crate::selection::SelectionState;
use crate::switch::load_axis_bounds;

/// Tunables for the synchronizer.
#[derive(Debug, Clone, Copy)]
pub struct SynchronizerConfig {
    /// Playback tick cadence.
    pub cadence: Duration,
    /// Opacity attached overlays are drawn with.
    pub opacity: f64,
}

impl Default for SynchronizerConfig {
    fn default() -> Self {
        Self {
            cadence: Duration::from_millis(1000),
            opacity: OVERLAY_OPACITY,
        }
    }
}

/// A consistent view of the current selection for the host.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub tuple: SelectionTuple,
    pub bounds: AxisBounds,
    pub playing: bool,
}

pub(crate) struct Shared {
    pub(crate) service: Arc<dyn PollutionService>,
    pub(crate) fence: RequestFence,
    /// Sequence of dataset switches; guards the axis swap the way the
    /// fence guards overlay attachment.
    pub(crate) switch_seq: AtomicU64,
    pub(crate) fetcher: OverlayFetcher,
    pub(crate) events: mpsc::UnboundedSender<ViewerEvent>,
    pub(crate) state: Mutex<SyncState>,
}

pub(crate) struct SyncState {
    pub(crate) selection: SelectionState,
    /// Bumped on every applied dataset switch; invalidates the bounds
    /// cache and any fetch still carrying the old generation.
    pub(crate) generation: u64,
    pub(crate) bounds_cache: Option<(u64, GeoBounds)>,
    pub(crate) render: Box<dyn RenderTarget>,
    pub(crate) playback: PlaybackClock,
    /// Best-effort cancellation handle for the newest in-flight fetch.
    pub(crate) inflight: Option<CancellationToken>,
}

/// Owns the whole pipeline from parameter edits to render-target updates.
///
/// Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct Synchronizer {
    pub(crate) shared: Arc<Shared>,
}

impl Synchronizer {
    /// Activate `dataset`, load its axis domains, and kick the first
    /// overlay fetch. Returns the synchronizer and the host event stream.
    pub async fn start(
        service: Arc<dyn PollutionService>,
        render: Box<dyn RenderTarget>,
        config: SynchronizerConfig,
        dataset: &str,
    ) -> ViewerResult<(Self, mpsc::UnboundedReceiver<ViewerEvent>)> {
        service.switch_dataset(dataset).await?;
        let bounds = load_axis_bounds(service.as_ref()).await?;
        info!(dataset = %dataset, "Synchronizer starting");

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let fetcher = OverlayFetcher::new(Arc::clone(&service), config.opacity);
        let geo = bounds.geo;

        let shared = Arc::new(Shared {
            service,
            fence: RequestFence::new(),
            switch_seq: AtomicU64::new(0),
            fetcher,
            events: events_tx,
            state: Mutex::new(SyncState {
                selection: SelectionState::new(bounds, dataset),
                generation: 0,
                bounds_cache: Some((0, geo)),
                render,
                playback: PlaybackClock::new(config.cadence),
                inflight: None,
            }),
        });

        let sync = Self { shared };
        {
            let mut st = sync.shared.state.lock().await;
            let tuple = st.selection.tuple().clone();
            let token = sync.shared.fence.next();
            Self::begin_fetch(&sync.shared, &mut st, tuple, token);
        }

        Ok((sync, events_rx))
    }

    /// Apply a single-axis parameter change. The value is clamped into the
    /// current bounds and a fetch for the resulting tuple is issued
    /// immediately under a fresh fence token.
    pub async fn set_param(&self, param: Param) {
        let mut st = self.shared.state.lock().await;
        debug!(axis = param.axis(), "Parameter change");
        let tuple = st.selection.set(param);
        let token = self.shared.fence.next();
        Self::begin_fetch(&self.shared, &mut st, tuple, token);
    }

    /// Start playback. No-op while already running.
    pub async fn play(&self) {
        let cadence;
        {
            let mut st = self.shared.state.lock().await;
            let Some(cancel) = st.playback.start() else {
                return;
            };
            cadence = st.playback.cadence();
            drop(st);

            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break,
                        _ = tokio::time::sleep(cadence) => {
                            Self::advance_time(&shared, &cancel).await;
                        }
                    }
                }
            });
        }

        let _ = self.shared.events.send(ViewerEvent::PlaybackStarted);
        info!(cadence_ms = cadence.as_millis() as u64, "Playback started");
    }

    /// Stop playback. Idempotent; guarantees no tick mutates the time
    /// axis after this returns.
    pub async fn pause(&self) {
        let stopped = {
            let mut st = self.shared.state.lock().await;
            st.playback.stop()
        };
        if stopped {
            let _ = self.shared.events.send(ViewerEvent::PlaybackStopped);
            info!("Playback paused");
        }
    }

    /// One playback tick: advance the time axis, wrapping at the maximum,
    /// and fetch the resulting frame.
    async fn advance_time(shared: &Arc<Shared>, cancel: &CancellationToken) {
        let mut st = shared.state.lock().await;
        // Paused (or torn down) while this tick waited for the lock.
        if cancel.is_cancelled() {
            return;
        }
        let range = st.selection.bounds().time;
        let next = next_time_index(st.selection.tuple().time_index, &range);
        let tuple = st.selection.set(Param::TimeIndex(next));
        debug!(time_index = tuple.time_index, "Playback tick");
        let token = shared.fence.next();
        Self::begin_fetch(shared, &mut st, tuple, token);
    }

    /// Current selection, bounds, and playback state.
    pub async fn snapshot(&self) -> Snapshot {
        let st = self.shared.state.lock().await;
        Snapshot {
            tuple: st.selection.tuple().clone(),
            bounds: st.selection.bounds().clone(),
            playing: st.playback.is_running(),
        }
    }

    /// Tear down: stop playback, supersede and cancel any in-flight
    /// fetch, and detach the overlay. The synchronizer must not mutate
    /// the render target after this returns.
    pub async fn shutdown(&self) {
        let mut st = self.shared.state.lock().await;
        st.playback.stop();
        if let Some(cancel) = st.inflight.take() {
            cancel.cancel();
        }
        self.shared.fence.next();
        st.render.detach().await;
        info!("Synchronizer shut down");
    }

    /// Issue the one authoritative fetch for `tuple` under `token`,
    /// requesting cancellation of any older in-flight work. The result is
    /// attached only if the token is still current when it resolves.
    pub(crate) fn begin_fetch(
        shared: &Arc<Shared>,
        st: &mut SyncState,
        tuple: SelectionTuple,
        token: FenceToken,
    ) {
        if let Some(prev) = st.inflight.take() {
            prev.cancel();
        }
        let cancel = CancellationToken::new();
        st.inflight = Some(cancel.clone());

        let cached = st
            .bounds_cache
            .as_ref()
            .filter(|(generation, _)| *generation == st.generation)
            .map(|(_, bounds)| *bounds);
        let generation = st.generation;
        let shared = Arc::clone(shared);

        tokio::spawn(async move {
            match shared.fetcher.fetch(tuple, token, cached, &cancel).await {
                Err(FetchError::Superseded) => {
                    debug!(token = token.value(), "Superseded fetch dropped");
                }
                Err(FetchError::Service(error)) => {
                    // Failures of superseded requests are as silent as
                    // their successes would have been.
                    if shared.fence.is_current(token) {
                        warn!(token = token.value(), error = %error, "Overlay fetch failed");
                        let _ = shared.events.send(ViewerEvent::LayerError { error });
                    } else {
                        debug!(token = token.value(), "Stale fetch failure dropped");
                    }
                }
                Ok((descriptor, time)) => {
                    let mut st = shared.state.lock().await;
                    if !shared.fence.is_current(descriptor.token) {
                        debug!(token = descriptor.token.value(), "Stale overlay dropped");
                        return;
                    }

                    if st.generation == generation {
                        st.bounds_cache = Some((generation, descriptor.bounds));
                        if let Some(info) = &time {
                            st.selection.apply_time_info(info);
                        }
                    }

                    st.render.attach(&descriptor).await;
                    st.inflight = None;

                    let _ = shared.events.send(ViewerEvent::LayerReady {
                        dataset: descriptor.tuple.dataset.clone(),
                        tuple: descriptor.tuple,
                        time_label: time.map(|t| t.label),
                        bounds: descriptor.bounds,
                    });
                }
            }
        });
    }
}
