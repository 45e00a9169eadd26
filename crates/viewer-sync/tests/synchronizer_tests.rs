//! End-to-end synchronizer behavior against a mock service with
//! controllable latency, under a paused tokio clock.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc::UnboundedReceiver;

use pollution_client::PollutionService;
use viewer_common::{GeoBounds, Param, SelectionTuple, TimeInfo, ViewerError, ViewerResult};
use viewer_sync::{
    OverlayDescriptor, RenderTarget, Synchronizer, SynchronizerConfig, ViewerEvent,
};

/// Per-dataset axis fixture.
struct Fixture {
    geo: GeoBounds,
    species: Vec<String>,
    data_types: Vec<String>,
    max_time_index: u32,
}

/// Mock collaborator services. Latency is simulated with tokio sleeps so
/// a paused clock drives interleavings deterministically.
struct MockService {
    fixtures: HashMap<String, Fixture>,
    active: Mutex<String>,
    metadata_delay: Duration,
    switch_delay: Duration,
    /// Image fetch delay per level index (default 10ms).
    image_delays: Mutex<HashMap<u32, Duration>>,
    /// Level indexes whose image fetch fails.
    failing_levels: Mutex<HashSet<u32>>,
    /// Every image request issued, in order.
    image_requests: Mutex<Vec<SelectionTuple>>,
}

impl MockService {
    fn new() -> Self {
        let mut fixtures = HashMap::new();
        fixtures.insert(
            "a".to_string(),
            Fixture {
                geo: GeoBounds::new(48.0, 58.0, 95.0, 120.0),
                species: vec!["NO2".to_string(), "SO2".to_string()],
                data_types: vec!["trajReconstructed".to_string(), "raw".to_string()],
                max_time_index: 10,
            },
        );
        fixtures.insert(
            "b".to_string(),
            Fixture {
                geo: GeoBounds::new(40.0, 50.0, 10.0, 20.0),
                species: vec!["CO".to_string()],
                data_types: vec!["modelled".to_string()],
                max_time_index: 3,
            },
        );
        fixtures.insert(
            "c".to_string(),
            Fixture {
                geo: GeoBounds::new(-10.0, 10.0, -20.0, 20.0),
                species: vec!["O3".to_string()],
                data_types: vec!["trajReconstructed".to_string()],
                max_time_index: 7,
            },
        );

        Self {
            fixtures,
            active: Mutex::new("a".to_string()),
            metadata_delay: Duration::from_millis(20),
            switch_delay: Duration::from_millis(30),
            image_delays: Mutex::new(HashMap::new()),
            failing_levels: Mutex::new(HashSet::new()),
            image_requests: Mutex::new(Vec::new()),
        }
    }

    fn set_image_delay(&self, level: u32, delay: Duration) {
        self.image_delays.lock().unwrap().insert(level, delay);
    }

    fn fail_level(&self, level: u32) {
        self.failing_levels.lock().unwrap().insert(level);
    }

    fn requests(&self) -> Vec<SelectionTuple> {
        self.image_requests.lock().unwrap().clone()
    }

    fn with_active<T>(&self, f: impl Fn(&Fixture) -> T) -> T {
        let active = self.active.lock().unwrap().clone();
        f(&self.fixtures[&active])
    }
}

#[async_trait]
impl PollutionService for MockService {
    async fn geo_bounds(&self) -> ViewerResult<GeoBounds> {
        tokio::time::sleep(self.metadata_delay).await;
        Ok(self.with_active(|f| f.geo))
    }

    async fn species(&self) -> ViewerResult<Vec<String>> {
        tokio::time::sleep(self.metadata_delay).await;
        Ok(self.with_active(|f| f.species.clone()))
    }

    async fn data_types(&self) -> ViewerResult<Vec<String>> {
        tokio::time::sleep(self.metadata_delay).await;
        Ok(self.with_active(|f| f.data_types.clone()))
    }

    async fn time_info(&self, time_index: u32) -> ViewerResult<TimeInfo> {
        tokio::time::sleep(self.metadata_delay).await;
        Ok(TimeInfo {
            label: format!("step {}", time_index),
            max_time_index: self.with_active(|f| f.max_time_index),
        })
    }

    fn image_url(&self, tuple: &SelectionTuple) -> String {
        format!(
            "mock://pollution/image?time_index={}&level_index={}&species={}&data_type={}&dataset={}",
            tuple.time_index, tuple.level_index, tuple.species, tuple.data_type, tuple.dataset
        )
    }

    async fn fetch_image(&self, tuple: &SelectionTuple) -> ViewerResult<Bytes> {
        self.image_requests.lock().unwrap().push(tuple.clone());
        let delay = self
            .image_delays
            .lock()
            .unwrap()
            .get(&tuple.level_index)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        let fail = self.failing_levels.lock().unwrap().contains(&tuple.level_index);

        tokio::time::sleep(delay).await;
        if fail {
            return Err(ViewerError::http("image fetch failed"));
        }
        Ok(Bytes::from_static(b"raster"))
    }

    async fn datasets(&self) -> ViewerResult<Vec<String>> {
        let mut ids: Vec<String> = self.fixtures.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn switch_dataset(&self, dataset: &str) -> ViewerResult<()> {
        tokio::time::sleep(self.switch_delay).await;
        if !self.fixtures.contains_key(dataset) {
            return Err(ViewerError::SwitchRejected {
                dataset: dataset.to_string(),
                message: "unknown dataset".to_string(),
            });
        }
        *self.active.lock().unwrap() = dataset.to_string();
        Ok(())
    }
}

/// Records every render-target command.
#[derive(Clone, Default)]
struct Recorder {
    attached: Arc<Mutex<Vec<OverlayDescriptor>>>,
    detach_count: Arc<AtomicUsize>,
}

impl Recorder {
    fn attached(&self) -> Vec<OverlayDescriptor> {
        self.attached.lock().unwrap().clone()
    }

    fn last_tuple(&self) -> Option<SelectionTuple> {
        self.attached.lock().unwrap().last().map(|o| o.tuple.clone())
    }
}

#[async_trait]
impl RenderTarget for Recorder {
    async fn attach(&mut self, overlay: &OverlayDescriptor) {
        self.attached.lock().unwrap().push(overlay.clone());
    }

    async fn detach(&mut self) {
        self.detach_count.fetch_add(1, Ordering::SeqCst);
    }
}

async fn start_on(
    dataset: &str,
) -> (
    Arc<MockService>,
    Recorder,
    Synchronizer,
    UnboundedReceiver<ViewerEvent>,
) {
    let service = Arc::new(MockService::new());
    let recorder = Recorder::default();
    let (sync, events) = Synchronizer::start(
        service.clone(),
        Box::new(recorder.clone()),
        SynchronizerConfig::default(),
        dataset,
    )
    .await
    .expect("synchronizer start");
    (service, recorder, sync, events)
}

/// Let every spawned fetch run to completion. Only valid while playback
/// is stopped.
async fn settle() {
    tokio::time::sleep(Duration::from_secs(5)).await;
}

fn drain(events: &mut UnboundedReceiver<ViewerEvent>) -> Vec<ViewerEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test(start_paused = true)]
async fn test_initial_overlay_uses_axis_defaults() {
    let (_service, recorder, _sync, mut events) = start_on("a").await;
    settle().await;

    let tuple = recorder.last_tuple().expect("initial overlay attached");
    assert_eq!(tuple.dataset, "a");
    assert_eq!(tuple.time_index, 1);
    assert_eq!(tuple.level_index, 0);
    assert_eq!(tuple.species, "NO2");
    assert_eq!(tuple.data_type, "trajReconstructed");

    let ready = drain(&mut events)
        .into_iter()
        .find_map(|e| match e {
            ViewerEvent::LayerReady { time_label, .. } => Some(time_label),
            _ => None,
        })
        .expect("layer ready event");
    assert_eq!(ready.as_deref(), Some("step 1"));
}

#[tokio::test(start_paused = true)]
async fn test_out_of_range_params_are_clamped_before_fetch() {
    let (service, recorder, sync, _events) = start_on("a").await;
    settle().await;

    sync.set_param(Param::TimeIndex(99)).await;
    sync.set_param(Param::LevelIndex(42)).await;
    sync.set_param(Param::Species("unknown".to_string())).await;
    settle().await;

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.tuple.time_index, 10);
    assert_eq!(snapshot.tuple.level_index, 9);
    assert_eq!(snapshot.tuple.species, "NO2");

    for request in service.requests() {
        assert!(request.time_index >= 1 && request.time_index <= 10);
        assert!(request.level_index <= 9);
        assert!(["NO2", "SO2"].contains(&request.species.as_str()));
    }

    let tuple = recorder.last_tuple().unwrap();
    assert_eq!(tuple.time_index, 10);
    assert_eq!(tuple.level_index, 9);
}

#[tokio::test(start_paused = true)]
async fn test_newer_request_wins_regardless_of_latency() {
    let (service, recorder, sync, _events) = start_on("a").await;
    settle().await;

    // The older request is slow, the newer one fast; the slow one must
    // never reach the render target.
    service.set_image_delay(1, Duration::from_secs(5));
    service.set_image_delay(2, Duration::from_millis(10));

    sync.set_param(Param::LevelIndex(1)).await;
    sync.set_param(Param::LevelIndex(2)).await;
    settle().await;
    settle().await;

    let attached = recorder.attached();
    assert!(attached.iter().all(|o| o.tuple.level_index != 1));
    assert_eq!(recorder.last_tuple().unwrap().level_index, 2);
}

#[tokio::test(start_paused = true)]
async fn test_stale_failure_is_silent() {
    let (service, _recorder, sync, mut events) = start_on("a").await;
    settle().await;
    drain(&mut events);

    service.fail_level(5);
    service.set_image_delay(5, Duration::from_secs(3));

    sync.set_param(Param::LevelIndex(5)).await;
    sync.set_param(Param::LevelIndex(2)).await;
    settle().await;

    // The failing request was superseded before it resolved; only the
    // successful newer layer is observable.
    let seen = drain(&mut events);
    assert!(seen
        .iter()
        .all(|e| !matches!(e, ViewerEvent::LayerError { .. })));
    assert!(seen
        .iter()
        .any(|e| matches!(e, ViewerEvent::LayerReady { tuple, .. } if tuple.level_index == 2)));
}

#[tokio::test(start_paused = true)]
async fn test_current_failure_keeps_previous_overlay() {
    let (_service, recorder, sync, mut events) = {
        let (service, recorder, sync, events) = start_on("a").await;
        service.fail_level(4);
        (service, recorder, sync, events)
    };
    settle().await;
    drain(&mut events);
    let before = recorder.attached().len();

    sync.set_param(Param::LevelIndex(4)).await;
    settle().await;

    let seen = drain(&mut events);
    assert!(seen
        .iter()
        .any(|e| matches!(e, ViewerEvent::LayerError { error } if error.is_transient())));

    // Selection moved, overlay did not.
    assert_eq!(recorder.attached().len(), before);
    assert_eq!(recorder.last_tuple().unwrap().level_index, 0);
    assert_eq!(sync.snapshot().await.tuple.level_index, 4);
}

#[tokio::test(start_paused = true)]
async fn test_play_then_immediate_pause_never_advances() {
    let (service, _recorder, sync, _events) = start_on("a").await;
    settle().await;

    sync.play().await;
    sync.pause().await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    let snapshot = sync.snapshot().await;
    assert!(!snapshot.playing);
    assert_eq!(snapshot.tuple.time_index, 1);
    assert!(service.requests().iter().all(|r| r.time_index == 1));
}

#[tokio::test(start_paused = true)]
async fn test_playback_advances_and_wraps_to_lower_bound() {
    let (_service, _recorder, sync, _events) = start_on("a").await;
    settle().await;

    sync.set_param(Param::TimeIndex(10)).await;
    settle().await;

    sync.play().await;
    tokio::time::sleep(Duration::from_millis(1100)).await;
    sync.pause().await;
    settle().await;

    // One tick past the axis maximum lands on the playable floor, not 11
    // and not a stopped state.
    assert_eq!(sync.snapshot().await.tuple.time_index, 1);
}

#[tokio::test(start_paused = true)]
async fn test_playback_ticks_advance_sequentially() {
    let (_service, recorder, sync, _events) = start_on("a").await;
    settle().await;

    sync.play().await;
    tokio::time::sleep(Duration::from_millis(3300)).await;
    sync.pause().await;
    settle().await;

    assert_eq!(sync.snapshot().await.tuple.time_index, 4);
    assert_eq!(recorder.last_tuple().unwrap().time_index, 4);
}

#[tokio::test(start_paused = true)]
async fn test_pause_on_stopped_clock_is_noop() {
    let (_service, _recorder, sync, mut events) = start_on("a").await;
    settle().await;
    drain(&mut events);

    sync.pause().await;
    sync.pause().await;

    assert!(drain(&mut events)
        .iter()
        .all(|e| !matches!(e, ViewerEvent::PlaybackStopped)));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_double_switch_converges_on_second() {
    let (_service, recorder, sync, _events) = start_on("a").await;
    settle().await;

    tokio::join!(sync.switch_dataset("b"), sync.switch_dataset("c"));
    settle().await;

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.tuple.dataset, "c");
    assert_eq!(snapshot.tuple.species, "O3");
    assert_eq!(snapshot.bounds.time.max, 7);
    assert_eq!(
        snapshot.bounds.geo,
        GeoBounds::new(-10.0, 10.0, -20.0, 20.0)
    );

    let last = recorder.attached().into_iter().last().unwrap();
    assert_eq!(last.tuple.dataset, "c");
    assert_eq!(last.bounds, GeoBounds::new(-10.0, 10.0, -20.0, 20.0));
}

#[tokio::test(start_paused = true)]
async fn test_species_edit_then_switch_leaves_no_residue() {
    let (service, recorder, sync, mut events) = start_on("a").await;
    settle().await;

    sync.set_param(Param::Species("SO2".to_string())).await;
    sync.switch_dataset("b").await;
    settle().await;

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.tuple.dataset, "b");
    assert_eq!(snapshot.tuple.time_index, 1);
    assert_eq!(snapshot.tuple.level_index, 0);
    assert_eq!(snapshot.tuple.species, "CO");
    assert_eq!(snapshot.tuple.data_type, "modelled");

    // Nothing from dataset a's axes ever reaches an image request for b.
    for request in service.requests().iter().filter(|r| r.dataset == "b") {
        assert_eq!(request.species, "CO");
        assert!(request.time_index >= 1 && request.time_index <= 3);
    }

    let last = recorder.last_tuple().unwrap();
    assert_eq!(last.dataset, "b");
    assert_eq!(last.species, "CO");

    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, ViewerEvent::DatasetSwitched { dataset, .. } if dataset == "b")));
}

#[tokio::test(start_paused = true)]
async fn test_switch_stops_playback() {
    let (_service, _recorder, sync, mut events) = start_on("a").await;
    settle().await;

    sync.play().await;
    tokio::time::sleep(Duration::from_millis(1100)).await;
    sync.switch_dataset("b").await;
    settle().await;

    let snapshot = sync.snapshot().await;
    assert!(!snapshot.playing);
    assert_eq!(snapshot.tuple.dataset, "b");
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, ViewerEvent::PlaybackStopped)));
}

#[tokio::test(start_paused = true)]
async fn test_switch_to_unknown_dataset_leaves_state_intact() {
    let (_service, recorder, sync, mut events) = start_on("a").await;
    settle().await;
    let before = recorder.attached().len();

    sync.switch_dataset("nope").await;
    settle().await;

    let seen = drain(&mut events);
    assert!(seen.iter().any(|e| matches!(
        e,
        ViewerEvent::SwitchFailed { dataset, error: ViewerError::SwitchRejected { .. } }
            if dataset == "nope"
    )));

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.tuple.dataset, "a");
    assert_eq!(snapshot.bounds.time.max, 10);
    assert_eq!(recorder.attached().len(), before);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_detaches_and_stops_everything() {
    let (_service, recorder, sync, _events) = start_on("a").await;
    settle().await;

    sync.play().await;
    sync.shutdown().await;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(recorder.detach_count.load(Ordering::SeqCst), 1);
    assert!(!sync.snapshot().await.playing);
}
