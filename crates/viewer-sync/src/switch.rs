//! Dataset switch coordination.
//!
//! A switch invalidates everything derived from the previous dataset:
//! playback, in-flight fetches, axis domains, the selection tuple, and
//! the current overlay. The protocol is strictly ordered so partial
//! failure leaves the previous dataset fully active.

use std::sync::atomic::Ordering;

use futures::try_join;
use tracing::{debug, info, warn};

use pollution_client::PollutionService;
use viewer_common::{
    AxisBounds, AxisRange, ViewerError, ViewerResult, FALLBACK_MAX_LEVEL_INDEX,
    FALLBACK_MAX_TIME_INDEX, TIME_AXIS_FLOOR,
};

use crate::events::ViewerEvent;
use crate::synchronizer::Synchronizer;

/// Load every axis domain for the server-side active dataset. The loads
/// run concurrently; a failure of any one fails the whole reload and
/// leaves the caller's previous bounds untouched. The time service alone
/// is non-fatal: the axis falls back to its default maximum until the
/// next time report corrects it.
pub(crate) async fn load_axis_bounds(service: &dyn PollutionService) -> ViewerResult<AxisBounds> {
    let (geo, species, data_types) = try_join!(
        service.geo_bounds(),
        service.species(),
        service.data_types(),
    )?;

    if species.is_empty() {
        return Err(ViewerError::Decode("species list is empty".to_string()));
    }
    if data_types.is_empty() {
        return Err(ViewerError::Decode("data-type list is empty".to_string()));
    }

    let max_time_index = match service.time_info(TIME_AXIS_FLOOR).await {
        Ok(info) => info.max_time_index.max(TIME_AXIS_FLOOR),
        Err(error) => {
            warn!(error = %error, "Time service unavailable, using fallback axis maximum");
            FALLBACK_MAX_TIME_INDEX
        }
    };

    Ok(AxisBounds {
        time: AxisRange::new(TIME_AXIS_FLOOR, max_time_index),
        level: AxisRange::new(0, FALLBACK_MAX_LEVEL_INDEX),
        species,
        data_types,
        geo,
    })
}

impl Synchronizer {
    /// Make `dataset` the active dataset.
    ///
    /// Protocol, strictly ordered: stop playback; supersede all prior
    /// fetches; activate server-side; reload every axis domain; reset the
    /// selection to the new defaults; fetch the first overlay. A switch
    /// that is itself superseded by a newer one abandons before touching
    /// axis state, so back-to-back switches converge on the last call.
    pub async fn switch_dataset(&self, dataset: &str) {
        info!(dataset = %dataset, "Dataset switch requested");

        // (1) Stopped is the only valid playback state during a switch.
        self.pause().await;

        // (2) All prior fetches are superseded from this point on.
        let token = self.shared.fence.next();
        let seq = self.shared.switch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut st = self.shared.state.lock().await;
            if let Some(prev) = st.inflight.take() {
                prev.cancel();
            }
        }

        // (3) Activate server-side. On failure nothing was mutated; the
        // previous dataset stays fully active.
        if let Err(error) = self.shared.service.switch_dataset(dataset).await {
            warn!(dataset = %dataset, error = %error, "Dataset switch rejected");
            let _ = self.shared.events.send(ViewerEvent::SwitchFailed {
                dataset: dataset.to_string(),
                error,
            });
            return;
        }

        // (4) Reload the axis domains for the new dataset.
        let bounds = match load_axis_bounds(self.shared.service.as_ref()).await {
            Ok(bounds) => bounds,
            Err(error) => {
                warn!(dataset = %dataset, error = %error, "Axis reload failed");
                let _ = self.shared.events.send(ViewerEvent::SwitchFailed {
                    dataset: dataset.to_string(),
                    error,
                });
                return;
            }
        };

        // (5) Apply atomically, unless a newer switch has begun meanwhile.
        let mut st = self.shared.state.lock().await;
        if self.shared.switch_seq.load(Ordering::SeqCst) != seq {
            debug!(dataset = %dataset, "Superseded dataset switch abandoned");
            return;
        }

        st.generation += 1;
        st.bounds_cache = Some((st.generation, bounds.geo));
        let tuple = st.selection.reset(bounds, dataset);
        info!(dataset = %dataset, "Dataset switch applied");
        let _ = self.shared.events.send(ViewerEvent::DatasetSwitched {
            dataset: dataset.to_string(),
            tuple: tuple.clone(),
        });

        // (6) One fetch with the fresh tuple. A parameter edit may have
        // raced steps 3-5 under a newer token; re-fence so the fresh
        // tuple's overlay supersedes it.
        let token = if self.shared.fence.is_current(token) {
            token
        } else {
            self.shared.fence.next()
        };
        Self::begin_fetch(&self.shared, &mut st, tuple, token);
    }

    /// Host notification that an upload completed. The upload itself never
    /// touches active state; viewing the new dataset is a normal switch.
    pub async fn dataset_uploaded(&self, dataset: &str) {
        self.switch_dataset(dataset).await;
    }
}
