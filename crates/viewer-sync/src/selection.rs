//! Mutable selection state validated against the active axis domains.

use tracing::debug;

use viewer_common::{AxisBounds, Param, SelectionTuple, TimeInfo};

/// Holds the current parameter tuple and the axis domains it must lie
/// within. Mutation always goes through clamping: out-of-range values are
/// pulled to the nearest bound, unknown species/data types fall back to
/// the axis default. The tuple is therefore valid at every point a fetch
/// can observe it.
#[derive(Debug)]
pub struct SelectionState {
    bounds: AxisBounds,
    tuple: SelectionTuple,
}

impl SelectionState {
    /// Start at the axis defaults for `dataset`.
    pub fn new(bounds: AxisBounds, dataset: &str) -> Self {
        let tuple = bounds.default_tuple(dataset);
        Self { bounds, tuple }
    }

    /// Apply a single-axis change, clamping into the current bounds, and
    /// return the resulting tuple for the caller to fetch with.
    pub fn set(&mut self, param: Param) -> SelectionTuple {
        match param {
            Param::TimeIndex(v) => self.tuple.time_index = self.bounds.time.clamp(v),
            Param::LevelIndex(v) => self.tuple.level_index = self.bounds.level.clamp(v),
            Param::Species(s) => self.tuple.species = self.bounds.resolve_species(&s),
            Param::DataType(d) => self.tuple.data_type = self.bounds.resolve_data_type(&d),
        }
        self.tuple.clone()
    }

    /// Replace the axis domains wholesale and reset the tuple to the new
    /// defaults. Used on dataset switch; never partially applied.
    pub fn reset(&mut self, bounds: AxisBounds, dataset: &str) -> SelectionTuple {
        self.tuple = bounds.default_tuple(dataset);
        self.bounds = bounds;
        self.tuple.clone()
    }

    /// Fold a time-service report into the time axis. The axis maximum can
    /// grow or shrink between requests; a shrink clamps the current index.
    pub fn apply_time_info(&mut self, info: &TimeInfo) {
        let max = info.max_time_index.max(self.bounds.time.min);
        if max != self.bounds.time.max {
            debug!(old = self.bounds.time.max, new = max, "Time axis maximum changed");
            self.bounds.time.max = max;
            self.tuple.time_index = self.bounds.time.clamp(self.tuple.time_index);
        }
    }

    pub fn tuple(&self) -> &SelectionTuple {
        &self.tuple
    }

    pub fn bounds(&self) -> &AxisBounds {
        &self.bounds
    }
}
