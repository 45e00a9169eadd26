//! Per-dataset axis domains.
//!
//! An [`AxisBounds`] value describes every selectable dimension of the
//! active dataset: the playable time range, the vertical level range, the
//! species list (server-declared order), the data-type set, and the
//! geographic extent. It is replaced wholesale on a dataset switch and
//! never partially mutated.

use serde::{Deserialize, Serialize};

use crate::bounds::GeoBounds;
use crate::selection::SelectionTuple;

/// Lower bound of the playable time range. Index 0 is reserved as "unset".
pub const TIME_AXIS_FLOOR: u32 = 1;

/// Time axis maximum used until the time service reports the real one.
pub const FALLBACK_MAX_TIME_INDEX: u32 = 220;

/// Level axis maximum used until the server reports otherwise.
pub const FALLBACK_MAX_LEVEL_INDEX: u32 = 9;

/// Preferred default data type when the server offers it.
pub const PREFERRED_DATA_TYPE: &str = "trajReconstructed";

/// Inclusive integer range for a slider-driven axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: u32,
    pub max: u32,
}

impl AxisRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Clamp a value to the nearest bound. Out-of-range input is never
    /// rejected; this matches the slider semantics of the host view.
    pub fn clamp(&self, value: u32) -> u32 {
        value.clamp(self.min, self.max)
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Human-readable time label plus the axis's current maximum, as reported
/// by the time service for a concrete index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub label: String,
    pub max_time_index: u32,
}

/// The full set of valid domains for the active dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    pub time: AxisRange,
    pub level: AxisRange,
    /// Species identifiers in server-declared order.
    pub species: Vec<String>,
    pub data_types: Vec<String>,
    pub geo: GeoBounds,
}

impl AxisBounds {
    /// First species of the server-declared order.
    pub fn default_species(&self) -> Option<&str> {
        self.species.first().map(String::as_str)
    }

    /// `trajReconstructed` when the server offers it, else the first
    /// declared data type.
    pub fn default_data_type(&self) -> Option<&str> {
        if self.data_types.iter().any(|d| d == PREFERRED_DATA_TYPE) {
            Some(PREFERRED_DATA_TYPE)
        } else {
            self.data_types.first().map(String::as_str)
        }
    }

    /// Axis defaults for a freshly activated dataset: time at the lower
    /// bound of the playable range, level 0, default species and data type.
    pub fn default_tuple(&self, dataset: &str) -> SelectionTuple {
        SelectionTuple {
            dataset: dataset.to_string(),
            time_index: self.time.min,
            level_index: self.level.min,
            species: self.default_species().unwrap_or_default().to_string(),
            data_type: self.default_data_type().unwrap_or_default().to_string(),
        }
    }

    /// Resolve a requested species against this axis: values not in the
    /// set fall back to the axis default.
    pub fn resolve_species(&self, requested: &str) -> String {
        if self.species.iter().any(|s| s == requested) {
            requested.to_string()
        } else {
            self.default_species().unwrap_or_default().to_string()
        }
    }

    /// Resolve a requested data type against this axis, falling back to
    /// the axis default for unknown values.
    pub fn resolve_data_type(&self, requested: &str) -> String {
        if self.data_types.iter().any(|d| d == requested) {
            requested.to_string()
        } else {
            self.default_data_type().unwrap_or_default().to_string()
        }
    }
}
