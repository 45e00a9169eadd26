//! The selection tuple and its parameter axes.

use serde::{Deserialize, Serialize};

/// The full parameter tuple a single image request is built from.
///
/// Every field lies within the active [`AxisBounds`](crate::AxisBounds)
/// whenever a fetch is issued; mutation goes through clamping, never raw
/// assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionTuple {
    pub dataset: String,
    pub time_index: u32,
    pub level_index: u32,
    pub species: String,
    pub data_type: String,
}

/// A single-axis parameter change requested by the host or the playback
/// clock. The dataset axis is not a `Param`; it goes through the dataset
/// switch protocol instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    TimeIndex(u32),
    LevelIndex(u32),
    Species(String),
    DataType(String),
}

impl Param {
    /// Axis name for logging.
    pub fn axis(&self) -> &'static str {
        match self {
            Param::TimeIndex(_) => "time",
            Param::LevelIndex(_) => "level",
            Param::Species(_) => "species",
            Param::DataType(_) => "data_type",
        }
    }
}
