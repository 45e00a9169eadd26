//! Common types shared across the pollution viewer crates.

pub mod axes;
pub mod bounds;
pub mod error;
pub mod selection;

pub use axes::{
    AxisBounds, AxisRange, TimeInfo, FALLBACK_MAX_LEVEL_INDEX, FALLBACK_MAX_TIME_INDEX,
    PREFERRED_DATA_TYPE, TIME_AXIS_FLOOR,
};
pub use bounds::GeoBounds;
pub use error::{ViewerError, ViewerResult};
pub use selection::{Param, SelectionTuple};
