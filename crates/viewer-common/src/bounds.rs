//! Geographic bounds for raster overlays.

use serde::{Deserialize, Serialize};

/// Geographic extent of a dataset in degrees (EPSG:4326).
///
/// This is the rectangle the raster overlay is stretched over on the map
/// surface. Field names match the bounds service payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

impl GeoBounds {
    /// Create bounds from corner coordinates.
    pub fn new(lat_min: f64, lat_max: f64, lon_min: f64, lon_max: f64) -> Self {
        Self {
            lat_min,
            lat_max,
            lon_min,
            lon_max,
        }
    }

    /// A degenerate or inverted rectangle cannot anchor an overlay.
    pub fn is_valid(&self) -> bool {
        self.lat_min < self.lat_max
            && self.lon_min < self.lon_max
            && self.lat_min >= -90.0
            && self.lat_max <= 90.0
    }

    /// Height of the rectangle in degrees of latitude.
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Width of the rectangle in degrees of longitude.
    pub fn lon_span(&self) -> f64 {
        self.lon_max - self.lon_min
    }

    /// Check if a point is contained within these bounds.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.lat_min && lat <= self.lat_max && lon >= self.lon_min && lon <= self.lon_max
    }

    /// Corner pairs in `[[lat_min, lon_min], [lat_max, lon_max]]` order,
    /// as the map surface expects them.
    pub fn corners(&self) -> [[f64; 2]; 2] {
        [
            [self.lat_min, self.lon_min],
            [self.lat_max, self.lon_max],
        ]
    }
}
