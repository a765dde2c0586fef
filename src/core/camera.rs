use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// The map's current viewpoint.
///
/// Only the map handle mutates it; the animator touches `bearing` alone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub center: LatLng,
    pub zoom: f64,
    /// Rotation in degrees, always within [0, 360).
    pub bearing: f64,
}

impl CameraState {
    pub fn new(center: LatLng, zoom: f64, bearing: f64) -> Self {
        Self {
            center,
            zoom,
            bearing: normalize_bearing(bearing),
        }
    }

    pub fn center_latitude(&self) -> f64 {
        self.center.lat
    }

    pub fn center_longitude(&self) -> f64 {
        self.center.lng
    }

    /// Same camera rotated to `bearing`.
    pub fn with_bearing(mut self, bearing: f64) -> Self {
        self.bearing = normalize_bearing(bearing);
        self
    }
}

impl Default for CameraState {
    fn default() -> Self {
        use crate::core::constants::{DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG, DEFAULT_ZOOM};
        Self::new(
            LatLng::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG),
            DEFAULT_ZOOM,
            0.0,
        )
    }
}

/// Maps any finite angle into [0, 360).
pub fn normalize_bearing(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Next bearing of a rotation that advances by `step` degrees.
pub fn advance_bearing(current: f64, step: f64) -> f64 {
    normalize_bearing(current + step)
}
