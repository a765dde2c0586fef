//! External HTTP services: forward geocoding and static map rendering.

pub mod geocoding;
pub mod http;
pub mod static_image;

pub use geocoding::MapboxGeocoder;
pub use static_image::MapboxStaticImages;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{camera::CameraState, geo::LatLng, style::MapStyleId};
use crate::Result;

/// One geocoder candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub label: String,
    pub center: LatLng,
}

impl SearchResult {
    pub fn new(label: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            label: label.into(),
            center: LatLng::new(lat, lon),
        }
    }

    pub fn center_latitude(&self) -> f64 {
        self.center.lat
    }

    pub fn center_longitude(&self) -> f64 {
        self.center.lng
    }
}

/// Everything a static image service needs to render the current view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRequest {
    pub style: MapStyleId,
    pub camera: CameraState,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

/// Resolves free text into candidate places, most relevant first.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Errors with `MapError::Network` on transport failure and
    /// `MapError::Provider` on a non-2xx status or malformed body. An empty
    /// list is a valid answer.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Renders a non-interactive image of a map view.
#[async_trait]
pub trait StaticImageProvider: Send + Sync {
    /// Encoded image bytes (PNG or JPEG).
    async fn render(&self, request: &SnapshotRequest) -> Result<Vec<u8>>;
}
