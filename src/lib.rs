//! # mapview
//!
//! A headless map view controller. It owns one live map widget, rotates the
//! camera until the user interacts, resolves free-text place searches through
//! a geocoder, switches visual themes without moving the camera, and captures
//! static snapshots of the current view.
//!
//! The map renderer and the HTTP services are consumed through small traits
//! (see [`engine`] and [`providers`]) so the controller can run against a real
//! widget, the bundled [`engine::HeadlessEngine`], or test doubles.

pub mod controller;
pub mod core;
pub mod engine;
pub mod prelude;
pub mod providers;
pub mod runtime;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    camera::CameraState,
    config::ControllerConfig,
    geo::LatLng,
    style::MapStyleId,
};

pub use engine::{
    EngineEvent, HeadlessEngine, MapContainer, MapEngine, MapHandle, MapWidget, PixelSize,
};

pub use providers::{
    GeocodeProvider, MapboxGeocoder, MapboxStaticImages, SearchResult, StaticImageProvider,
};

pub use controller::{
    AnimatorState, CameraAnimator, MapViewController, PreviewState, SearchCoordinator,
    SnapshotRequest, SnapshotService, StyleController,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Coarse classification of [`MapError`] for UI layers that only need to
/// pick a message or an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Initialization,
    Network,
    Provider,
    NotFound,
    Other,
}

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Map initialization failed: {0}")]
    Initialization(String),

    #[error("A map is already mounted on container '{0}'")]
    AlreadyMounted(String),

    #[error("No map is mounted")]
    NotMounted,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("No results found for '{0}'")]
    NotFound(String),

    #[error("Image decode error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Initialization(_) | Self::AlreadyMounted(_) | Self::NotMounted => {
                ErrorKind::Initialization
            }
            Self::Network(_) => ErrorKind::Network,
            Self::Provider(_) | Self::Image(_) | Self::Serialization(_) => ErrorKind::Provider,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Config(_) | Self::InvalidCoordinates(_) => ErrorKind::Other,
        }
    }

    /// Short message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Initialization => "The map could not be displayed.".to_string(),
            ErrorKind::Network => "Could not reach the map service. Check your connection.".to_string(),
            ErrorKind::Provider => "The map service returned an unexpected response.".to_string(),
            ErrorKind::NotFound => match self {
                Self::NotFound(query) => format!("No places match \"{}\".", query),
                _ => "Nothing found.".to_string(),
            },
            ErrorKind::Other => self.to_string(),
        }
    }
}

/// Error type alias for convenience
pub type Error = MapError;
