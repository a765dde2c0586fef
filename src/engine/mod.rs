//! Seams to the map rendering engine.
//!
//! The renderer itself (tiles, projection, GPU pipeline) lives outside this
//! crate. The controller only needs to create one widget per container, move
//! its camera, swap its style, and hear about style loads and clicks.

pub mod handle;
pub mod headless;

pub use handle::{lock_map, MapHandle, SharedMapHandle};
pub use headless::{HeadlessContainer, HeadlessEngine};

use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};

use crate::core::{
    camera::CameraState,
    config::{FogConfig, Projection},
    geo::LatLng,
    style::MapStyleId,
};
use crate::Result;

/// Size of a container in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The element a map widget renders into.
pub trait MapContainer: Send + Sync {
    /// Stable identifier of the element, used to refuse double mounts.
    fn id(&self) -> &str;

    /// Whether the element is attached to something that can be drawn on.
    fn is_attached(&self) -> bool;

    /// Current on-screen size.
    fn pixel_size(&self) -> PixelSize;
}

/// Parameters for creating a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetOptions {
    pub style: MapStyleId,
    pub camera: CameraState,
    pub projection: Projection,
}

/// Events a live widget reports back.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// A style finished loading (initially and after every style switch).
    StyleLoaded { style: MapStyleId },
    /// The user clicked or tapped the map surface.
    Click { lat_lng: LatLng },
}

/// Factory for live map widgets.
pub trait MapEngine: Send {
    /// Create a widget bound to `container`. Fails with
    /// `MapError::Initialization` when the container cannot be rendered into.
    fn create_widget(
        &mut self,
        container: &dyn MapContainer,
        options: &WidgetOptions,
    ) -> Result<Box<dyn MapWidget>>;
}

/// One live map widget.
pub trait MapWidget: Send {
    fn camera(&self) -> CameraState;

    /// Move the camera instantly.
    fn jump_to(&mut self, camera: CameraState);

    fn set_bearing(&mut self, degrees: f64);

    /// Start an animated transition; returns as soon as it is initiated.
    fn fly_to(&mut self, center: LatLng, zoom: f64);

    fn set_style(&mut self, style: MapStyleId);

    fn set_fog(&mut self, fog: &FogConfig);

    /// Receiver for style-load and click notifications.
    fn events(&self) -> Receiver<EngineEvent>;

    /// Release the widget and cancel any in-flight camera animation.
    fn destroy(&mut self);
}
