use crossbeam_channel::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{EngineEvent, MapContainer, MapEngine, MapWidget, PixelSize, WidgetOptions};
use crate::core::{
    camera::{normalize_bearing, CameraState},
    config::FogConfig,
    constants::{MAX_ZOOM, MIN_ZOOM},
    geo::LatLng,
    style::MapStyleId,
};
use crate::{MapError, Result};

/// Map handle shared between the controller and the bearing animation task.
pub type SharedMapHandle = Arc<Mutex<MapHandle>>;

/// Lock the shared handle. A panic while holding the lock leaves plain camera
/// data behind, so a poisoned lock is recovered rather than propagated.
pub fn lock_map(map: &SharedMapHandle) -> MutexGuard<'_, MapHandle> {
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owner of exactly one live map widget.
///
/// All camera mutations go through here. Dropping the handle destroys the
/// widget.
pub struct MapHandle {
    widget: Box<dyn MapWidget>,
    container: Arc<dyn MapContainer>,
    style: MapStyleId,
    events: Receiver<EngineEvent>,
    destroyed: bool,
}

impl MapHandle {
    /// Create a widget in `container`.
    pub fn create(
        engine: &mut dyn MapEngine,
        container: Arc<dyn MapContainer>,
        options: WidgetOptions,
    ) -> Result<Self> {
        if !container.is_attached() {
            return Err(MapError::Initialization(format!(
                "container '{}' is not attached to a renderable surface",
                container.id()
            )));
        }
        if container.pixel_size().is_empty() {
            return Err(MapError::Initialization(format!(
                "container '{}' has no visible area",
                container.id()
            )));
        }

        let widget = engine.create_widget(container.as_ref(), &options)?;
        let events = widget.events();
        log::debug!(
            "created map widget in '{}' with style {}",
            container.id(),
            options.style
        );

        Ok(Self {
            widget,
            container,
            style: options.style,
            events,
            destroyed: false,
        })
    }

    pub fn into_shared(self) -> SharedMapHandle {
        Arc::new(Mutex::new(self))
    }

    pub fn container_id(&self) -> &str {
        self.container.id()
    }

    pub fn container_size(&self) -> PixelSize {
        self.container.pixel_size()
    }

    pub fn style(&self) -> MapStyleId {
        self.style
    }

    pub fn camera(&self) -> CameraState {
        self.widget.camera()
    }

    pub fn bearing(&self) -> f64 {
        self.widget.camera().bearing
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Swap the visual theme. The camera is restored if the engine moved it
    /// while reloading the style.
    pub fn set_style(&mut self, style: MapStyleId) -> Result<()> {
        self.ensure_live()?;
        let before = self.widget.camera();
        self.widget.set_style(style);
        self.style = style;
        if self.widget.camera() != before {
            log::debug!("style switch moved the camera, restoring it");
            self.widget.jump_to(before);
        }
        Ok(())
    }

    pub fn fly_to(&mut self, lat: f64, lon: f64, zoom: f64) -> Result<()> {
        self.ensure_live()?;
        let target = LatLng::new(lat, lon);
        if !target.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "fly-to target {} is out of range",
                target
            )));
        }
        self.widget.fly_to(target, zoom.clamp(MIN_ZOOM, MAX_ZOOM));
        Ok(())
    }

    pub fn set_bearing(&mut self, degrees: f64) -> Result<()> {
        self.ensure_live()?;
        self.widget.set_bearing(normalize_bearing(degrees));
        Ok(())
    }

    pub fn set_fog(&mut self, fog: &FogConfig) -> Result<()> {
        self.ensure_live()?;
        self.widget.set_fog(fog);
        Ok(())
    }

    /// Events received since the last call.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.events.try_iter().collect()
    }

    /// Release the widget. Safe to call more than once.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.widget.destroy();
        self.destroyed = true;
        log::debug!("destroyed map widget in '{}'", self.container.id());
    }

    fn ensure_live(&self) -> Result<()> {
        if self.destroyed {
            Err(MapError::NotMounted)
        } else {
            Ok(())
        }
    }
}

impl Drop for MapHandle {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl std::fmt::Debug for MapHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapHandle")
            .field("container", &self.container.id())
            .field("style", &self.style)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Projection;
    use crate::engine::{HeadlessContainer, HeadlessEngine};

    fn options() -> WidgetOptions {
        WidgetOptions {
            style: MapStyleId::Satellite,
            camera: CameraState::default(),
            projection: Projection::Globe,
        }
    }

    #[test]
    fn test_detached_container_fails() {
        let mut engine = HeadlessEngine::new();
        let container = Arc::new(HeadlessContainer::detached("map"));
        let err = MapHandle::create(&mut engine, container, options()).unwrap_err();
        assert!(matches!(err, MapError::Initialization(_)));
    }

    #[test]
    fn test_set_style_preserves_camera() {
        let mut engine = HeadlessEngine::new().resetting_camera_on_style_change();
        let container = Arc::new(HeadlessContainer::new("map", 800, 600));
        let mut handle = MapHandle::create(&mut engine, container, options()).unwrap();
        handle.fly_to(48.8566, 2.3522, 12.0).unwrap();
        let before = handle.camera();

        handle.set_style(MapStyleId::Dark).unwrap();

        let after = handle.camera();
        assert_eq!(after.center.lat.to_bits(), before.center.lat.to_bits());
        assert_eq!(after.center.lng.to_bits(), before.center.lng.to_bits());
        assert_eq!(after.zoom.to_bits(), before.zoom.to_bits());
        assert_eq!(handle.style(), MapStyleId::Dark);
    }

    #[test]
    fn test_fly_to_rejects_invalid_target() {
        let mut engine = HeadlessEngine::new();
        let container = Arc::new(HeadlessContainer::new("map", 800, 600));
        let mut handle = MapHandle::create(&mut engine, container, options()).unwrap();
        assert!(handle.fly_to(120.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn test_destroyed_handle_rejects_mutations() {
        let mut engine = HeadlessEngine::new();
        let container = Arc::new(HeadlessContainer::new("map", 800, 600));
        let mut handle = MapHandle::create(&mut engine, container, options()).unwrap();
        handle.destroy();
        handle.destroy();
        assert!(handle.is_destroyed());
        assert!(matches!(handle.set_bearing(10.0), Err(MapError::NotMounted)));
        assert!(!engine.is_bound("map"));
    }
}
