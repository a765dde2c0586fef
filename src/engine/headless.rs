//! In-memory map engine.
//!
//! Keeps camera and style state without drawing anything. Useful for
//! command-line tools, server-side snapshot jobs and tests; the engine handle
//! is cheap to clone and every clone sees the same widgets, so a caller can
//! inject clicks or inspect recorded calls after handing one clone to a
//! controller.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{EngineEvent, MapContainer, MapEngine, MapWidget, PixelSize, WidgetOptions};
use crate::core::{
    camera::CameraState, config::FogConfig, geo::LatLng, style::MapStyleId,
};
use crate::prelude::HashMap;
use crate::{MapError, Result};

/// What a headless widget has been asked to do so far.
#[derive(Debug, Clone, Default)]
pub struct WidgetRecord {
    pub camera: CameraState,
    pub style: Option<MapStyleId>,
    pub flights: Vec<(LatLng, f64)>,
    pub style_changes: usize,
    pub fog_applications: usize,
    pub bearing_updates: usize,
    events: Option<Sender<EngineEvent>>,
}

type Registry = Arc<Mutex<HashMap<String, WidgetRecord>>>;

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<String, WidgetRecord>> {
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessEngine {
    widgets: Registry,
    reset_camera_on_style: bool,
}

impl HeadlessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mimic engines that recenter the camera when a new style loads.
    pub fn resetting_camera_on_style_change(mut self) -> Self {
        self.reset_camera_on_style = true;
        self
    }

    /// Whether a live widget is bound to `container_id`.
    pub fn is_bound(&self, container_id: &str) -> bool {
        lock(&self.widgets).contains_key(container_id)
    }

    pub fn widget_count(&self) -> usize {
        lock(&self.widgets).len()
    }

    /// Snapshot of the calls recorded for the widget in `container_id`.
    pub fn record(&self, container_id: &str) -> Option<WidgetRecord> {
        lock(&self.widgets).get(container_id).cloned()
    }

    /// Simulate the user clicking the map at `lat_lng`. Returns false when no
    /// widget is bound to the container.
    pub fn click(&self, container_id: &str, lat_lng: LatLng) -> bool {
        let widgets = lock(&self.widgets);
        match widgets.get(container_id).and_then(|r| r.events.as_ref()) {
            Some(tx) => tx.send(EngineEvent::Click { lat_lng }).is_ok(),
            None => false,
        }
    }
}

impl MapEngine for HeadlessEngine {
    fn create_widget(
        &mut self,
        container: &dyn MapContainer,
        options: &WidgetOptions,
    ) -> Result<Box<dyn MapWidget>> {
        let id = container.id().to_string();
        let (tx, rx) = unbounded();

        {
            let mut widgets = lock(&self.widgets);
            if widgets.contains_key(&id) {
                return Err(MapError::Initialization(format!(
                    "container '{}' already hosts a map widget",
                    id
                )));
            }
            widgets.insert(
                id.clone(),
                WidgetRecord {
                    camera: options.camera,
                    style: Some(options.style),
                    events: Some(tx.clone()),
                    ..WidgetRecord::default()
                },
            );
        }

        let _ = tx.send(EngineEvent::StyleLoaded {
            style: options.style,
        });

        Ok(Box::new(HeadlessWidget {
            container_id: id,
            camera: options.camera,
            style: options.style,
            initial_camera: options.camera,
            reset_camera_on_style: self.reset_camera_on_style,
            registry: Arc::clone(&self.widgets),
            tx,
            rx,
        }))
    }
}

struct HeadlessWidget {
    container_id: String,
    camera: CameraState,
    style: MapStyleId,
    initial_camera: CameraState,
    reset_camera_on_style: bool,
    registry: Registry,
    tx: Sender<EngineEvent>,
    rx: Receiver<EngineEvent>,
}

impl HeadlessWidget {
    fn update_record(&self, f: impl FnOnce(&mut WidgetRecord)) {
        if let Some(record) = lock(&self.registry).get_mut(&self.container_id) {
            f(record);
            record.camera = self.camera;
        }
    }
}

impl MapWidget for HeadlessWidget {
    fn camera(&self) -> CameraState {
        self.camera
    }

    fn jump_to(&mut self, camera: CameraState) {
        self.camera = camera;
        self.update_record(|_| {});
    }

    fn set_bearing(&mut self, degrees: f64) {
        self.camera = self.camera.with_bearing(degrees);
        self.update_record(|r| r.bearing_updates += 1);
    }

    // No animation: the camera lands on the target immediately.
    fn fly_to(&mut self, center: LatLng, zoom: f64) {
        self.camera.center = center;
        self.camera.zoom = zoom;
        self.update_record(|r| r.flights.push((center, zoom)));
    }

    fn set_style(&mut self, style: MapStyleId) {
        self.style = style;
        if self.reset_camera_on_style {
            self.camera = self.initial_camera;
        }
        self.update_record(|r| {
            r.style = Some(style);
            r.style_changes += 1;
        });
        let _ = self.tx.send(EngineEvent::StyleLoaded { style });
    }

    fn set_fog(&mut self, _fog: &FogConfig) {
        self.update_record(|r| r.fog_applications += 1);
    }

    fn events(&self) -> Receiver<EngineEvent> {
        self.rx.clone()
    }

    fn destroy(&mut self) {
        lock(&self.registry).remove(&self.container_id);
    }
}

/// Container stand-in with a mutable size.
#[derive(Debug)]
pub struct HeadlessContainer {
    id: String,
    width: AtomicU32,
    height: AtomicU32,
    attached: AtomicBool,
}

impl HeadlessContainer {
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
            attached: AtomicBool::new(true),
        }
    }

    /// A container that is not yet part of any renderable surface.
    pub fn detached(id: impl Into<String>) -> Self {
        let container = Self::new(id, 0, 0);
        container.attached.store(false, Ordering::SeqCst);
        container
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::SeqCst);
        self.height.store(height, Ordering::SeqCst);
    }

    pub fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::SeqCst);
    }
}

impl MapContainer for HeadlessContainer {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }

    fn pixel_size(&self) -> PixelSize {
        PixelSize::new(
            self.width.load(Ordering::SeqCst),
            self.height.load(Ordering::SeqCst),
        )
    }
}
