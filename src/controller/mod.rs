//! The map view controller and its parts.
//!
//! ```text
//! user input -> SearchCoordinator / StyleController / SnapshotService
//!            -> MapHandle mutation or provider call -> derived UI state
//! CameraAnimator rotates the globe until the first click.
//! ```

pub mod animator;
pub mod search;
pub mod snapshot;
pub mod style;

pub use crate::providers::SnapshotRequest;
pub use animator::{AnimatorState, CameraAnimator};
pub use search::{PendingSearch, SearchCoordinator, SearchOutcome};
pub use snapshot::{CaptureOutcome, PendingCapture, PreviewImage, PreviewState, SnapshotService};
pub use style::StyleController;

use std::sync::Arc;

use crate::core::{
    camera::CameraState,
    config::{ControllerConfig, Projection},
    style::MapStyleId,
};
use crate::engine::{
    lock_map, EngineEvent, MapContainer, MapEngine, MapHandle, SharedMapHandle, WidgetOptions,
};
use crate::providers::{
    GeocodeProvider, MapboxGeocoder, MapboxStaticImages, SearchResult, StaticImageProvider,
};
use crate::runtime::{default_spawner, AsyncSpawner};
use crate::{MapError, Result};

/// Owns one map widget and keeps camera, search and preview state in step.
pub struct MapViewController {
    config: ControllerConfig,
    engine: Box<dyn MapEngine>,
    spawner: Arc<dyn AsyncSpawner>,
    map: Option<SharedMapHandle>,
    animator: CameraAnimator,
    search: SearchCoordinator,
    style: StyleController,
    snapshot: SnapshotService,
}

impl MapViewController {
    pub fn new(
        config: ControllerConfig,
        engine: Box<dyn MapEngine>,
        geocoder: Arc<dyn GeocodeProvider>,
        images: Arc<dyn StaticImageProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let spawner = default_spawner();
        Ok(Self {
            animator: CameraAnimator::new(config.animation.clone(), Arc::clone(&spawner)),
            search: SearchCoordinator::new(geocoder, config.search.clone()),
            style: StyleController::new(config.initial_style),
            snapshot: SnapshotService::new(images, config.snapshot.clone()),
            spawner,
            engine,
            map: None,
            config,
        })
    }

    /// Controller backed by the Mapbox geocoding and static image APIs.
    pub fn with_mapbox(config: ControllerConfig, engine: Box<dyn MapEngine>) -> Result<Self> {
        let geocoder =
            MapboxGeocoder::new(&config.provider)?.with_limit(config.search.result_limit);
        let images = MapboxStaticImages::new(&config.provider)?;
        Self::new(config, engine, Arc::new(geocoder), Arc::new(images))
    }

    /// Run the bearing animation, timer included, on `spawner` instead of
    /// Tokio.
    pub fn with_spawner(mut self, spawner: Arc<dyn AsyncSpawner>) -> Self {
        self.spawner = spawner;
        if self.map.is_none() {
            self.animator = self.fresh_animator();
        }
        self
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    fn fresh_animator(&self) -> CameraAnimator {
        CameraAnimator::new(self.config.animation.clone(), Arc::clone(&self.spawner))
    }

    // ---- lifecycle ----

    /// Create the map widget in `container` and start the idle rotation.
    /// A second mount without an unmount in between is refused. When the
    /// rotation cannot be scheduled the widget is torn down again and
    /// `MapError::Initialization` is returned.
    pub fn mount(&mut self, container: Arc<dyn MapContainer>) -> Result<()> {
        if let Some(map) = &self.map {
            return Err(MapError::AlreadyMounted(
                lock_map(map).container_id().to_string(),
            ));
        }

        let options = WidgetOptions {
            style: self.style.current(),
            camera: self.config.initial_camera,
            projection: self.config.projection,
        };
        let map = MapHandle::create(self.engine.as_mut(), container, options)?.into_shared();
        self.map = Some(Arc::clone(&map));
        self.animator = self.fresh_animator();

        self.process_events()?;
        if self.config.animation.enabled {
            if let Err(e) = self.animator.start(&map) {
                self.map = None;
                lock_map(&map).destroy();
                return Err(e);
            }
        }
        log::info!("map mounted in '{}'", lock_map(&map).container_id());
        Ok(())
    }

    /// Stop the animation, drop transient UI state and destroy the widget.
    pub fn unmount(&mut self) {
        self.animator.cancel();
        self.snapshot.dismiss();
        self.search.clear();
        if let Some(map) = self.map.take() {
            let mut handle = lock_map(&map);
            handle.destroy();
            log::info!("map unmounted from '{}'", handle.container_id());
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.map.is_some()
    }

    pub fn map(&self) -> Result<&SharedMapHandle> {
        self.map.as_ref().ok_or(MapError::NotMounted)
    }

    pub fn camera(&self) -> Result<CameraState> {
        Ok(lock_map(self.map()?).camera())
    }

    // ---- engine events ----

    /// React to one widget event.
    pub fn handle_event(&mut self, event: EngineEvent) -> Result<()> {
        match event {
            EngineEvent::Click { lat_lng } => {
                if self.animator.is_running() {
                    log::debug!("click at {} stops the rotation", lat_lng);
                }
                self.animator.stop();
            }
            EngineEvent::StyleLoaded { style } => {
                // A style load wipes the atmosphere, put it back.
                if let (Projection::Globe, Some(fog)) = (self.config.projection, &self.config.fog) {
                    lock_map(self.map()?).set_fog(fog)?;
                    log::debug!("fog applied after {} loaded", style);
                }
            }
        }
        Ok(())
    }

    /// Drain queued widget events; returns how many were handled.
    pub fn process_events(&mut self) -> Result<usize> {
        let events = lock_map(self.map()?).drain_events();
        let count = events.len();
        for event in events {
            self.handle_event(event)?;
        }
        Ok(count)
    }

    pub fn animator(&self) -> &CameraAnimator {
        &self.animator
    }

    pub fn animator_state(&self) -> AnimatorState {
        self.animator.state()
    }

    // ---- search ----

    pub fn search_coordinator(&self) -> &SearchCoordinator {
        &self.search
    }

    /// See [`SearchCoordinator::on_query_change`].
    pub fn on_query_change(&self, text: &str) -> Option<PendingSearch> {
        self.search.on_query_change(text)
    }

    pub async fn search(&self, text: &str) -> Result<SearchOutcome> {
        self.search.search(text).await
    }

    pub fn query(&self) -> String {
        self.search.query()
    }

    pub fn search_results(&self) -> Vec<SearchResult> {
        self.search.results()
    }

    /// Fly to a chosen candidate and reset the search box.
    pub fn select_result(&mut self, result: &SearchResult) -> Result<()> {
        let map = Arc::clone(self.map()?);
        self.search
            .on_result_selected(result, &map, &mut self.animator)
    }

    // ---- style ----

    pub fn current_style(&self) -> MapStyleId {
        self.style.current()
    }

    pub fn style_catalog(&self) -> &'static [MapStyleId] {
        self.style.catalog()
    }

    /// Returns whether the map was restyled (false when already active).
    pub fn set_style(&mut self, style: MapStyleId) -> Result<bool> {
        let map = Arc::clone(self.map()?);
        self.style.set_style(&map, style)
    }

    // ---- snapshot ----

    pub fn snapshot_service(&self) -> &SnapshotService {
        &self.snapshot
    }

    pub fn capture(&self) -> Result<PendingCapture> {
        self.snapshot.capture(self.map()?)
    }

    pub async fn capture_snapshot(&self) -> Result<CaptureOutcome> {
        self.snapshot.capture_and_wait(self.map()?).await
    }

    pub fn preview(&self) -> PreviewState {
        self.snapshot.preview()
    }

    pub fn dismiss_preview(&self) {
        self.snapshot.dismiss();
    }
}

impl Drop for MapViewController {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for MapViewController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapViewController")
            .field("mounted", &self.is_mounted())
            .field("style", &self.style.current())
            .field("animator", &self.animator)
            .field("search", &self.search)
            .field("snapshot", &self.snapshot)
            .finish()
    }
}
