//! Static screenshots of the current view.
//!
//! A capture reads the camera and container size synchronously, then fetches
//! and decodes the still in the background. The decoded image is the only
//! owned resource: it is released when replaced, when the preview is
//! dismissed, or straight away if its capture was abandoned before it landed.

use image::DynamicImage;
use instant::Instant;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::core::config::SnapshotConfig;
use crate::engine::{lock_map, MapHandle, SharedMapHandle};
use crate::providers::{SnapshotRequest, StaticImageProvider};
use crate::{MapError, Result};

/// A decoded still ready for display.
#[derive(Debug)]
pub struct PreviewImage {
    image: DynamicImage,
    request: SnapshotRequest,
    captured_at: Instant,
}

impl PreviewImage {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// The request this image answers.
    pub fn request(&self) -> &SnapshotRequest {
        &self.request
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }

    /// Write the image to disk; the format follows the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreviewState {
    pub image: Option<Arc<PreviewImage>>,
    pub visible: bool,
}

#[derive(Debug, Default)]
struct SnapshotInner {
    preview: PreviewState,
    // Bumped by every capture and dismiss; a fetch applies only if unchanged.
    epoch: u64,
}

fn lock(inner: &Mutex<SnapshotInner>) -> MutexGuard<'_, SnapshotInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The preview now shows the new image.
    Shown,
    /// Dismissed or superseded while in flight; the image was released.
    Discarded,
}

pub struct SnapshotService {
    provider: Arc<dyn StaticImageProvider>,
    inner: Arc<Mutex<SnapshotInner>>,
    config: SnapshotConfig,
}

impl SnapshotService {
    pub fn new(provider: Arc<dyn StaticImageProvider>, config: SnapshotConfig) -> Self {
        Self {
            provider,
            inner: Arc::new(Mutex::new(SnapshotInner::default())),
            config,
        }
    }

    pub fn preview(&self) -> PreviewState {
        lock(&self.inner).preview.clone()
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.inner).preview.visible
    }

    /// Describe the current view. Width is capped to the provider limit.
    pub fn build_request(&self, map: &MapHandle) -> Result<SnapshotRequest> {
        let size = map.container_size();
        if size.is_empty() {
            return Err(MapError::Initialization(format!(
                "container '{}' has no visible area to capture",
                map.container_id()
            )));
        }
        let pixel_height = match self.config.max_height {
            Some(max) => size.height.min(max),
            None => size.height,
        };
        Ok(SnapshotRequest {
            style: map.style(),
            camera: map.camera(),
            pixel_width: size.width.min(self.config.max_width),
            pixel_height,
        })
    }

    /// Start a capture of the current view.
    ///
    /// Must not be called while the caller holds the map lock.
    pub fn capture(&self, map: &SharedMapHandle) -> Result<PendingCapture> {
        let request = {
            let handle = lock_map(map);
            if handle.is_destroyed() {
                return Err(MapError::NotMounted);
            }
            self.build_request(&handle)?
        };

        let mut inner = lock(&self.inner);
        inner.epoch += 1;
        log::debug!(
            "capturing {}x{} snapshot of {} at zoom {}",
            request.pixel_width,
            request.pixel_height,
            request.camera.center,
            request.camera.zoom
        );
        Ok(PendingCapture {
            epoch: inner.epoch,
            request,
            provider: Arc::clone(&self.provider),
            inner: Arc::clone(&self.inner),
        })
    }

    /// `capture` followed by resolving it.
    pub async fn capture_and_wait(&self, map: &SharedMapHandle) -> Result<CaptureOutcome> {
        self.capture(map)?.resolve().await
    }

    /// Hide the preview and release its image. Captures still in flight will
    /// be discarded when they land.
    pub fn dismiss(&self) {
        let released = {
            let mut inner = lock(&self.inner);
            inner.epoch += 1;
            inner.preview.visible = false;
            inner.preview.image.take()
        };
        if released.is_some() {
            log::debug!("snapshot preview dismissed");
        }
    }
}

impl std::fmt::Debug for SnapshotService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotService")
            .field("config", &self.config)
            .field("visible", &self.is_visible())
            .finish()
    }
}

/// A capture whose image has not arrived yet.
pub struct PendingCapture {
    epoch: u64,
    request: SnapshotRequest,
    provider: Arc<dyn StaticImageProvider>,
    inner: Arc<Mutex<SnapshotInner>>,
}

impl PendingCapture {
    pub fn request(&self) -> &SnapshotRequest {
        &self.request
    }

    fn is_current(&self) -> bool {
        lock(&self.inner).epoch == self.epoch
    }

    /// Fetch and decode the still, then show it if this capture is still the
    /// latest. Failures leave the preview untouched.
    pub async fn resolve(self) -> Result<CaptureOutcome> {
        let bytes = match self.provider.render(&self.request).await {
            Ok(bytes) => bytes,
            Err(e) if !self.is_current() => {
                log::debug!("abandoned snapshot fetch failed: {}", e);
                return Ok(CaptureOutcome::Discarded);
            }
            Err(e) => {
                log::warn!("snapshot fetch failed: {}", e);
                return Err(e);
            }
        };

        if !self.is_current() {
            log::debug!("snapshot landed after dismiss, releasing it");
            return Ok(CaptureOutcome::Discarded);
        }

        let image = image::load_from_memory(&bytes).map_err(|e| {
            log::warn!("snapshot is not a decodable image: {}", e);
            MapError::from(e)
        })?;

        let preview = Arc::new(PreviewImage {
            image,
            request: self.request,
            captured_at: Instant::now(),
        });

        let replaced = {
            let mut inner = lock(&self.inner);
            if inner.epoch != self.epoch {
                return Ok(CaptureOutcome::Discarded);
            }
            inner.preview.visible = true;
            inner.preview.image.replace(Arc::clone(&preview))
        };
        drop(replaced);

        log::info!(
            "snapshot ready ({}x{}, {} bytes)",
            preview.width(),
            preview.height(),
            bytes.len()
        );
        Ok(CaptureOutcome::Shown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{camera::CameraState, config::Projection, style::MapStyleId};
    use crate::engine::{HeadlessContainer, HeadlessEngine, WidgetOptions};
    use async_trait::async_trait;
    use std::io::Cursor;

    struct PngProvider;

    #[async_trait]
    impl StaticImageProvider for PngProvider {
        async fn render(&self, request: &SnapshotRequest) -> Result<Vec<u8>> {
            let image = DynamicImage::new_rgba8(request.pixel_width, request.pixel_height);
            let mut bytes = Cursor::new(Vec::new());
            image.write_to(&mut bytes, image::ImageOutputFormat::Png)?;
            Ok(bytes.into_inner())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl StaticImageProvider for FailingProvider {
        async fn render(&self, _request: &SnapshotRequest) -> Result<Vec<u8>> {
            Err(MapError::Provider("HTTP 500 Internal Server Error".into()))
        }
    }

    fn map(width: u32, height: u32) -> SharedMapHandle {
        let mut engine = HeadlessEngine::new();
        MapHandle::create(
            &mut engine,
            Arc::new(HeadlessContainer::new("map", width, height)),
            WidgetOptions {
                style: MapStyleId::Light,
                camera: CameraState::default(),
                projection: Projection::Globe,
            },
        )
        .unwrap()
        .into_shared()
    }

    #[test]
    fn test_width_is_capped_height_is_not() {
        let service = SnapshotService::new(Arc::new(PngProvider), SnapshotConfig::default());
        let map = map(1920, 1400);
        let request = service.build_request(&lock_map(&map)).unwrap();
        assert_eq!(request.pixel_width, 1280);
        assert_eq!(request.pixel_height, 1400);
        assert_eq!(request.style, MapStyleId::Light);
    }

    #[tokio::test]
    async fn test_capture_shows_decoded_image() {
        let service = SnapshotService::new(Arc::new(PngProvider), SnapshotConfig::default());
        let map = map(64, 32);
        let outcome = service.capture_and_wait(&map).await.unwrap();
        assert_eq!(outcome, CaptureOutcome::Shown);

        let preview = service.preview();
        assert!(preview.visible);
        let image = preview.image.unwrap();
        assert_eq!((image.width(), image.height()), (64, 32));
    }

    #[tokio::test]
    async fn test_recapture_releases_previous_image() {
        let service = SnapshotService::new(Arc::new(PngProvider), SnapshotConfig::default());
        let map = map(16, 16);
        service.capture_and_wait(&map).await.unwrap();
        let first = Arc::downgrade(&service.preview().image.unwrap());

        service.capture_and_wait(&map).await.unwrap();
        assert!(first.upgrade().is_none());

        let second = Arc::downgrade(&service.preview().image.unwrap());
        service.dismiss();
        assert!(second.upgrade().is_none());
        assert!(!service.is_visible());
    }

    #[tokio::test]
    async fn test_dismiss_before_landing_discards() {
        let service = SnapshotService::new(Arc::new(PngProvider), SnapshotConfig::default());
        let map = map(16, 16);
        let pending = service.capture(&map).unwrap();
        service.dismiss();
        assert_eq!(pending.resolve().await.unwrap(), CaptureOutcome::Discarded);
        let preview = service.preview();
        assert!(!preview.visible);
        assert!(preview.image.is_none());
    }

    #[tokio::test]
    async fn test_failure_of_dismissed_capture_is_discarded() {
        let service = SnapshotService::new(Arc::new(FailingProvider), SnapshotConfig::default());
        let map = map(16, 16);
        let pending = service.capture(&map).unwrap();
        service.dismiss();
        assert_eq!(pending.resolve().await.unwrap(), CaptureOutcome::Discarded);

        let current = service.capture(&map).unwrap();
        assert!(matches!(current.resolve().await, Err(MapError::Provider(_))));
        assert!(!service.is_visible());
    }
}
