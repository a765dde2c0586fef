use async_trait::async_trait;
use reqwest::{Client, Url};

use super::{http, SnapshotRequest, StaticImageProvider};
use crate::core::config::ProviderConfig;
use crate::{MapError, Result};

/// Renders stills through the Mapbox Static Images API.
#[derive(Debug, Clone)]
pub struct MapboxStaticImages {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl MapboxStaticImages {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config)?,
            base_url: http::base_url(config)?,
            access_token: config.access_token.clone(),
        })
    }

    /// `/styles/v1/mapbox/{style}/static/{lon},{lat},{zoom},{bearing}/{w}x{h}`
    pub(crate) fn request_url(&self, request: &SnapshotRequest) -> Result<Url> {
        let camera = &request.camera;
        let position = format!(
            "{},{},{},{}",
            camera.center.lng, camera.center.lat, camera.zoom, camera.bearing
        );
        let size = format!("{}x{}", request.pixel_width, request.pixel_height);

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MapError::Config(format!("api base url '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(&[
                "styles",
                "v1",
                "mapbox",
                request.style.id(),
                "static",
                position.as_str(),
                size.as_str(),
            ]);
        url.query_pairs_mut()
            .append_pair("access_token", &self.access_token);
        Ok(url)
    }
}

#[async_trait]
impl StaticImageProvider for MapboxStaticImages {
    async fn render(&self, request: &SnapshotRequest) -> Result<Vec<u8>> {
        let url = self.request_url(request)?;
        log::debug!("static image request {}", http::redacted(&url));

        let response = self.client.get(url).send().await?;
        let bytes = http::ensure_success(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
