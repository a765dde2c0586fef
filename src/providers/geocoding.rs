use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{http, GeocodeProvider, SearchResult};
use crate::core::{config::ProviderConfig, geo::LatLng};
use crate::{MapError, Result};

/// Forward geocoding through the Mapbox Places API.
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    client: Client,
    base_url: Url,
    access_token: String,
    limit: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    place_name: String,
    /// `[lng, lat]`
    center: [f64; 2],
}

impl MapboxGeocoder {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: http::build_client(config)?,
            base_url: http::base_url(config)?,
            access_token: config.access_token.clone(),
            limit: None,
        })
    }

    /// Ask for at most `limit` candidates (the API caps this at 10).
    pub fn with_limit(mut self, limit: Option<u8>) -> Self {
        self.limit = limit.map(|l| l.clamp(1, 10));
        self
    }

    pub(crate) fn request_url(&self, query: &str) -> Result<Url> {
        let file = format!("{}.json", query);
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MapError::Config(format!("api base url '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(&["geocoding", "v5", "mapbox.places", file.as_str()]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("access_token", &self.access_token);
            if let Some(limit) = self.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }

    /// Decode a Places API response, keeping the provider's relevance order.
    pub(crate) fn parse_response(body: &str) -> Result<Vec<SearchResult>> {
        let collection: FeatureCollection = serde_json::from_str(body)
            .map_err(|e| MapError::Provider(format!("malformed geocoding response: {}", e)))?;

        collection
            .features
            .into_iter()
            .map(|feature| {
                let center = LatLng::from_lng_lat(feature.center);
                if !center.is_valid() {
                    return Err(MapError::Provider(format!(
                        "geocoder returned invalid center {} for '{}'",
                        center, feature.place_name
                    )));
                }
                Ok(SearchResult {
                    label: feature.place_name,
                    center,
                })
            })
            .collect()
    }
}

#[async_trait]
impl GeocodeProvider for MapboxGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let url = self.request_url(query)?;
        log::debug!("geocoding request {}", http::redacted(&url));

        let response = self.client.get(url).send().await?;
        let body = http::ensure_success(response).await?.text().await?;
        Self::parse_response(&body)
    }
}
