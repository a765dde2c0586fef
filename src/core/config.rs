//! Configuration for the map view controller
//!
//! Every knob has a default matching the hosted component this crate replaces,
//! except the API credential, which must come from the caller (environment,
//! JSON file, or code). Nothing here is process-global.

use serde::Deserialize;
use std::time::Duration;

use crate::core::{camera::CameraState, constants::*, geo::LatLng, style::MapStyleId};
use crate::{MapError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Globe,
    Mercator,
}

/// Atmosphere drawn around the globe. Re-applied after every style load.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FogConfig {
    pub color: String,
    pub high_color: String,
    pub horizon_blend: f64,
    pub space_color: String,
    pub star_intensity: f64,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: "rgb(186, 210, 235)".to_string(),
            high_color: "rgb(36, 92, 223)".to_string(),
            horizon_blend: 0.02,
            space_color: "rgb(11, 11, 25)".to_string(),
            star_intensity: 0.6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Start rotating the globe as soon as the map is mounted.
    pub enabled: bool,
    pub tick_interval_ms: u64,
    pub bearing_step: f64,
}

impl AnimationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            bearing_step: DEFAULT_BEARING_STEP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub select_zoom: f64,
    /// Ask the geocoder for at most this many candidates.
    pub result_limit: Option<u8>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            select_zoom: DEFAULT_SELECT_ZOOM,
            result_limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub max_width: u32,
    pub max_height: Option<u32>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            max_width: MAX_SNAPSHOT_WIDTH,
            max_height: None,
        }
    }
}

/// Connection settings shared by the geocoding and static image clients.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderConfig {
    pub access_token: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}

fn default_user_agent() -> String {
    USER_AGENT.to_string()
}

impl ProviderConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_base_url: default_api_base_url(),
            timeout_ms: default_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(MapError::Config("access token must not be empty".into()));
        }
        if self.timeout_ms == 0 {
            return Err(MapError::Config("request timeout must be positive".into()));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(MapError::Config(format!(
                "api base url '{}' is not an http(s) url",
                self.api_base_url
            )));
        }
        Ok(())
    }
}

/// Top-level configuration handed to `MapViewController::new`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControllerConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub initial_camera: CameraState,
    #[serde(default)]
    pub initial_style: MapStyleId,
    #[serde(default)]
    pub projection: Projection,
    #[serde(default)]
    pub fog: Option<FogConfig>,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub snapshot: SnapshotConfig,
}

impl ControllerConfig {
    pub fn with_access_token(access_token: impl Into<String>) -> Self {
        Self {
            provider: ProviderConfig::new(access_token),
            initial_camera: CameraState::default(),
            initial_style: MapStyleId::default(),
            projection: Projection::default(),
            fog: Some(FogConfig::default()),
            animation: AnimationConfig::default(),
            search: SearchConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }

    /// Reads the credential from `MAPBOX_ACCESS_TOKEN` and an optional API
    /// host override from `MAPBOX_API_URL`.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(ACCESS_TOKEN_ENV)
            .map_err(|_| MapError::Config(format!("{} is not set", ACCESS_TOKEN_ENV)))?;
        let mut config = Self::with_access_token(token);
        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            config.provider.api_base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;

        if !(1..=MAX_TICK_INTERVAL_MS).contains(&self.animation.tick_interval_ms) {
            return Err(MapError::Config(format!(
                "animation tick interval must be within 1..={} ms",
                MAX_TICK_INTERVAL_MS
            )));
        }
        if !self.animation.bearing_step.is_finite() {
            return Err(MapError::Config("bearing step must be finite".into()));
        }
        if self.snapshot.max_width == 0 || self.snapshot.max_height == Some(0) {
            return Err(MapError::Config("snapshot size limits must be positive".into()));
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.search.select_zoom) {
            return Err(MapError::Config(format!(
                "select zoom {} outside {}..={}",
                self.search.select_zoom, MIN_ZOOM, MAX_ZOOM
            )));
        }

        let camera = &self.initial_camera;
        if !camera.center.is_valid() {
            return Err(MapError::InvalidCoordinates(format!(
                "initial center {} is out of range",
                camera.center
            )));
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&camera.zoom) {
            return Err(MapError::Config(format!("initial zoom {} out of range", camera.zoom)));
        }
        Ok(())
    }

    pub fn initial_center(&self) -> LatLng {
        self.initial_camera.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_component() {
        let config = ControllerConfig::with_access_token("pk.test");
        assert_eq!(config.initial_style, MapStyleId::Satellite);
        assert_eq!(config.initial_center(), LatLng::new(20.0, 80.0));
        assert_eq!(config.initial_camera.zoom, 2.0);
        assert_eq!(config.animation.tick_interval(), Duration::from_millis(50));
        assert_eq!(config.animation.bearing_step, 2.0);
        assert_eq!(config.search.select_zoom, 16.0);
        assert_eq!(config.snapshot.max_width, 1280);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_token_rejected() {
        let config = ControllerConfig::with_access_token("  ");
        assert!(matches!(config.validate(), Err(MapError::Config(_))));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let mut config = ControllerConfig::with_access_token("pk.test");
        config.animation.tick_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_huge_tick_rejected() {
        let mut config = ControllerConfig::with_access_token("pk.test");
        config.animation.tick_interval_ms = u64::MAX;
        assert!(matches!(config.validate(), Err(MapError::Config(_))));
        config.animation.tick_interval_ms = MAX_TICK_INTERVAL_MS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ControllerConfig::with_access_token("pk.test");
        config.provider.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(MapError::Config(_))));
    }

    #[test]
    fn test_from_json_with_partial_sections() {
        let json = r#"{
            "provider": { "access_token": "pk.json" },
            "initial_style": "dark-v11",
            "projection": "mercator",
            "animation": { "enabled": false }
        }"#;
        let config = ControllerConfig::from_json_str(json).unwrap();
        assert_eq!(config.provider.access_token, "pk.json");
        assert_eq!(config.provider.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.initial_style, MapStyleId::Dark);
        assert_eq!(config.projection, Projection::Mercator);
        assert!(!config.animation.enabled);
        assert_eq!(config.animation.bearing_step, DEFAULT_BEARING_STEP);
        assert!(config.fog.is_none());
    }

    #[test]
    fn test_from_json_requires_token() {
        let err = ControllerConfig::from_json_str("{}").unwrap_err();
        assert!(matches!(err, MapError::Serialization(_)));
    }
}
