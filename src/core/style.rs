//! Catalog of the visual themes the map can switch between.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::MapError;

/// Identifier of one of the fixed Mapbox map themes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MapStyleId {
    Satellite,
    Streets,
    Dark,
    Light,
    SatelliteStreets,
    NavigationDay,
    NavigationNight,
}

impl MapStyleId {
    /// Every theme, in the order a style selector lists them.
    pub const ALL: [MapStyleId; 7] = [
        MapStyleId::Satellite,
        MapStyleId::Streets,
        MapStyleId::Dark,
        MapStyleId::Light,
        MapStyleId::SatelliteStreets,
        MapStyleId::NavigationDay,
        MapStyleId::NavigationNight,
    ];

    /// Mapbox style id, e.g. `streets-v12`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Satellite => "satellite-v9",
            Self::Streets => "streets-v12",
            Self::Dark => "dark-v11",
            Self::Light => "light-v11",
            Self::SatelliteStreets => "satellite-streets-v12",
            Self::NavigationDay => "navigation-day-v1",
            Self::NavigationNight => "navigation-night-v1",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Satellite => "Satellite",
            Self::Streets => "Streets",
            Self::Dark => "Dark",
            Self::Light => "Light",
            Self::SatelliteStreets => "Satellite Streets",
            Self::NavigationDay => "Navigation Day",
            Self::NavigationNight => "Navigation Night",
        }
    }

    /// Thumbnail shown next to the label in a style picker.
    pub fn thumbnail(&self) -> &'static str {
        match self {
            Self::Satellite => "/sat.png",
            Self::Streets => "/street.png",
            Self::Dark => "/dark.png",
            Self::Light => "/light.png",
            Self::SatelliteStreets => "/sat2.png",
            Self::NavigationDay => "/day.png",
            Self::NavigationNight => "/night.png",
        }
    }

    /// Style URL understood by Mapbox GL.
    pub fn style_url(&self) -> String {
        format!("mapbox://styles/mapbox/{}", self.id())
    }
}

impl Default for MapStyleId {
    fn default() -> Self {
        Self::Satellite
    }
}

impl std::fmt::Display for MapStyleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for MapStyleId {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.id() == wanted || style.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MapError::Config(format!("unknown map style '{}'", wanted)))
    }
}

impl TryFrom<String> for MapStyleId {
    type Error = MapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MapStyleId> for String {
    fn from(style: MapStyleId) -> Self {
        style.id().to_string()
    }
}
