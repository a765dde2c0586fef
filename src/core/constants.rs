//! Engine-wide defaults mirroring the hosted Mapbox component this crate drives.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Interval between two bearing animation ticks, in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 50;

/// Longest accepted animation tick, in milliseconds.
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;

/// Degrees added to the bearing on every animation tick.
pub const DEFAULT_BEARING_STEP: f64 = 2.0;

/// Zoom level the camera flies to when a search result is selected.
pub const DEFAULT_SELECT_ZOOM: f64 = 16.0;

/// The static image API rejects wider images.
pub const MAX_SNAPSHOT_WIDTH: u32 = 1280;

/// Initial camera: centered over the Indian Ocean, whole globe in view.
pub const DEFAULT_CENTER_LAT: f64 = 20.0;
pub const DEFAULT_CENTER_LNG: f64 = 80.0;
pub const DEFAULT_ZOOM: f64 = 2.0;

pub const DEFAULT_API_BASE_URL: &str = "https://api.mapbox.com";

/// Environment variable read by `ControllerConfig::from_env`.
pub const ACCESS_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Optional override of the API host, mostly for proxies and tests.
pub const API_BASE_URL_ENV: &str = "MAPBOX_API_URL";

pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 10_000;

pub const USER_AGENT: &str = concat!("mapview/", env!("CARGO_PKG_VERSION"));

/// Zoom range accepted by Mapbox GL.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 22.0;
