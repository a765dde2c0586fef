pub mod camera;
pub mod config;
pub mod constants;
pub mod geo;
pub mod style;

pub use camera::CameraState;
pub use config::{
    AnimationConfig, ControllerConfig, FogConfig, Projection, ProviderConfig, SearchConfig,
    SnapshotConfig,
};
pub use geo::LatLng;
pub use style::MapStyleId;
