//! Prelude module for common mapview types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapview::prelude::*;`

pub use crate::core::{
    camera::CameraState,
    config::{
        AnimationConfig, ControllerConfig, FogConfig, Projection, ProviderConfig, SearchConfig,
        SnapshotConfig,
    },
    geo::LatLng,
    style::MapStyleId,
};

pub use crate::engine::{
    EngineEvent, HeadlessContainer, HeadlessEngine, MapContainer, MapEngine, MapHandle,
    MapWidget, PixelSize, SharedMapHandle, WidgetOptions,
};

pub use crate::providers::{
    GeocodeProvider, MapboxGeocoder, MapboxStaticImages, SearchResult, SnapshotRequest,
    StaticImageProvider,
};

pub use crate::controller::{
    AnimatorState, CameraAnimator, CaptureOutcome, MapViewController, PreviewImage,
    PreviewState, SearchCoordinator, SearchOutcome, SnapshotService, StyleController,
};

pub use crate::runtime::{AsyncHandle, AsyncSpawner};

pub use crate::{Error as MapError, ErrorKind, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
