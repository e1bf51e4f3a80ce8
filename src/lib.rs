//! # tileview
//!
//! The core of an interactive tiled-map viewer.
//!
//! The view is an affine [`Transformation`] that pointer and wheel gestures
//! pan, zoom and rotate. Every render pass works out which tiles cover the
//! rotated viewport, draws the ones already loaded and fills the gaps with
//! cropped lower-resolution ancestors while the rest stream in.

pub mod core;
pub mod input;
pub mod prelude;
pub mod rendering;
pub mod runtime;
pub mod tiles;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    config::{GestureOptions, ImageCacheConfig, ViewerConfig},
    geo::{lat_long_to_pixel, LatLng, Point, Rect, Size, TileCoord},
    transform::Transformation,
    view::MapView,
};

pub use crate::input::{
    EventHandled, GestureController, InputEvent, KeyModifiers, PointerInput,
    TransformationProvider, WheelInput,
};

pub use crate::rendering::{DrawCommand, RenderContext, TileCanvas, TileImage};

pub use crate::runtime::{spawn, AsyncHandle, AsyncSpawner};

pub use crate::tiles::{
    visible_tiles, FrameScheduler, ImageCache, ImageFetcher, RenderStats, TileDescriptor,
    TileIndex, TileRenderer,
};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[cfg(feature = "http")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Load error: {0}")]
    Load(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Error type alias for convenience
pub type Error = MapError;

/// Installs `env_logger` as the `log` backend, honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
#[cfg(feature = "debug")]
pub fn init_logger() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
