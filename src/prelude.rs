//! Prelude module for common tileview types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use tileview::prelude::*;`

pub use crate::core::{
    config::{GestureOptions, ImageCacheConfig, ViewerConfig},
    geo::{lat_long_to_pixel, LatLng, Point, Rect, Size, TileCoord},
    transform::Transformation,
    view::MapView,
};

pub use crate::input::{
    EventHandled, GestureController, GestureState, InputEvent, KeyModifiers, PointerInput,
    TransformationProvider, WheelInput,
};

pub use crate::rendering::{DrawCommand, RenderContext, TileCanvas, TileImage};

pub use crate::runtime::{spawn, spawners::queued::QueuedSpawner, AsyncHandle, AsyncSpawner};

#[cfg(feature = "tokio-runtime")]
pub use crate::runtime::spawners::tokio_impl::TokioSpawner;

pub use crate::tiles::{
    visible_tiles, FrameScheduler, ImageCache, ImageFetcher, RenderStats, TileDescriptor,
    TileIndex, TileRenderer,
};

#[cfg(feature = "http")]
pub use crate::tiles::HttpImageFetcher;

pub use crate::{Error as MapError, Result};

pub use std::{collections::VecDeque, sync::Arc};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
