//! Configuration system for the viewer
//!
//! This module groups the tunables of the tile host, the image cache and the
//! gesture controller into one serializable [`ViewerConfig`], with presets for
//! the cache in the same spirit as the loader presets.

use crate::core::{
    constants::{
        DEFAULT_BASE_URL, DEFAULT_ORIGIN_LAT_LNG, MAX_ZOOM, MIN_ZOOM, WHEEL_ROTATE_RATE,
        WHEEL_ZOOM_BASE,
    },
    geo::{LatLng, Point},
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Prefix the `zoom/x/y` tile path is appended to
    pub base_url: String,
    /// Coarsest zoom the host serves, also the floor of the LOD fallback
    pub min_zoom: u8,
    /// Most detailed zoom the host serves
    pub max_zoom: u8,
    /// Geographic anchor of tile grid index (0, 0)
    pub origin: LatLng,
    /// Render at device pixel resolution on high-DPI displays
    pub high_quality: bool,
    pub cache: ImageCacheConfig,
    pub gestures: GestureOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let (lat, lng) = DEFAULT_ORIGIN_LAT_LNG;
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            origin: LatLng::new(lat, lng),
            high_quality: true,
            cache: ImageCacheConfig::default(),
            gestures: GestureOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Parses a JSON document; missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_zoom > self.max_zoom {
            return Err(MapError::InvalidConfig(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.cache.concurrent_load_limit == Some(0) {
            return Err(MapError::InvalidConfig(
                "concurrent_load_limit must be at least 1".to_string(),
            ));
        }
        let base = self.gestures.wheel_zoom_base;
        if base.is_nan() || base <= 0.0 {
            return Err(MapError::InvalidConfig(format!(
                "wheel_zoom_base must be positive, got {}",
                base
            )));
        }
        Ok(())
    }

    /// Number of internal zoom steps between the finest and coarsest level
    pub fn zoom_levels(&self) -> u8 {
        self.max_zoom - self.min_zoom
    }

    /// Global pixel position tile index (0, 0) is aligned to
    pub fn origin_pixel(&self) -> Point {
        self.origin.to_pixel(self.max_zoom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageCacheConfig {
    /// Maximum loads in flight; `None` means unbounded
    pub concurrent_load_limit: Option<usize>,
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Unified configuration presets for ImageCacheConfig
impl ImageCacheConfig {
    pub fn unbounded() -> Self {
        Self {
            concurrent_load_limit: None,
        }
    }

    /// Caps loads to avoid the lag spikes of decoding many images at once
    pub fn low_resource() -> Self {
        Self {
            concurrent_load_limit: Some(6),
        }
    }

    pub fn for_testing() -> Self {
        Self {
            concurrent_load_limit: Some(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureOptions {
    /// Scroll-wheel-centric interaction for mouse users.
    ///
    /// When set, scrolling pans the map, shift turns vertical scrolling into
    /// horizontal panning, ctrl/meta zooms, and ctrl/meta with shift rotates
    /// about the cursor. When unset, scrolling always zooms.
    pub scroll_mode: bool,
    pub wheel_zoom_base: f64,
    pub wheel_rotate_rate: f64,
}

impl Default for GestureOptions {
    fn default() -> Self {
        Self {
            scroll_mode: false,
            wheel_zoom_base: WHEEL_ZOOM_BASE,
            wheel_rotate_rate: WHEEL_ROTATE_RATE,
        }
    }
}
