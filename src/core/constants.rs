//! Core constants of the tile server and the interaction model.

pub use crate::core::geo::TILE_PIXELS;

/// Most detailed zoom level served by the tile host.
pub const MAX_ZOOM: u8 = 20;

/// Coarsest zoom level served by the tile host; LOD fallback stops here.
pub const MIN_ZOOM: u8 = 11;

/// Wheel zoom factor per unit of vertical scroll delta.
pub const WHEEL_ZOOM_BASE: f64 = 1.001;

/// Radians of rotation per unit of vertical scroll delta in scroll mode.
pub const WHEEL_ROTATE_RATE: f64 = 0.001;

/// Tile host used when no base URL is configured.
pub const DEFAULT_BASE_URL: &str = "https://assets.concept3d.com/assets/1005/1005_Maps/";

/// The default tile-grid anchor, University Center.
pub const DEFAULT_ORIGIN_LAT_LNG: (f64, f64) = (32.877341347399, -117.23531663418);
