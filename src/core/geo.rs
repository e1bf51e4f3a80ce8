use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Number of pixels spanned by one tile image edge at every zoom level.
pub const TILE_PIXELS: u32 = 256;

/// Represents a geographical coordinate with latitude and longitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Projects to global pixel space, see [`lat_long_to_pixel`].
    pub fn to_pixel(&self, max_zoom: u8) -> Point {
        lat_long_to_pixel(self.lat, self.lng, max_zoom)
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Projects a latitude/longitude pair to global pixel coordinates at the most
/// detailed zoom level.
///
/// The scale is `S = 2^(7 + max_zoom)`, so the whole world spans `2S` pixels
/// horizontally. `y` grows southwards and is negative for every valid
/// latitude.
pub fn lat_long_to_pixel(latitude: f64, longitude: f64, max_zoom: u8) -> Point {
    let scale = 2_f64.powi(7 + max_zoom as i32);
    Point::new(
        scale * (longitude / 180.0 + 1.0),
        -scale * ((PI / 4.0 + latitude * PI / 360.0).tan().ln() / PI + 1.0),
    )
}

/// Represents a point in screen, world or projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        self.subtract(other).length()
    }

    /// Euclidean length of the point seen as a vector
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Angle of the vector from the positive x axis, in radians
    pub fn angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        self.add(other).multiply(0.5)
    }

    /// The vector rotated by a quarter turn from +x towards +y
    pub fn perpendicular(&self) -> Point {
        Point::new(-self.y, self.x)
    }

    pub fn floor(&self) -> Point {
        Point::new(self.x.floor(), self.y.floor())
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::ZERO
    }
}

/// Width and height of a viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Corners of the rectangle spanning `(0, 0)` to `(width, height)`
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::ZERO,
            Point::new(self.width, 0.0),
            Point::new(self.width, self.height),
            Point::new(0.0, self.height),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle given by its top-left corner and its size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// A square whose top-left corner sits at `origin`
    pub fn square(origin: Point, side: f64) -> Self {
        Self::new(origin.x, origin.y, side, side)
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    /// Scales every component, used to map normalized crops to pixels
    pub fn scale(&self, sx: f64, sy: f64) -> Rect {
        Rect::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }
}

/// Address of a tile image on the tile server
///
/// `zoom` is the externally requested zoom level (higher means more detail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub zoom: u8,
    pub x: i64,
    pub y: i64,
}

impl TileCoord {
    pub fn new(zoom: u8, x: i64, y: i64) -> Self {
        Self { zoom, x, y }
    }

    /// Cache key and URL suffix, `zoom/x/y`
    pub fn path(&self) -> String {
        format!("{}/{}/{}", self.zoom, self.x, self.y)
    }

    /// Gets the tile covering this one at the next coarser zoom level
    pub fn parent(&self) -> Option<TileCoord> {
        if self.zoom == 0 {
            None
        } else {
            Some(TileCoord::new(
                self.zoom - 1,
                self.x.div_euclid(2),
                self.y.div_euclid(2),
            ))
        }
    }

    /// Which quarter of the parent image this tile occupies.
    ///
    /// Tile rows count upwards, so an odd `y` is the upper half of its parent.
    pub fn quadrant(&self) -> (i64, i64) {
        (self.x.rem_euclid(2), 1 - self.y.rem_euclid(2))
    }
}
