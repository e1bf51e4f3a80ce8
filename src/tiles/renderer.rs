//! Tile compositing with level-of-detail fallback
//!
//! Each render pass picks the zoom level matching the current scale, draws
//! every visible tile that is already cached and, for the ones still
//! streaming in, borrows the matching quarter of a coarser ancestor.

use super::cache::ImageCache;
use super::loader::ImageFetcher;
use super::visibility::{visible_tiles, TileDescriptor};
use crate::core::config::ViewerConfig;
use crate::core::geo::{Point, Rect, Size, TILE_PIXELS};
use crate::core::transform::Transformation;
use crate::rendering::{TileCanvas, TileImage};
use serde::{Deserialize, Serialize};

/// Largest zoom step whose tile side still fits in a `u32`
pub const MAX_VIEW_STEP: u8 = 23;

/// Outcome of one render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RenderStats {
    /// Tiles drawn from their own image
    pub exact: usize,
    /// Tiles drawn from a cropped ancestor
    pub fallback: usize,
    /// Tiles with nothing to draw yet
    pub blank: usize,
}

impl RenderStats {
    pub fn visible(&self) -> usize {
        self.exact + self.fallback + self.blank
    }

    /// Whether every visible tile was drawn at full resolution
    pub fn is_complete(&self) -> bool {
        self.fallback == 0 && self.blank == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileRenderer {
    min_zoom: u8,
    max_zoom: u8,
    high_quality: bool,
}

impl TileRenderer {
    pub fn new(min_zoom: u8, max_zoom: u8, high_quality: bool) -> Self {
        Self {
            min_zoom: min_zoom.min(max_zoom),
            max_zoom,
            high_quality,
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        Self::new(config.min_zoom, config.max_zoom, config.high_quality)
    }

    /// Zoom step the view scale calls for, 0 at the most detailed level.
    ///
    /// Each step halves the scale at which tiles are shown, so it is chosen
    /// from `sqrt(det)`. It keeps growing past the coarsest server level so
    /// tiles stay roughly 256 px on screen; `None` once the tile side would
    /// no longer fit a `u32`.
    pub fn view_step(transform: &Transformation) -> Option<u8> {
        let steps = (-transform.determinant().log2() / 2.0).floor();
        if steps.is_nan() || steps <= 0.0 {
            Some(0)
        } else if steps <= MAX_VIEW_STEP as f64 {
            Some(steps as u8)
        } else {
            None
        }
    }

    /// Internal zoom step for a view, clamped to the levels the server has
    pub fn internal_zoom(&self, transform: &Transformation) -> u8 {
        Self::view_step(transform)
            .unwrap_or(MAX_VIEW_STEP)
            .min(self.levels())
    }

    fn levels(&self) -> u8 {
        self.max_zoom - self.min_zoom
    }

    /// Server zoom level requested for an internal zoom step
    pub fn external_zoom(&self, internal: u8) -> u8 {
        self.max_zoom - internal
    }

    /// World-space side of a tile at a zoom step
    pub fn tile_size(internal: u8) -> u32 {
        TILE_PIXELS << internal
    }

    /// Draws the tiles covering `viewport` onto `canvas`, requesting missing
    /// images from `cache`.
    ///
    /// `origin` is the global pixel world `(0, 0)` is anchored to.
    pub fn render<F, C>(
        &self,
        canvas: &mut C,
        cache: &mut ImageCache<F>,
        transform: &Transformation,
        viewport: Size,
        device_pixel_ratio: f64,
        origin: Point,
    ) -> RenderStats
    where
        F: ImageFetcher,
        F::Image: TileImage,
        C: TileCanvas<F::Image>,
    {
        canvas.save();
        if self.high_quality {
            canvas.scale(device_pixel_ratio);
        }
        canvas.clear(viewport);
        canvas.transform(transform.to_device_matrix());

        let mut stats = RenderStats::default();
        let Some(step) = Self::view_step(transform) else {
            log::debug!("view scale out of range, nothing to draw");
            canvas.restore();
            return stats;
        };
        let tile_size = Self::tile_size(step);
        let tiles = visible_tiles(transform, viewport, tile_size, origin);

        if step > self.levels() {
            // Coarser than anything the server has
            stats.blank = tiles.len();
            canvas.restore();
            log::debug!(
                "zoomed out past level {}: {} blank",
                self.min_zoom,
                stats.blank
            );
            return stats;
        }

        let zoom = self.external_zoom(step);
        for tile in tiles {
            let dest = Rect::square(tile.position, tile_size as f64);
            let path = tile.index.at_zoom(zoom).path();

            if let Some(image) = cache.request(&path) {
                canvas.draw_image(&image, dest);
                stats.exact += 1;
            } else if self.draw_ancestor(canvas, cache, &tile, zoom, dest) {
                stats.fallback += 1;
            } else {
                stats.blank += 1;
            }
        }

        canvas.restore();
        log::debug!(
            "rendered zoom {}: {} exact, {} fallback, {} blank",
            zoom,
            stats.exact,
            stats.fallback,
            stats.blank
        );
        stats
    }

    /// Looks for the nearest cached ancestor of a missing tile and draws the
    /// part of it the tile covers. Never starts a load.
    fn draw_ancestor<F, C>(
        &self,
        canvas: &mut C,
        cache: &ImageCache<F>,
        tile: &TileDescriptor,
        zoom: u8,
        dest: Rect,
    ) -> bool
    where
        F: ImageFetcher,
        F::Image: TileImage,
        C: TileCanvas<F::Image>,
    {
        let mut coord = tile.index.at_zoom(zoom);
        // Region of the current image covered by the tile, in 0..1 units
        let mut crop = Rect::new(0.0, 0.0, 1.0, 1.0);

        while coord.zoom > self.min_zoom {
            let Some(parent) = coord.parent() else {
                break;
            };
            let (dx, dy) = coord.quadrant();
            crop = Rect::new(
                (dx as f64 + crop.x) / 2.0,
                (dy as f64 + crop.y) / 2.0,
                crop.width / 2.0,
                crop.height / 2.0,
            );
            coord = parent;

            if let Some(image) = cache.get(&coord.path()) {
                let source = crop.scale(image.width() as f64, image.height() as f64);
                canvas.draw_image_cropped(&image, source, dest);
                return true;
            }
        }

        false
    }
}

impl Default for TileRenderer {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}
