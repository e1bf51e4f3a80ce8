//! Visible tile enumeration
//!
//! Finds every tile of an infinite square grid whose area overlaps the
//! viewport under an arbitrary scale/rotate/translate view transformation.
//! Tiles that merely touch the viewport boundary are not visible.

use crate::core::geo::{Point, Size, TileCoord};
use crate::core::transform::Transformation;
use serde::{Deserialize, Serialize};

/// Pixel tolerance for boundary contacts and rotation noise
const EPSILON: f64 = 1e-6;

/// Tile address on the server grid, vertical axis counting upwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    pub x: i64,
    pub y: i64,
}

impl TileIndex {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Server coordinate of this tile at an external zoom level
    pub fn at_zoom(&self, zoom: u8) -> TileCoord {
        TileCoord::new(zoom, self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileDescriptor {
    /// Top-left corner in world coordinates, before the view transformation
    pub position: Point,
    /// Local grid column, 0 at the tile containing world `(0, 0)`
    pub column: i64,
    /// Local grid row, increasing with world y
    pub row: i64,
    pub index: TileIndex,
}

/// Tiles of size `tile_size` intersecting a `viewport` seen through
/// `transform`, in row-major order.
///
/// World `(0, 0)` sits at global pixel `origin`, so tile boundaries fall on
/// `k * tile_size - origin mod tile_size`.
pub fn visible_tiles(
    transform: &Transformation,
    viewport: Size,
    tile_size: u32,
    origin: Point,
) -> Vec<TileDescriptor> {
    debug_assert!(tile_size > 0, "tile size must be positive");
    if tile_size == 0 || viewport.is_empty() {
        return Vec::new();
    }

    let size = tile_size as f64;
    let offset = Point::new(origin.x.rem_euclid(size), origin.y.rem_euclid(size));
    let anchor_column = (origin.x / size).floor() as i64;
    let anchor_row = (origin.y / size).floor() as i64;

    let inverse = transform.inverse();
    let (min, max) = viewport
        .corners()
        .iter()
        .map(|corner| inverse.apply(*corner))
        .fold(
            (
                Point::new(f64::INFINITY, f64::INFINITY),
                Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(min, max), p| {
                (
                    Point::new(min.x.min(p.x), min.y.min(p.y)),
                    Point::new(max.x.max(p.x), max.y.max(p.y)),
                )
            },
        );

    let first_column = ((min.x + offset.x) / size).floor() as i64;
    let last_column = ((max.x + offset.x) / size).floor() as i64 + 1;
    let first_row = ((min.y + offset.y) / size).floor() as i64;
    let last_row = ((max.y + offset.y) / size).floor() as i64 + 1;

    let mut tiles = Vec::new();

    for row in first_row..last_row {
        for column in first_column..last_column {
            let position = Point::new(
                column as f64 * size - offset.x,
                row as f64 * size - offset.y,
            );
            if !tile_overlaps(transform, position, size, viewport) {
                continue;
            }
            tiles.push(TileDescriptor {
                position,
                column,
                row,
                index: TileIndex::new(column + anchor_column, -1 - (row + anchor_row)),
            });
        }
    }

    tiles
}

/// Whether the world-space tile at `position` overlaps the viewport with
/// positive area.
///
/// Both shapes are convex, so they overlap exactly when their projections
/// overlap on every edge normal of either shape: the viewport axes and the
/// two tile axes.
fn tile_overlaps(transform: &Transformation, position: Point, size: f64, viewport: Size) -> bool {
    let top_left = transform.apply(position);
    let top_right = transform.apply(Point::new(position.x + size, position.y));
    let top = top_right.subtract(&top_left);
    // No shear and positive determinant: the side edge is the top edge turned
    // a quarter towards +y.
    let side = top.perpendicular();
    let tile = [
        top_left,
        top_right,
        top_right.add(&side),
        top_left.add(&side),
    ];
    let view = viewport.corners();

    let length = top.length();
    if length <= EPSILON {
        return false;
    }
    let along = top.multiply(1.0 / length);
    let axes = [
        Point::new(1.0, 0.0),
        Point::new(0.0, 1.0),
        along,
        along.perpendicular(),
    ];

    axes.iter().all(|axis| {
        let (tile_min, tile_max) = project(&tile, *axis);
        let (view_min, view_max) = project(&view, *axis);
        tile_max.min(view_max) - tile_min.max(view_min) > EPSILON
    })
}

fn project(corners: &[Point; 4], axis: Point) -> (f64, f64) {
    corners
        .iter()
        .map(|p| p.x * axis.x + p.y * axis.y)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), d| {
            (min.min(d), max.max(d))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

    fn grid(tiles: &[TileDescriptor]) -> BTreeSet<(i64, i64)> {
        tiles.iter().map(|t| (t.column, t.row)).collect()
    }

    fn set(cells: &[(i64, i64)]) -> BTreeSet<(i64, i64)> {
        cells.iter().copied().collect()
    }

    fn about_centre(viewport: Size, t: Transformation) -> Transformation {
        let c = viewport.center();
        Transformation::compose([
            Transformation::translate(c),
            t,
            Transformation::translate(c.multiply(-1.0)),
        ])
    }

    #[test]
    fn test_identity_covers_four_tiles() {
        let tiles = visible_tiles(
            &Transformation::IDENTITY,
            Size::new(512.0, 512.0),
            256,
            Point::ZERO,
        );

        assert_eq!(
            grid(&tiles),
            set(&[(0, 0), (1, 0), (0, 1), (1, 1)])
        );
        let indices: Vec<_> = tiles.iter().map(|t| (t.index.x, t.index.y)).collect();
        assert_eq!(indices, vec![(0, -1), (1, -1), (0, -2), (1, -2)]);
        assert_eq!(tiles[3].position, Point::new(256.0, 256.0));
    }

    #[test]
    fn test_quarter_turn_about_centre_keeps_tiles() {
        let viewport = Size::new(512.0, 512.0);
        let upright = visible_tiles(&Transformation::IDENTITY, viewport, 256, Point::ZERO);
        let turned = visible_tiles(
            &about_centre(viewport, Transformation::rotate(FRAC_PI_2)),
            viewport,
            256,
            Point::ZERO,
        );
        assert_eq!(grid(&upright), grid(&turned));

        let back = visible_tiles(
            &about_centre(viewport, Transformation::rotate(-FRAC_PI_2)),
            viewport,
            256,
            Point::ZERO,
        );
        assert_eq!(grid(&upright), grid(&back));
    }

    #[test]
    fn test_eighth_turn_drops_far_corners() {
        let viewport = Size::new(512.0, 512.0);
        let tiles = visible_tiles(
            &about_centre(viewport, Transformation::rotate(FRAC_PI_4)),
            viewport,
            256,
            Point::ZERO,
        );
        let visible = grid(&tiles);

        assert_eq!(visible.len(), 12);
        for corner in [(-1, -1), (2, -1), (-1, 2), (2, 2)] {
            assert!(!visible.contains(&corner), "{:?} should be hidden", corner);
        }
        for edge in [(-1, 0), (0, -1), (2, 1), (1, 2)] {
            assert!(visible.contains(&edge), "{:?} should be visible", edge);
        }
    }

    #[test]
    fn test_edge_crossing_without_corners_inside() {
        // Diamond hanging from (170, -60): none of its corners is inside,
        // its left edge clips the top-right corner of the viewport.
        let transform = Transformation::compose([
            Transformation::translate(Point::new(170.0, -60.0)),
            Transformation::rotate(FRAC_PI_4),
        ]);
        let tiles = visible_tiles(&transform, Size::new(100.0, 100.0), 256, Point::ZERO);
        assert!(grid(&tiles).contains(&(0, 0)));

        // Same diamond moved right clears the viewport
        let transform = Transformation::compose([
            Transformation::translate(Point::new(270.0, -60.0)),
            Transformation::rotate(FRAC_PI_4),
        ]);
        let tiles = visible_tiles(&transform, Size::new(100.0, 100.0), 256, Point::ZERO);
        assert!(!grid(&tiles).contains(&(0, 0)));
    }

    #[test]
    fn test_viewport_inside_single_tile() {
        let tiles = visible_tiles(
            &Transformation::scale(8.0),
            Size::new(512.0, 512.0),
            256,
            Point::ZERO,
        );
        assert_eq!(grid(&tiles), set(&[(0, 0)]));

        // Tile exactly covering the viewport
        let tiles = visible_tiles(
            &Transformation::IDENTITY,
            Size::new(256.0, 256.0),
            256,
            Point::ZERO,
        );
        assert_eq!(grid(&tiles), set(&[(0, 0)]));
    }

    #[test]
    fn test_origin_offset_shifts_grid() {
        let tiles = visible_tiles(
            &Transformation::IDENTITY,
            Size::new(512.0, 512.0),
            256,
            Point::new(300.0, 520.0),
        );

        assert_eq!(tiles.len(), 9);
        assert_eq!(tiles[0].position, Point::new(-44.0, -8.0));
        assert_eq!(tiles[0].index, TileIndex::new(1, -3));
        assert_eq!(tiles[8].position, Point::new(468.0, 504.0));
        assert_eq!(tiles[8].index, TileIndex::new(3, -5));
    }

    #[test]
    fn test_negative_origin_uses_euclidean_offset() {
        let tiles = visible_tiles(
            &Transformation::IDENTITY,
            Size::new(100.0, 100.0),
            256,
            Point::new(-10.0, -10.0),
        );
        // Global pixel (-10, -10) lies in tile (-1, -1), 246 px into it
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0].position, Point::new(-246.0, -246.0));
        assert_eq!(tiles[0].index, TileIndex::new(-1, 0));
    }

    #[test]
    fn test_panned_view() {
        let tiles = visible_tiles(
            &Transformation::translate(Point::new(-128.0, 0.0)),
            Size::new(512.0, 256.0),
            256,
            Point::ZERO,
        );
        assert_eq!(
            grid(&tiles),
            set(&[(0, 0), (1, 0), (2, 0)])
        );
    }

    #[test]
    fn test_empty_viewport() {
        assert!(visible_tiles(
            &Transformation::IDENTITY,
            Size::new(0.0, 300.0),
            256,
            Point::ZERO
        )
        .is_empty());
    }

    #[test]
    fn test_tile_index_at_zoom() {
        let index = TileIndex::new(5, -3);
        assert_eq!(index.at_zoom(20).path(), "20/5/-3");
    }
}
