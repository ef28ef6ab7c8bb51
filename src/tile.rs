//! Web-Mercator slippy-map tile addressing (EPSG:3857, OSM convention).

use std::f64::consts::PI;

pub const TILE_SIZE: u32 = 256;

/// Fractional tile-space position of a WGS-84 coordinate at a zoom level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileCoord {
    pub x: f64,
    pub y: f64,
}

/// Projects (lat, lng) into fractional tile coordinates.
///
/// Latitudes outside ±85.05° produce extreme y values; callers are expected
/// to stay within inhabited latitudes, so no clamping happens here.
pub fn project(lat: f64, lng: f64, zoom: u8) -> TileCoord {
    let n = 2f64.powi(zoom as i32);
    let lat_rad = lat.to_radians();
    let x = (lng + 180.0) / 360.0 * n;
    let y = (1.0 - ((lat_rad.tan() + 1.0 / lat_rad.cos()).ln()) / PI) / 2.0 * n;
    TileCoord { x, y }
}

impl TileCoord {
    /// Integer address of the tile containing this point.
    pub fn center_tile(&self) -> (i64, i64) {
        (self.x.floor() as i64, self.y.floor() as i64)
    }

    /// Pixel offset of the point within its tile, in [0, 256).
    pub fn pixel_offset(&self) -> (f64, f64) {
        (
            self.x.fract() * TILE_SIZE as f64,
            self.y.fract() * TILE_SIZE as f64,
        )
    }
}

/// Fills a `{z}/{x}/{y}` raster tile URL template.
pub fn tile_url(template: &str, zoom: u8, x: i64, y: i64) -> String {
    template
        .replace("{z}", &zoom.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}
