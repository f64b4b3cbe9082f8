use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Edge length of a map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;
/// Web Mercator is undefined past this latitude.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Geographic rectangle, normalised so `south_west` holds the minima.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Bounds spanned by two opposite corners given in any order.
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    /// World-pixel rectangle `(min_x, min_y, max_x, max_y)` at `zoom`.
    /// North is up, so the north-east corner gives `min_y`.
    pub fn pixel_rect(&self, zoom: f64) -> (f64, f64, f64, f64) {
        let (min_x, max_y) = project(self.south_west, zoom);
        let (max_x, min_y) = project(self.north_east, zoom);
        (min_x, min_y, max_x, max_y)
    }
}

/// Side of the square world in pixels at `zoom`.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Spherical Mercator: geographic position to world pixels, origin at the
/// north-west corner of the world.
pub fn project(p: LatLng, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (p.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

pub fn unproject(x: f64, y: f64, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Column before wrapping; keeps positions continuous across the antimeridian.
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

impl TileCoord {
    /// Column index the tile server knows about.
    pub fn wrapped_x(&self) -> i64 {
        self.x.rem_euclid(1i64 << self.z)
    }

    /// World-pixel position of the tile's top-left corner.
    pub fn origin(&self) -> (f64, f64) {
        (self.x as f64 * TILE_SIZE, self.y as f64 * TILE_SIZE)
    }
}

/// Tiles covering a `view_w x view_h` viewport centred on `center_px`.
pub fn visible_tiles(center_px: (f64, f64), view_w: f64, view_h: f64, zoom: u8) -> Vec<TileCoord> {
    if view_w <= 0.0 || view_h <= 0.0 {
        return Vec::new();
    }

    let rows = 1i64 << zoom;
    let left = center_px.0 - view_w / 2.0;
    let top = center_px.1 - view_h / 2.0;
    let col_start = (left / TILE_SIZE).floor() as i64;
    let col_end = ((left + view_w) / TILE_SIZE).ceil() as i64;
    let row_start = ((top / TILE_SIZE).floor() as i64).max(0);
    let row_end = (((top + view_h) / TILE_SIZE).ceil() as i64).min(rows);

    let mut tiles = Vec::new();
    for y in row_start..row_end {
        for x in col_start..col_end {
            tiles.push(TileCoord { x, y, z: zoom });
        }
    }
    tiles
}

/// Expand a `{s}/{z}/{x}/{y}` URL template for one tile.
pub fn tile_url(template: &str, tile: &TileCoord) -> String {
    const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
    let x = tile.wrapped_x();
    let subdomain = SUBDOMAINS[(x + tile.y).rem_euclid(SUBDOMAINS.len() as i64) as usize];
    template
        .replace("{s}", subdomain)
        .replace("{z}", &tile.z.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &tile.y.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, eps: f64) {
        let diff = (actual - expected).abs();
        assert!(
            diff < eps,
            "expected {expected}, got {actual} (diff: {diff})"
        );
    }

    #[test]
    fn origin_projects_to_world_center() {
        let (x, y) = project(LatLng::new(0.0, 0.0), 0.0);
        assert_close(x, 128.0, 1e-9);
        assert_close(y, 128.0, 1e-9);
    }

    #[test]
    fn projection_roundtrips() {
        let p = LatLng::new(32.3639162876347, 47.55944494696195);
        for zoom in [0.0, 5.0, 13.0, 18.0] {
            let (x, y) = project(p, zoom);
            let back = unproject(x, y, zoom);
            assert_close(back.lat, p.lat, 1e-9);
            assert_close(back.lng, p.lng, 1e-9);
        }
    }

    #[test]
    fn polar_latitudes_are_clamped() {
        let (_, top) = project(LatLng::new(90.0, 0.0), 1.0);
        let (_, bottom) = project(LatLng::new(-90.0, 0.0), 1.0);
        assert_close(top, 0.0, 1e-6);
        assert_close(bottom, world_size(1.0), 1e-6);
    }

    #[test]
    fn bounds_normalise_corner_order() {
        let a = LatLng::new(32.40922772144021, 47.55944494696195);
        let b = LatLng::new(32.3639162876347, 47.60558379809906);
        let bounds = LatLngBounds::from_corners(a, b);
        assert_eq!(bounds.south_west, LatLng::new(32.3639162876347, 47.55944494696195));
        assert_eq!(bounds.north_east, LatLng::new(32.40922772144021, 47.60558379809906));
        assert_eq!(
            bounds.center(),
            LatLng::new(
                (32.3639162876347 + 32.40922772144021) / 2.0,
                (47.55944494696195 + 47.60558379809906) / 2.0
            )
        );
    }

    #[test]
    fn pixel_rect_is_north_up() {
        let bounds = LatLngBounds::from_corners(LatLng::new(10.0, 10.0), LatLng::new(20.0, 30.0));
        let (min_x, min_y, max_x, max_y) = bounds.pixel_rect(4.0);
        assert!(min_x < max_x);
        assert!(min_y < max_y);
        let (_, north_y) = project(LatLng::new(20.0, 10.0), 4.0);
        assert_close(min_y, north_y, 1e-9);
    }

    #[test]
    fn visible_tiles_cover_the_viewport() {
        let tiles = visible_tiles((512.0, 512.0), 512.0, 256.0, 2);
        let cells: Vec<_> = tiles.iter().map(|t| (t.x, t.y)).collect();
        assert_eq!(cells, vec![(1, 1), (2, 1), (1, 2), (2, 2)]);

        let offset = visible_tiles((500.0, 500.0), 512.0, 256.0, 2);
        assert_eq!(offset.len(), 3 * 2);
    }

    #[test]
    fn rows_outside_the_world_are_skipped() {
        let tiles = visible_tiles((128.0, 0.0), 256.0, 256.0, 0);
        assert!(tiles.iter().all(|t| t.y == 0));
        assert!(visible_tiles((0.0, 0.0), 0.0, 100.0, 3).is_empty());
    }

    #[test]
    fn columns_wrap_for_urls() {
        let tile = TileCoord { x: -1, y: 0, z: 2 };
        assert_eq!(tile.wrapped_x(), 3);
        assert_eq!(tile.origin(), (-256.0, 0.0));
    }

    #[test]
    fn tile_url_fills_template() {
        let template = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
        let url = tile_url(template, &TileCoord { x: 5, y: 3, z: 13 });
        assert_eq!(url, "https://c.tile.openstreetmap.org/13/5/3.png");
        let wrapped = tile_url(template, &TileCoord { x: -1, y: 0, z: 1 });
        assert_eq!(wrapped, "https://b.tile.openstreetmap.org/1/1/0.png");
    }

    #[test]
    fn bounds_serialize_with_named_corners() {
        let bounds = LatLngBounds::from_corners(LatLng::new(2.0, 3.0), LatLng::new(1.0, 4.0));
        let json = serde_json::to_value(bounds).expect("serializable");
        assert_eq!(
            json,
            serde_json::json!({
                "south_west": { "lat": 1.0, "lng": 3.0 },
                "north_east": { "lat": 2.0, "lng": 4.0 },
            })
        );
    }
}
