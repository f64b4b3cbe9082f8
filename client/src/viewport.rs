use hexmap_shared::geo::{self, LatLng, LatLngBounds};

pub const MIN_ZOOM: u8 = 2;
pub const MAX_ZOOM: u8 = 18;

/// Map camera: a geographic centre and an integer zoom level.
/// Screen coordinates are relative to the top-left of the map element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

/// Axis-aligned rectangle in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl MapView {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }

    /// World-pixel position of the centre at the current zoom.
    pub fn center_px(&self) -> (f64, f64) {
        geo::project(self.center, self.zoom as f64)
    }

    /// Convert world pixels to screen coordinates for a `view` sized element.
    pub fn world_to_screen(&self, wx: f64, wy: f64, view: (f64, f64)) -> (f64, f64) {
        let (cx, cy) = self.center_px();
        (wx - cx + view.0 / 2.0, wy - cy + view.1 / 2.0)
    }

    /// Pan by screen-space delta; content follows the pointer.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let (cx, cy) = self.center_px();
        let size = geo::world_size(self.zoom as f64);
        let y = (cy - dy).clamp(0.0, size);
        let mut center = geo::unproject(cx - dx, y, self.zoom as f64);
        center.lng = (center.lng + 180.0).rem_euclid(360.0) - 180.0;
        self.center = center;
    }

    /// Step the zoom level, keeping the centre fixed. Returns whether it changed.
    pub fn zoom_by(&mut self, delta: i8) -> bool {
        let next = (self.zoom as i16 + delta as i16).clamp(MIN_ZOOM as i16, MAX_ZOOM as i16) as u8;
        let changed = next != self.zoom;
        self.zoom = next;
        changed
    }

    /// Screen rectangle covered by geographic `bounds`.
    pub fn overlay_rect(&self, bounds: &LatLngBounds, view: (f64, f64)) -> ScreenRect {
        let (min_x, min_y, max_x, max_y) = bounds.pixel_rect(self.zoom as f64);
        let (left, top) = self.world_to_screen(min_x, min_y, view);
        ScreenRect {
            left,
            top,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}
