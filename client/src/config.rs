use gloo_storage::Storage;
use hexmap_shared::{LatLng, LatLngBounds};
use serde::{Deserialize, Serialize};

use crate::viewport::{MAX_ZOOM, MIN_ZOOM};

pub const CONFIG_STORAGE_KEY: &str = "hexmap_config";

pub const DEFAULT_OVERLAY_URL: &str = "https://fazayesh-indicators-bucket.s3.ir-thr-at1.arvanstorage.ir/ndvi/file_56a94fdc-f9df-4d1a-89e0-00721534b509.png";
pub const DEFAULT_CENTER: LatLng = LatLng::new(32.3639162876347, 47.55944494696195);
pub const DEFAULT_OVERLAY_CORNERS: [LatLng; 2] = [
    LatLng::new(32.3639162876347, 47.55944494696195),
    LatLng::new(32.40922772144021, 47.60558379809906),
];
pub const DEFAULT_ZOOM: u8 = 13;
pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION_HTML: &str = r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;
pub const DEFAULT_HOVER_DEBOUNCE_MS: u32 = 10;

/// Map and overlay settings. Compiled-in defaults, optionally overridden by a
/// JSON object stored under [`CONFIG_STORAGE_KEY`]; missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub overlay_url: String,
    pub overlay_corners: [LatLng; 2],
    pub center: LatLng,
    pub zoom: u8,
    pub tile_url: String,
    pub hover_debounce_ms: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            overlay_url: DEFAULT_OVERLAY_URL.to_string(),
            overlay_corners: DEFAULT_OVERLAY_CORNERS,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_url: DEFAULT_TILE_URL.to_string(),
            hover_debounce_ms: DEFAULT_HOVER_DEBOUNCE_MS,
        }
    }
}

impl MapConfig {
    pub fn load() -> Self {
        match gloo_storage::LocalStorage::get::<MapConfig>(CONFIG_STORAGE_KEY) {
            Ok(config) => config.sanitized(),
            Err(gloo_storage::errors::StorageError::KeyNotFound(_)) => Self::default(),
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("Ignoring stored map config ({CONFIG_STORAGE_KEY}): {e}").into(),
                );
                Self::default()
            }
        }
    }

    pub fn overlay_bounds(&self) -> LatLngBounds {
        let [a, b] = self.overlay_corners;
        LatLngBounds::from_corners(a, b)
    }

    /// Clamp values the map cannot honour.
    pub fn sanitized(mut self) -> Self {
        self.zoom = self.zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if self.hover_debounce_ms == 0 {
            self.hover_debounce_ms = DEFAULT_HOVER_DEBOUNCE_MS;
        }
        if self.overlay_url.trim().is_empty() {
            self.overlay_url = DEFAULT_OVERLAY_URL.to_string();
        }
        if self.tile_url.trim().is_empty() {
            self.tile_url = DEFAULT_TILE_URL.to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: MapConfig =
            serde_json::from_str(r#"{"zoom": 11, "hover_debounce_ms": 40}"#).expect("valid json");
        assert_eq!(config.zoom, 11);
        assert_eq!(config.hover_debounce_ms, 40);
        assert_eq!(config.overlay_url, DEFAULT_OVERLAY_URL);
        assert_eq!(config.center, DEFAULT_CENTER);
    }

    #[test]
    fn corners_parse_as_objects() {
        let config: MapConfig = serde_json::from_str(
            r#"{"overlay_corners": [{"lat": 1.0, "lng": 2.0}, {"lat": -1.0, "lng": 4.0}]}"#,
        )
        .expect("valid json");
        let bounds = config.overlay_bounds();
        assert_eq!(bounds.south_west, LatLng::new(-1.0, 2.0));
        assert_eq!(bounds.north_east, LatLng::new(1.0, 4.0));
    }

    #[test]
    fn sanitized_clamps_and_restores() {
        let config = MapConfig {
            zoom: 40,
            hover_debounce_ms: 0,
            tile_url: "  ".into(),
            ..MapConfig::default()
        }
        .sanitized();
        assert_eq!(config.zoom, MAX_ZOOM);
        assert_eq!(config.hover_debounce_ms, DEFAULT_HOVER_DEBOUNCE_MS);
        assert_eq!(config.tile_url, DEFAULT_TILE_URL);
    }

    #[test]
    fn default_bounds_match_the_overlay_corners() {
        let bounds = MapConfig::default().overlay_bounds();
        assert_eq!(bounds.south_west, DEFAULT_OVERLAY_CORNERS[0]);
        assert_eq!(bounds.north_east, DEFAULT_OVERLAY_CORNERS[1]);
    }
}
