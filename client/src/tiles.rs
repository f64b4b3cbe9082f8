use hexmap_shared::geo::{self, TILE_SIZE, TileCoord};
use leptos::prelude::*;

use crate::app::ViewSize;
use crate::config::MapConfig;
use crate::viewport::MapView;

/// Slippy-map basemap: one absolutely positioned `<img>` per visible tile.
/// Failed tiles stay blank; nothing is retried.
#[component]
pub fn TileLayer() -> impl IntoView {
    let config: MapConfig = expect_context();
    let viewport: RwSignal<MapView> = expect_context();
    let ViewSize(view_size) = expect_context();
    let template = config.tile_url;

    let visible = Memo::new(move |_| {
        let vp = viewport.get();
        let (w, h) = view_size.get();
        geo::visible_tiles(vp.center_px(), w, h, vp.zoom)
    });

    view! {
        <div class="tile-layer" style="position: absolute; inset: 0; z-index: 1; pointer-events: none;">
            <For
                each=move || visible.get()
                key=|tile| *tile
                children=move |tile: TileCoord| {
                    let src = geo::tile_url(&template, &tile);
                    let (ox, oy) = tile.origin();
                    let position = move || {
                        let (sx, sy) = viewport.get().world_to_screen(ox, oy, view_size.get());
                        format!(
                            "position: absolute; left: {sx:.2}px; top: {sy:.2}px; width: {TILE_SIZE}px; height: {TILE_SIZE}px; user-select: none;"
                        )
                    };
                    view! { <img src=src alt="" draggable="false" style=position /> }
                }
            />
        </div>
    }
}
