use std::cell::{Cell, RefCell};
use std::rc::Rc;

use hexmap_shared::ColorValue;
use hexmap_shared::colors::readable_text_color;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::PointerEvent;

use crate::colors::rgba_css;
use crate::config::{MapConfig, TILE_ATTRIBUTION_HTML};
use crate::overlay::ImageOverlay;
use crate::tiles::TileLayer;
use crate::viewport::MapView;

/// Pointer travel before a press turns into a pan instead of a click.
const DRAG_THRESHOLD_PX: f64 = 5.0;
/// Tooltip sits this far below the cursor.
const TOOLTIP_OFFSET_Y: f64 = 45.0;

pub(crate) fn canvas_dimensions() -> (f64, f64) {
    let Some(window) = web_sys::window() else {
        return (1200.0, 800.0);
    };
    let w = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(1200.0);
    let h = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0);
    (w, h)
}

struct ResizeBinding {
    window: web_sys::Window,
    handler: wasm_bindgen::closure::Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn unbind_resize() {
    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback("resize", old.handler.as_ref().unchecked_ref());
        }
    });
}

/// Newtype wrappers so same-typed signals get distinct Leptos contexts.
#[derive(Clone, Copy)]
pub(crate) struct ViewSize(pub RwSignal<(f64, f64)>);
/// Last successfully sampled overlay color; failed samples never touch it.
#[derive(Clone, Copy)]
pub(crate) struct SampledColor(pub RwSignal<Option<ColorValue>>);
#[derive(Clone, Copy)]
pub(crate) struct OverlayHover(pub RwSignal<bool>);
/// Set once the current press has turned into a pan.
#[derive(Clone, Copy)]
pub(crate) struct Panned(pub RwSignal<bool>);

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App() -> impl IntoView {
    let config = MapConfig::load();

    let viewport: RwSignal<MapView> = RwSignal::new(MapView::new(config.center, config.zoom));
    let view_size: RwSignal<(f64, f64)> = RwSignal::new(canvas_dimensions());
    let sampled: RwSignal<Option<ColorValue>> = RwSignal::new(None);
    let hovering: RwSignal<bool> = RwSignal::new(false);
    let panned: RwSignal<bool> = RwSignal::new(false);
    let mouse_pos: RwSignal<(f64, f64)> = RwSignal::new((0.0, 0.0));

    provide_context(config);
    provide_context(viewport);
    provide_context(ViewSize(view_size));
    provide_context(SampledColor(sampled));
    provide_context(OverlayHover(hovering));
    provide_context(Panned(panned));
    provide_context(mouse_pos);

    // Track window size; the map fills the viewport.
    Effect::new(move || {
        let Some(window) = web_sys::window() else {
            return;
        };
        unbind_resize();

        let handler = wasm_bindgen::closure::Closure::<dyn Fn()>::new(move || {
            view_size.set(canvas_dimensions());
        });
        if window
            .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
            .is_err()
        {
            return;
        }
        RESIZE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ResizeBinding {
                window: window.clone(),
                handler,
            });
        });
        on_cleanup(unbind_resize);
    });

    view! {
        <MapContainer />
        <ColorTooltip />
    }
}

/// Pannable map surface holding the basemap, the overlay and the controls.
/// Scroll-wheel zoom is deliberately not bound; zoom goes through the buttons.
#[component]
fn MapContainer() -> impl IntoView {
    let viewport: RwSignal<MapView> = expect_context();
    let Panned(panned) = expect_context();

    let press_origin: Rc<Cell<Option<(f64, f64)>>> = Rc::new(Cell::new(None));
    let last = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let is_dragging = Rc::new(Cell::new(false));

    let on_pointer_down = {
        let press_origin = press_origin.clone();
        let last = last.clone();
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            if e.button() != 0 {
                return;
            }
            let pos = (e.client_x() as f64, e.client_y() as f64);
            press_origin.set(Some(pos));
            last.set(pos);
            is_dragging.set(false);
            panned.set(false);
        }
    };

    let on_pointer_move = {
        let press_origin = press_origin.clone();
        let last = last.clone();
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            let Some((start_x, start_y)) = press_origin.get() else {
                return;
            };
            let (x, y) = (e.client_x() as f64, e.client_y() as f64);

            if !is_dragging.get() {
                if (x - start_x).abs() < DRAG_THRESHOLD_PX && (y - start_y).abs() < DRAG_THRESHOLD_PX {
                    return;
                }
                is_dragging.set(true);
                panned.set(true);
                // Capture only once panning, so plain clicks still reach the overlay.
                if let Some(target) = e.current_target()
                    && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
                {
                    el.set_pointer_capture(e.pointer_id()).ok();
                    el.style().set_property("cursor", "grabbing").ok();
                }
            }

            let (last_x, last_y) = last.get();
            last.set((x, y));
            viewport.update(|vp| vp.pan(x - last_x, y - last_y));
        }
    };

    let on_pointer_up = {
        let press_origin = press_origin.clone();
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            press_origin.set(None);
            if is_dragging.replace(false)
                && let Some(target) = e.current_target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    view! {
        <div
            class="map-container"
            style="position: fixed; inset: 0; overflow: hidden; background: #dde1e6; cursor: grab; touch-action: none;"
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up.clone()
            on:pointercancel=on_pointer_up
        >
            <TileLayer />
            <ImageOverlay />
            <ZoomControls />
            <div
                class="map-attribution"
                style="position: absolute; right: 0; bottom: 0; z-index: 5; padding: 2px 6px; background: rgba(255,255,255,0.8); font: 11px 'Inter', system-ui, sans-serif; color: #333;"
                inner_html=TILE_ATTRIBUTION_HTML
            />
        </div>
    }
}

#[component]
fn ZoomControls() -> impl IntoView {
    let viewport: RwSignal<MapView> = expect_context();
    let button_style = "display: block; width: 30px; height: 30px; border: none; background: #fff; color: #222; font: bold 18px/30px system-ui, sans-serif; cursor: pointer;";

    view! {
        <div
            class="zoom-controls"
            style="position: absolute; top: 12px; left: 12px; z-index: 5; border: 2px solid rgba(0,0,0,0.2); border-radius: 4px; overflow: hidden;"
            on:pointerdown=|e: PointerEvent| e.stop_propagation()
        >
            <button
                title="Zoom in"
                style=button_style
                on:click=move |_| {
                    viewport.update(|vp| {
                        vp.zoom_by(1);
                    })
                }
            >
                "+"
            </button>
            <button
                title="Zoom out"
                style=format!("{button_style} border-top: 1px solid #ccc;")
                on:click=move |_| {
                    viewport.update(|vp| {
                        vp.zoom_by(-1);
                    })
                }
            >
                "\u{2212}"
            </button>
        </div>
    }
}

/// Tooltip text: the hex of the last sample, or a placeholder before one exists.
pub(crate) fn tooltip_label(color: Option<ColorValue>) -> String {
    color.map(ColorValue::to_hex).unwrap_or_else(|| "no sample".to_string())
}

/// Sticky tooltip under the cursor while it is over the overlay.
#[component]
fn ColorTooltip() -> impl IntoView {
    let SampledColor(sampled) = expect_context();
    let OverlayHover(hovering) = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();

    view! {
        {move || {
            if !hovering.get() {
                return view! { <div style="display:none;" /> }.into_any();
            }
            let (x, y) = mouse_pos.get();
            let color = sampled.get();
            let label = tooltip_label(color);
            let (swatch, text) = match color {
                Some(c) => {
                    let (tr, tg, tb) = readable_text_color(c);
                    (rgba_css(c.r, c.g, c.b, 1.0), rgba_css(tr, tg, tb, 1.0))
                }
                None => ("#161921".to_string(), "#9a9590".to_string()),
            };
            view! {
                <div
                    class="color-tooltip"
                    style=format!(
                        "position: fixed; left: {x}px; top: {}px; transform: translateX(-50%); pointer-events: none; z-index: 100; background: #161921; border: 1px solid #282c3e; border-radius: 6px; box-shadow: 0 4px 16px rgba(0,0,0,0.5); padding: 4px; display: flex; align-items: center; gap: 6px;",
                        y + TOOLTIP_OFFSET_Y,
                    )
                >
                    <div style={format!("width: 14px; height: 14px; border-radius: 3px; border: 1px solid rgba(255,255,255,0.15); background: {swatch};")} />
                    <span style={format!("font: 0.78rem 'JetBrains Mono', monospace; color: {text}; background: {swatch}; padding: 1px 5px; border-radius: 3px;")}>
                        {label}
                    </span>
                </div>
            }
            .into_any()
        }}
    }
}
