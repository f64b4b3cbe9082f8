use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use hexmap_shared::{
    ColorProbe, ColorValue, PixelCoord, PixelSource, SampleError, SampleSink, ScheduledTask,
    Scheduler, rescale,
};
use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent};

use crate::app::{OverlayHover, Panned, SampledColor, ViewSize};
use crate::config::MapConfig;
use crate::viewport::{MapView, ScreenRect};

/// An overlay `<img>` that finished loading, readable pixel by pixel.
///
/// Pixels are addressed in the element's rendered size, the same space as
/// pointer `offsetX`/`offsetY`. Reads go to a copy of the image kept at its
/// natural size, so memory does not grow with the zoom level.
#[derive(Clone)]
pub struct OverlayImage {
    image: HtmlImageElement,
    pixels: CanvasRenderingContext2d,
    natural: (u32, u32),
}

impl OverlayImage {
    /// Checked once when the overlay reports it is ready.
    pub fn from_element(image: HtmlImageElement) -> Result<Self, SampleError> {
        let natural = (image.natural_width(), image.natural_height());
        if !image.complete() || natural.0 == 0 || natural.1 == 0 {
            return Err(SampleError::unavailable(
                "overlay image has not finished loading",
            ));
        }
        let pixels = offscreen_context(natural.0, natural.1)?;
        pixels
            .draw_image_with_html_image_element(&image, 0.0, 0.0)
            .map_err(|e| js_unavailable("drawImage", e))?;
        Ok(Self {
            image,
            pixels,
            natural,
        })
    }
}

impl PixelSource for OverlayImage {
    fn dimensions(&self) -> Result<(u32, u32), SampleError> {
        let (width, height) = (self.image.width(), self.image.height());
        if width == 0 || height == 0 {
            return Err(SampleError::unavailable("overlay image is not laid out"));
        }
        Ok((width, height))
    }

    fn read_rgba(&self, x: u32, y: u32) -> Result<[u8; 4], SampleError> {
        let rendered = self.dimensions()?;
        let (nx, ny) = rescale(x, y, rendered, self.natural);
        // Throws a SecurityError on a canvas tainted by a cross-origin image.
        let pixel = self
            .pixels
            .get_image_data(nx as f64, ny as f64, 1.0, 1.0)
            .map_err(|e| js_unavailable("getImageData", e))?
            .data();
        match pixel.0.as_slice() {
            [r, g, b, a, ..] => Ok([*r, *g, *b, *a]),
            _ => Err(SampleError::unavailable("getImageData returned no pixel")),
        }
    }
}

fn offscreen_context(width: u32, height: u32) -> Result<CanvasRenderingContext2d, SampleError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| SampleError::unavailable("no document"))?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| js_unavailable("createElement", e))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| SampleError::unavailable("created element is not a canvas"))?;
    canvas.set_width(width);
    canvas.set_height(height);
    canvas
        .get_context("2d")
        .map_err(|e| js_unavailable("getContext", e))?
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
        .ok_or_else(|| SampleError::unavailable("2d canvas context unavailable"))
}

fn js_unavailable(op: &str, err: JsValue) -> SampleError {
    SampleError::unavailable(format!("{op} failed: {err:?}"))
}

/// Browser `setTimeout` via gloo.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeoutScheduler;

pub struct PendingTimeout(Timeout);

impl ScheduledTask for PendingTimeout {
    fn cancel(self) {
        self.0.cancel();
    }
}

impl Scheduler for TimeoutScheduler {
    type Handle = PendingTimeout;

    fn schedule(&self, delay_ms: u32, task: Box<dyn FnOnce()>) -> PendingTimeout {
        PendingTimeout(Timeout::new(delay_ms, task))
    }
}

/// Writes successful samples into the signal the tooltip renders.
struct TooltipSink {
    color: RwSignal<Option<ColorValue>>,
}

impl SampleSink for TooltipSink {
    fn publish(&self, color: ColorValue) {
        self.color.set(Some(color));
    }

    fn decline(&self, coord: PixelCoord, err: &SampleError) {
        web_sys::console::debug_1(
            &format!("color sample at ({}, {}) skipped: {err}", coord.x, coord.y).into(),
        );
    }
}

/// Pixel offset of a pointer event relative to the element it hit.
pub fn event_coord(e: &MouseEvent) -> PixelCoord {
    PixelCoord::new(e.offset_x(), e.offset_y())
}

pub fn rect_style(rect: &ScreenRect) -> String {
    format!(
        "left: {:.2}px; top: {:.2}px; width: {:.2}px; height: {:.2}px;",
        rect.left, rect.top, rect.width, rect.height
    )
}

type OverlayProbe = ColorProbe<OverlayImage, TimeoutScheduler>;

thread_local! {
    static OVERLAY_PROBE: RefCell<Option<Rc<OverlayProbe>>> = const { RefCell::new(None) };
}

/// Listener closures outlive the view on the JS side, so dropping them cannot
/// be relied on to stop a pending hover sample.
fn release_probe() {
    let probe = OVERLAY_PROBE.with(|slot| slot.borrow_mut().take());
    if let Some(probe) = probe {
        probe.cancel_pending();
    }
}

/// Georeferenced raster overlay with color picking.
///
/// Unmounting cancels any pending hover sample.
#[component]
pub fn ImageOverlay() -> impl IntoView {
    let config: MapConfig = expect_context();
    let viewport: RwSignal<MapView> = expect_context();
    let ViewSize(view_size) = expect_context();
    let SampledColor(sampled) = expect_context();
    let OverlayHover(hovering) = expect_context();
    let Panned(panned) = expect_context();
    let mouse_pos: RwSignal<(f64, f64)> = expect_context();

    let bounds = config.overlay_bounds();
    let overlay_url = config.overlay_url.clone();
    let img_ref = NodeRef::<leptos::html::Img>::new();

    let probe: Rc<OverlayProbe> = Rc::new(ColorProbe::new(
        TimeoutScheduler,
        config.hover_debounce_ms,
        TooltipSink { color: sampled },
    ));
    release_probe();
    OVERLAY_PROBE.with(|slot| *slot.borrow_mut() = Some(Rc::clone(&probe)));
    on_cleanup(release_probe);

    let rect = Memo::new(move |_| viewport.get().overlay_rect(&bounds, view_size.get()));

    let on_load = {
        let probe = Rc::clone(&probe);
        move |_: web_sys::Event| {
            let Some(image) = img_ref.get_untracked() else {
                return;
            };
            let probe = Rc::clone(&probe);
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = JsFuture::from(image.decode()).await {
                    web_sys::console::warn_1(
                        &format!("Overlay image failed to decode: {err:?}").into(),
                    );
                }
                match OverlayImage::from_element(image) {
                    Ok(overlay) => probe.attach(overlay),
                    Err(e) => {
                        web_sys::console::warn_1(&format!("Overlay not sampleable: {e}").into());
                        probe.detach(e.to_string());
                    }
                }
            });
        }
    };

    let on_error = {
        let probe = Rc::clone(&probe);
        let overlay_url = overlay_url.clone();
        move |_: web_sys::ErrorEvent| {
            web_sys::console::warn_1(&format!("Overlay image failed to load: {overlay_url}").into());
            probe.detach("overlay image failed to load");
        }
    };

    let on_mouse_move = {
        let probe = Rc::clone(&probe);
        move |e: MouseEvent| {
            mouse_pos.set((e.client_x() as f64, e.client_y() as f64));
            probe.on_move(event_coord(&e));
        }
    };

    let on_click = {
        let probe = Rc::clone(&probe);
        move |e: MouseEvent| {
            if panned.get_untracked() {
                return;
            }
            if let Ok(color) = probe.on_click(event_coord(&e)) {
                web_sys::console::info_1(&color.to_hex().into());
            }
        }
    };

    let on_mouse_enter = move |e: MouseEvent| {
        mouse_pos.set((e.client_x() as f64, e.client_y() as f64));
        hovering.set(true);
    };
    let on_mouse_leave = move |_: MouseEvent| hovering.set(false);

    view! {
        <img
            node_ref=img_ref
            crossorigin="anonymous"
            src=overlay_url
            alt=""
            draggable="false"
            class="map-overlay"
            style=move || {
                format!(
                    "position: absolute; z-index: 2; cursor: crosshair; user-select: none; {}",
                    rect_style(&rect.get())
                )
            }
            on:load=on_load
            on:error=on_error
            on:mousemove=on_mouse_move
            on:click=on_click
            on:mouseenter=on_mouse_enter
            on:mouseleave=on_mouse_leave
        />
    }
}
