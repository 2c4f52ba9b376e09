use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};
use yew::prelude::*;

use super::app::AppContext;
use crate::api::endpoints::COUNTRY_DOTS_PATH;
use crate::api::ApiError;
use crate::model::CountryDot;
use crate::state::globe::graticule;
use crate::state::GlobeState;
use crate::util::AliveFlag;

fn fit_canvas(canvas: &HtmlCanvasElement, window: &Window) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0) as u32;
    let height = window
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(600.0) as u32;
    if canvas.width() != width {
        canvas.set_width(width);
    }
    if canvas.height() != height {
        canvas.set_height(height);
    }
}

fn draw(ctx: &CanvasRenderingContext2d, globe: &GlobeState, w: f64, h: f64) {
    ctx.set_global_alpha(1.0);
    ctx.set_fill_style_str("#000");
    ctx.fill_rect(0.0, 0.0, w, h);

    ctx.set_fill_style_str("#00ffff");
    for star in &globe.stars {
        ctx.set_global_alpha(star.alpha(globe.elapsed) * 0.8);
        ctx.fill_rect(star.x * w, star.y * h, star.size, star.size);
    }
    ctx.set_global_alpha(1.0);

    let radius = w.min(h) * 0.32;
    let (cx, cy) = (w * 0.5, h * 0.45);

    ctx.begin_path();
    let _ = ctx.arc(cx, cy, radius, 0.0, TAU);
    ctx.set_fill_style_str("rgba(0,40,60,0.35)");
    ctx.fill();
    ctx.set_stroke_style_str("rgba(0,230,255,0.45)");
    ctx.set_line_width(1.5);
    ctx.stroke();

    // back hemisphere is culled, lines lift the pen where they wrap behind
    ctx.set_stroke_style_str("rgba(0,230,255,0.18)");
    ctx.set_line_width(1.0);
    for line in graticule() {
        ctx.begin_path();
        let mut pen_down = false;
        for (lat, lon) in line {
            let p = globe.project(lat, lon);
            if p.depth <= 0.0 {
                pen_down = false;
                continue;
            }
            let (x, y) = (cx + p.x * radius, cy + p.y * radius);
            if pen_down {
                ctx.line_to(x, y);
            } else {
                ctx.move_to(x, y);
                pen_down = true;
            }
        }
        ctx.stroke();
    }

    for (dot, ripple) in globe.dots.iter().zip(&globe.ripples) {
        let p = globe.project(dot.lat, dot.lon);
        if p.depth <= 0.0 {
            continue;
        }
        let (x, y) = (cx + p.x * radius, cy + p.y * radius);
        ctx.begin_path();
        let _ = ctx.arc(x, y, 3.0, 0.0, TAU);
        ctx.set_fill_style_str("#00e6ff");
        ctx.fill();

        ctx.set_global_alpha(ripple.opacity.clamp(0.0, 1.0));
        ctx.begin_path();
        let _ = ctx.arc(x, y, 6.0 * ripple.scale, 0.0, TAU);
        ctx.set_stroke_style_str("#00e6ff");
        ctx.stroke();
        ctx.set_global_alpha(1.0);
    }
}

#[function_component]
pub fn GlobeView() -> Html {
    let canvas_ref = use_node_ref();
    let globe = use_mut_ref(GlobeState::default);
    let client = use_context::<AppContext>().map(|c| c.client);

    // Country markers; the built-in sample stays when the listing is unavailable
    {
        let globe = globe.clone();
        use_effect_with(client, move |client| {
            let alive = AliveFlag::new();
            if let Some(client) = client {
                let alive = alive.clone();
                client.cached_get(
                    COUNTRY_DOTS_PATH,
                    Callback::from(move |r: Result<Vec<CountryDot>, ApiError>| {
                        if !alive.is_alive() {
                            return;
                        }
                        match r {
                            Ok(dots) => globe.borrow_mut().set_dots(dots),
                            Err(e) => log::debug!("[API] country dots unavailable: {}", e),
                        }
                    }),
                );
            }
            move || alive.kill()
        });
    }

    // RAF loop
    {
        let canvas_ref = canvas_ref.clone();
        let globe = globe.clone();
        use_effect_with((), move |_| {
            let raf_id = Rc::new(Cell::new(None::<i32>));
            let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
            let canvas = canvas_ref.cast::<HtmlCanvasElement>();
            let ctx = canvas
                .as_ref()
                .and_then(|c| c.get_context("2d").ok().flatten())
                .and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok());
            if let (Some(canvas), Some(ctx), Some(window)) = (canvas, ctx, web_sys::window()) {
                let last_ts = Cell::new(None::<f64>);
                let cell = closure_cell.clone();
                let raf = raf_id.clone();
                let win = window.clone();
                *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
                    let dt = last_ts.get().map(|prev| (ts - prev) / 1000.0).unwrap_or(0.0);
                    last_ts.set(Some(ts));
                    fit_canvas(&canvas, &win);
                    {
                        let mut g = globe.borrow_mut();
                        g.advance(dt);
                        draw(&ctx, &g, canvas.width() as f64, canvas.height() as f64);
                    }
                    if let Some(cb) = cell.borrow().as_ref() {
                        if let Ok(id) = win.request_animation_frame(cb.as_ref().unchecked_ref()) {
                            raf.set(Some(id));
                        }
                    }
                }) as Box<dyn FnMut(f64)>));
                if let Some(cb) = closure_cell.borrow().as_ref() {
                    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        raf_id.set(Some(id));
                    }
                }
            }
            move || {
                if let (Some(id), Some(window)) = (raf_id.get(), web_sys::window()) {
                    let _ = window.cancel_animation_frame(id);
                }
                closure_cell.borrow_mut().take();
            }
        });
    }

    html! { <canvas ref={canvas_ref} style="position:fixed; inset:0; width:100%; height:100%; z-index:0; pointer-events:none;" /> }
}
