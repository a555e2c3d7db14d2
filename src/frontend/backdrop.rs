use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use serde_json::json;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement};
use yew::prelude::*;

use super::browser::{random, viewport_size, FrameLoop};
use crate::config::PARTICLE_COUNT;
use crate::logging::{log_event, LogLevel};
use crate::particles::ParticleField;

fn fit_canvas(canvas: &HtmlCanvasElement, (width, height): (f64, f64)) {
    canvas.set_width(width.max(0.0) as u32);
    canvas.set_height(height.max(0.0) as u32);
}

fn draw(ctx: &CanvasRenderingContext2d, field: &ParticleField) {
    let (width, height) = field.size();
    ctx.clear_rect(0.0, 0.0, width, height);

    for particle in field.particles() {
        ctx.set_fill_style_str(&particle.color());
        ctx.begin_path();
        let _ = ctx.arc(particle.x, particle.y, particle.size, 0.0, TAU);
        ctx.fill();
    }
}

#[function_component(ParticleBackdrop)]
pub fn particle_backdrop() -> Html {
    let canvas_ref = use_node_ref();

    {
        let canvas_ref = canvas_ref.clone();
        use_effect_with((), move |_| {
            let mut roll = random;
            let viewport = viewport_size();
            let field = Rc::new(RefCell::new(ParticleField::new(
                PARTICLE_COUNT,
                viewport.0,
                viewport.1,
                &mut roll,
            )));

            let context = canvas_ref.cast::<HtmlCanvasElement>().and_then(|canvas| {
                fit_canvas(&canvas, viewport);
                canvas
                    .get_context("2d")
                    .ok()
                    .flatten()?
                    .dyn_into::<CanvasRenderingContext2d>()
                    .ok()
            });
            if context.is_none() {
                log_event(LogLevel::Warn, "backdrop_unavailable", json!({}));
            }

            let frame_loop = context.map(|ctx| {
                let field = Rc::clone(&field);
                FrameLoop::start(move |_| {
                    let mut field = field.borrow_mut();
                    draw(&ctx, &field);
                    field.step(&mut roll);
                    true
                })
            });

            let on_resize = {
                let field = Rc::clone(&field);
                let canvas_ref = canvas_ref.clone();
                Closure::<dyn FnMut()>::new(move || {
                    let viewport = viewport_size();
                    if let Some(canvas) = canvas_ref.cast::<HtmlCanvasElement>() {
                        fit_canvas(&canvas, viewport);
                    }
                    field.borrow_mut().resize(viewport.0, viewport.1, &mut roll);
                })
            };
            if let Some(win) = window() {
                let _ = win.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref());
            }

            move || {
                drop(frame_loop);
                if let Some(win) = window() {
                    let _ = win.remove_event_listener_with_callback(
                        "resize",
                        on_resize.as_ref().unchecked_ref(),
                    );
                }
            }
        });
    }

    html! { <canvas id="bg-canvas" class="particle-canvas" ref={canvas_ref} aria-hidden="true" /> }
}
