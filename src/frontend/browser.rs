use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_net::http::Request;
use serde_json::Value;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::window;

use crate::catalog::{CatalogAccessor, CatalogError, CatalogSource};
use crate::logging::{log_event, LogLevel};
use crate::util::TimerHost;

pub struct HttpSource;

impl CatalogSource for HttpSource {
    async fn fetch_json(&self, location: &str) -> Result<Value, CatalogError> {
        let response = Request::get(location)
            .send()
            .await
            .map_err(|error| CatalogError::Fetch {
                location: location.to_string(),
                reason: error.to_string(),
            })?;

        if !response.ok() {
            return Err(CatalogError::Status {
                location: location.to_string(),
                status: response.status(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|error| CatalogError::Parse {
                location: location.to_string(),
                reason: error.to_string(),
            })
    }
}

pub fn catalog() -> CatalogAccessor<HttpSource> {
    CatalogAccessor::new(HttpSource)
}

#[derive(Clone, Copy, Default)]
pub struct BrowserTimer;

/// A scheduled `setTimeout`. Owns the JS callback; dropping the handle clears
/// the timeout and frees the callback.
pub struct Timeout {
    id: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(win) = window() {
            win.clear_timeout_with_handle(self.id);
        }
    }
}

impl TimerHost for BrowserTimer {
    type Handle = Timeout;

    fn schedule(&self, wait_ms: u32, callback: Box<dyn FnOnce()>) -> Option<Timeout> {
        let callback: Closure<dyn FnMut()> = Closure::once(callback);
        let id = window()?
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref(),
                i32::try_from(wait_ms).unwrap_or(i32::MAX),
            )
            .ok()?;
        Some(Timeout {
            id,
            _callback: callback,
        })
    }

    fn cancel(&self, handle: Timeout) {
        drop(handle);
    }
}

pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

pub fn random() -> f64 {
    js_sys::Math::random()
}

pub fn viewport_size() -> (f64, f64) {
    let Some(win) = window() else {
        return (1280.0, 720.0);
    };

    let width = win
        .inner_width()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(1280.0);
    let height = win
        .inner_height()
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(720.0);

    (width, height)
}

pub fn alert(message: &str) {
    if let Some(win) = window() {
        let _ = win.alert_with_message(message);
    }
}

pub fn open_in_new_tab(url: &str) {
    let opened = window().and_then(|win| win.open_with_url_and_target(url, "_blank").ok());
    if opened.is_none() {
        log_event(LogLevel::Warn, "open_tab_failed", serde_json::json!({ "url": url }));
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &Closure<dyn FnMut(f64)>) -> Option<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

/// A `requestAnimationFrame` loop. The handle is present exactly while the
/// loop is scheduled; `tick` returning `false` ends it.
pub struct FrameLoop {
    handle: Rc<Cell<Option<i32>>>,
    callback: FrameCallback,
}

impl FrameLoop {
    pub fn start(mut tick: impl FnMut(f64) -> bool + 'static) -> Self {
        let handle = Rc::new(Cell::new(None));
        let callback: FrameCallback = Rc::new(RefCell::new(None));

        let handle_inner = Rc::clone(&handle);
        let callback_inner = Rc::clone(&callback);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            if !tick(timestamp) {
                handle_inner.set(None);
                return;
            }
            let next = callback_inner.borrow().as_ref().and_then(request_frame);
            handle_inner.set(next);
        }) as Box<dyn FnMut(f64)>));

        let first = callback.borrow().as_ref().and_then(request_frame);
        handle.set(first);

        Self { handle, callback }
    }

    pub fn stop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(win) = window() {
                let _ = win.cancel_animation_frame(id);
            }
        }
        self.callback.borrow_mut().take();
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
