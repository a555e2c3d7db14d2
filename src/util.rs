use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{TITLE_KEEP_CHARS, TITLE_MAX_CHARS};

pub fn format_title(title: &str) -> String {
    if title.chars().count() > TITLE_MAX_CHARS {
        let kept: String = title.chars().take(TITLE_KEEP_CHARS).collect();
        format!("{kept}...")
    } else {
        title.to_string()
    }
}

pub fn sanitize(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escaped HTML for `text` with the first case-insensitive occurrence of
/// `query` wrapped in `<mark>`.
pub fn highlight_match(text: &str, query: &str) -> String {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return sanitize(text);
    }

    let lowered = text.to_lowercase();
    let Some(start) = lowered.find(&needle) else {
        return sanitize(text);
    };
    let end = start + needle.len();
    if lowered.len() != text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return sanitize(text);
    }

    format!(
        "{}<mark>{}</mark>{}",
        sanitize(&text[..start]),
        sanitize(&text[start..end]),
        sanitize(&text[end..])
    )
}

/// One-shot timers, as provided by `window.setTimeout` in the browser.
pub trait TimerHost {
    type Handle: 'static;

    fn schedule(&self, wait_ms: u32, callback: Box<dyn FnOnce()>) -> Option<Self::Handle>;
    fn cancel(&self, handle: Self::Handle);
}

pub struct Debouncer<H: TimerHost> {
    host: H,
    wait_ms: u32,
    pending: Rc<RefCell<Option<H::Handle>>>,
}

impl<H: TimerHost> Debouncer<H> {
    pub fn new(host: H, wait_ms: u32) -> Self {
        Self {
            host,
            wait_ms,
            pending: Rc::new(RefCell::new(None)),
        }
    }

    pub fn call(&self, action: impl FnOnce() + 'static) {
        self.cancel();

        let pending = Rc::clone(&self.pending);
        let handle = self.host.schedule(
            self.wait_ms,
            Box::new(move || {
                pending.borrow_mut().take();
                action();
            }),
        );
        *self.pending.borrow_mut() = handle;
    }

    pub fn cancel(&self) {
        let previous = self.pending.borrow_mut().take();
        if let Some(handle) = previous {
            self.host.cancel(handle);
        }
    }
}

impl<H: TimerHost> Drop for Debouncer<H> {
    fn drop(&mut self) {
        self.cancel();
    }
}
