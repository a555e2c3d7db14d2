use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use js_sys::Reflect;
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    window, CanvasRenderingContext2d, Element, HtmlCanvasElement, HtmlVideoElement, TextTrackMode, VttCue,
};
use yew::prelude::*;

use super::browser::{now_ms, FrameLoop};
use crate::catalog::CatalogEntry;
use crate::logging::{log_event, LogLevel};
use crate::player::{
    ControlLayout, MediaCommand, MediaSnapshot, Overlay, PlaybackSource, PlayerState, Rect,
    NO_VIDEO_MESSAGE,
};

const CANVAS_WIDTH: u32 = 960;
const CANVAS_HEIGHT: u32 = 540;
const ACCENT: &str = "#e50914";
const SEEK_TRACK_HEIGHT: f64 = 4.0;
const SEEK_KNOB_RADIUS: f64 = 6.0;

fn document_fullscreen() -> bool {
    window()
        .and_then(|w| w.document())
        .and_then(|d| d.fullscreen_element())
        .is_some()
}

fn exit_fullscreen() {
    if let Some(document) = window().and_then(|w| w.document()) {
        if document.fullscreen_element().is_some() {
            document.exit_fullscreen();
        }
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
    canvas
        .get_context("2d")
        .ok()
        .flatten()?
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

fn snapshot(video: &HtmlVideoElement) -> MediaSnapshot {
    MediaSnapshot {
        paused: video.paused(),
        muted: video.muted(),
        current_time: video.current_time(),
        duration: video.duration(),
    }
}

fn set_caption_mode(video: &HtmlVideoElement, enabled: bool) {
    let track = video.text_tracks().and_then(|tracks| tracks.get(0));
    if let Some(track) = track {
        track.set_mode(if enabled {
            TextTrackMode::Hidden
        } else {
            TextTrackMode::Disabled
        });
    }
}

fn active_cue_text(video: &HtmlVideoElement) -> Option<String> {
    let cues = video.text_tracks()?.get(0)?.active_cues()?;
    let lines: Vec<String> = (0..cues.length())
        .filter_map(|index| cues.get(index))
        .filter_map(|cue| cue.dyn_into::<VttCue>().ok())
        .map(|cue| cue.text())
        .collect();

    (!lines.is_empty()).then(|| lines.join("\n"))
}

fn is_abort(error: &JsValue) -> bool {
    Reflect::get(error, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
        .is_some_and(|name| name == "AbortError")
}

fn glyph(ctx: &CanvasRenderingContext2d, region: Rect, text: &str) {
    let (x, y) = region.center();
    let _ = ctx.fill_text(text, x, y);
}

fn paint_paused_title(ctx: &CanvasRenderingContext2d, title: &str, width: f64, height: f64) {
    ctx.set_fill_style_str("rgba(0, 0, 0, 0.45)");
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_fill_style_str("#fff");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font("bold 36px sans-serif");
    let _ = ctx.fill_text(title, width / 2.0, height / 2.0 - 20.0);
    ctx.set_font("16px sans-serif");
    let _ = ctx.fill_text("Paused", width / 2.0, height / 2.0 + 20.0);
}

fn paint_caption(ctx: &CanvasRenderingContext2d, text: &str, width: f64, baseline: f64) {
    ctx.set_font("22px sans-serif");
    ctx.set_text_align("center");
    ctx.set_text_baseline("bottom");

    let lines: Vec<&str> = text.lines().collect();
    for (index, line) in lines.iter().rev().enumerate() {
        let y = baseline - index as f64 * 28.0;
        let padded = ctx
            .measure_text(line)
            .map(|metrics| metrics.width() + 16.0)
            .unwrap_or(width / 2.0);
        ctx.set_fill_style_str("rgba(0, 0, 0, 0.7)");
        ctx.fill_rect((width - padded) / 2.0, y - 26.0, padded, 28.0);
        ctx.set_fill_style_str("#fff");
        let _ = ctx.fill_text(line, width / 2.0, y);
    }
}

fn paint_controls(ctx: &CanvasRenderingContext2d, layout: &ControlLayout, player: &PlayerState) {
    let bar = layout.bar;
    ctx.set_fill_style_str("rgba(0, 0, 0, 0.6)");
    ctx.fill_rect(bar.x, bar.y, bar.width, bar.height);

    ctx.set_fill_style_str("#fff");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_font("20px sans-serif");
    glyph(ctx, layout.play, if player.is_playing { "❚❚" } else { "▶" });
    glyph(ctx, layout.mute, if player.is_muted { "🔇" } else { "🔊" });
    glyph(ctx, layout.brightness, "☀");
    glyph(ctx, layout.fullscreen, "⛶");

    ctx.set_font("bold 14px sans-serif");
    if !player.has_captions() {
        ctx.set_fill_style_str("rgba(255, 255, 255, 0.35)");
    } else if player.captions_enabled {
        ctx.set_fill_style_str(ACCENT);
    }
    glyph(ctx, layout.captions, "CC");

    ctx.set_fill_style_str("#fff");
    ctx.set_font("14px sans-serif");
    ctx.set_text_align("left");
    let (_, time_y) = layout.time.center();
    let _ = ctx.fill_text(&player.time_label(), layout.time.x, time_y);

    let seek = layout.seek;
    if seek.width <= 0.0 {
        return;
    }
    let (_, track_y) = seek.center();
    ctx.set_fill_style_str("rgba(255, 255, 255, 0.3)");
    ctx.fill_rect(seek.x, track_y - SEEK_TRACK_HEIGHT / 2.0, seek.width, SEEK_TRACK_HEIGHT);

    let filled = seek.width * player.progress();
    ctx.set_fill_style_str(ACCENT);
    ctx.fill_rect(seek.x, track_y - SEEK_TRACK_HEIGHT / 2.0, filled, SEEK_TRACK_HEIGHT);
    ctx.begin_path();
    let _ = ctx.arc(seek.x + filled, track_y, SEEK_KNOB_RADIUS, 0.0, TAU);
    ctx.fill();
}

fn paint(
    ctx: &CanvasRenderingContext2d,
    video: &HtmlVideoElement,
    player: &PlayerState,
    caption: Option<&str>,
    (width, height): (f64, f64),
    now: f64,
) {
    ctx.set_filter("none");
    ctx.clear_rect(0.0, 0.0, width, height);
    ctx.set_fill_style_str("#000");
    ctx.fill_rect(0.0, 0.0, width, height);

    ctx.set_filter(&format!("brightness({})", player.brightness));
    let _ = ctx.draw_image_with_html_video_element_and_dw_and_dh(video, 0.0, 0.0, width, height);
    ctx.set_filter("none");

    if !player.is_playing {
        paint_paused_title(ctx, &player.entry.title, width, height);
    }

    let layout = ControlLayout::new(width, height);
    let controls_visible = player.controls_visible(now);
    if let Some(text) = caption {
        let baseline = if controls_visible {
            layout.bar.y - 12.0
        } else {
            height - 24.0
        };
        paint_caption(ctx, text, width, baseline);
    }
    if controls_visible {
        paint_controls(ctx, &layout, player);
    }
}

/// Everything the overlay's event handlers and frame loop share.
#[derive(Clone)]
struct Stage {
    overlay: Rc<RefCell<Overlay>>,
    frame_loop: Rc<RefCell<Option<FrameLoop>>>,
    failed: UseStateHandle<Option<String>>,
    video: NodeRef,
    canvas: NodeRef,
    container: NodeRef,
}

impl Stage {
    fn open(&self, entry: CatalogEntry) {
        let (source, startup) = {
            let mut overlay = self.overlay.borrow_mut();
            let player = overlay.open(entry);
            (player.source.clone(), player.startup_commands())
        };

        let PlaybackSource::Canvas { url } = source else {
            log_event(
                LogLevel::Debug,
                "overlay_opened_without_canvas",
                json!({ "source": format!("{source:?}") }),
            );
            return;
        };

        let Some(video) = self.video.cast::<HtmlVideoElement>() else {
            self.fail();
            return;
        };
        video.set_src(&url);

        let stage = self.clone();
        *self.frame_loop.borrow_mut() = Some(FrameLoop::start(move |_| stage.draw_frame()));
        self.apply(startup);
    }

    fn close(&self) {
        self.frame_loop.borrow_mut().take();
        self.overlay.borrow_mut().close();

        if let Some(video) = self.video.cast::<HtmlVideoElement>() {
            let _ = video.pause();
            let _ = video.remove_attribute("src");
            video.load();
        }
        exit_fullscreen();
    }

    fn current_id(&self) -> Option<String> {
        self.overlay
            .borrow()
            .player()
            .map(|player| player.entry.id_key())
    }

    fn fail(&self) {
        self.frame_loop.borrow_mut().take();
        let id = {
            let mut overlay = self.overlay.borrow_mut();
            let Some(player) = overlay.player_mut() else {
                return;
            };
            player.playback_failed();
            player.entry.id_key()
        };

        log_event(LogLevel::Warn, "playback_failed", json!({ "entry": id }));
        self.failed.set(Some(id));
    }

    fn play(&self, video: &HtmlVideoElement) {
        let promise = match video.play() {
            Ok(promise) => promise,
            Err(_) => {
                self.fail();
                return;
            }
        };

        let stage = self.clone();
        let requested_for = self.current_id();
        spawn_local(async move {
            let Err(error) = JsFuture::from(promise).await else {
                return;
            };
            if is_abort(&error) || stage.current_id() != requested_for {
                return;
            }
            stage.fail();
        });
    }

    fn apply(&self, commands: Vec<MediaCommand>) {
        let Some(video) = self.video.cast::<HtmlVideoElement>() else {
            return;
        };

        for command in commands {
            match command {
                MediaCommand::Play => self.play(&video),
                MediaCommand::Pause => {
                    let _ = video.pause();
                }
                MediaCommand::SetMuted(muted) => video.set_muted(muted),
                MediaCommand::SeekTo(seconds) => video.set_current_time(seconds),
                // Painted from PlayerState on the next frame.
                MediaCommand::SetBrightness(_) => {}
                MediaCommand::SetCaptions(enabled) => set_caption_mode(&video, enabled),
                MediaCommand::EnterFullscreen => {
                    if let Some(container) = self.container.cast::<Element>() {
                        if container.request_fullscreen().is_err() {
                            log_event(LogLevel::Warn, "fullscreen_failed", json!({}));
                        }
                    }
                }
                MediaCommand::ExitFullscreen => exit_fullscreen(),
            }
        }
    }

    fn sync(&self) {
        let Some(video) = self.video.cast::<HtmlVideoElement>() else {
            return;
        };
        if let Some(player) = self.overlay.borrow_mut().player_mut() {
            player.sync_media(snapshot(&video));
        }
    }

    fn draw_frame(&self) -> bool {
        let (Some(canvas), Some(video)) = (
            self.canvas.cast::<HtmlCanvasElement>(),
            self.video.cast::<HtmlVideoElement>(),
        ) else {
            return false;
        };
        let Some(ctx) = context_2d(&canvas) else {
            return false;
        };

        let mut overlay = self.overlay.borrow_mut();
        if !overlay.wants_frame_loop() {
            return false;
        }
        let Some(player) = overlay.player_mut() else {
            return false;
        };

        player.sync_media(snapshot(&video));
        let caption = if player.captions_enabled {
            active_cue_text(&video)
        } else {
            None
        };
        let size = (f64::from(canvas.width()), f64::from(canvas.height()));
        paint(&ctx, &video, player, caption.as_deref(), size, now_ms());
        true
    }

    fn canvas_point(&self, event: &MouseEvent) -> Option<(HtmlCanvasElement, f64, f64)> {
        let canvas = self.canvas.cast::<HtmlCanvasElement>()?;
        let rect = canvas.get_bounding_client_rect();
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return None;
        }

        let scale_x = f64::from(canvas.width()) / rect.width();
        let scale_y = f64::from(canvas.height()) / rect.height();
        let x = (f64::from(event.client_x()) - rect.left()) * scale_x;
        let y = (f64::from(event.client_y()) - rect.top()) * scale_y;
        Some((canvas, x, y))
    }

    fn click(&self, event: &MouseEvent) {
        let Some((canvas, x, y)) = self.canvas_point(event) else {
            return;
        };
        let layout = ControlLayout::new(f64::from(canvas.width()), f64::from(canvas.height()));

        let commands = {
            let mut overlay = self.overlay.borrow_mut();
            let Some(player) = overlay.player_mut() else {
                return;
            };
            player.sync_fullscreen(document_fullscreen());
            player.click(&layout, x, y, now_ms())
        };
        self.apply(commands);
    }

    fn pointer_moved(&self) {
        if let Some(player) = self.overlay.borrow_mut().player_mut() {
            player.pointer_activity(now_ms());
        }
    }
}

#[derive(Properties, PartialEq)]
pub struct WatchOverlayProps {
    pub entry: Option<CatalogEntry>,
    pub on_close: Callback<()>,
    pub on_ended: Callback<CatalogEntry>,
}

#[function_component(WatchOverlay)]
pub fn watch_overlay(props: &WatchOverlayProps) -> Html {
    let stage = Stage {
        overlay: use_mut_ref(Overlay::default),
        frame_loop: use_mut_ref(|| None::<FrameLoop>),
        failed: use_state(|| None::<String>),
        video: use_node_ref(),
        canvas: use_node_ref(),
        container: use_node_ref(),
    };

    {
        let stage = stage.clone();
        use_effect_with(props.entry.clone(), move |entry| {
            if stage.failed.is_some() {
                stage.failed.set(None);
            }
            if let Some(entry) = entry.clone() {
                stage.open(entry);
            }
            move || stage.close()
        });
    }

    let on_back = {
        let on_close = props.on_close.clone();
        Callback::from(move |_: MouseEvent| on_close.emit(()))
    };
    let on_media_event = {
        let stage = stage.clone();
        Callback::from(move |_: Event| stage.sync())
    };
    let onended = {
        let stage = stage.clone();
        let on_ended = props.on_ended.clone();
        Callback::from(move |_: Event| {
            let finished = stage
                .overlay
                .borrow()
                .player()
                .map(|player| player.entry.clone());
            if let Some(entry) = finished {
                on_ended.emit(entry);
            }
        })
    };
    let on_canvas_click = {
        let stage = stage.clone();
        Callback::from(move |event: MouseEvent| stage.click(&event))
    };
    let on_canvas_move = {
        let stage = stage.clone();
        Callback::from(move |_: MouseEvent| stage.pointer_moved())
    };

    let entry = props.entry.as_ref();
    let failed_here = entry.is_some_and(|entry| stage.failed.as_deref() == Some(entry.id_key().as_str()));
    let source = entry.map(|entry| {
        if failed_here {
            PlaybackSource::Unavailable {
                message: NO_VIDEO_MESSAGE,
            }
        } else {
            PlaybackSource::resolve(entry)
        }
    });

    let surface = match &source {
        Some(PlaybackSource::Canvas { .. }) => html! {
            <canvas
                ref={stage.canvas.clone()}
                class="watch-canvas"
                width={CANVAS_WIDTH.to_string()}
                height={CANVAS_HEIGHT.to_string()}
                onclick={on_canvas_click}
                onmousemove={on_canvas_move}
            />
        },
        Some(embed @ PlaybackSource::Embed { .. }) => html! {
            <iframe
                class="watch-embed"
                src={embed.embed_url().unwrap_or_default()}
                width="100%"
                height="400"
                frameborder="0"
                allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
                allowfullscreen=true
            />
        },
        Some(PlaybackSource::Unavailable { message }) => html! {
            <p class="player-error">{*message}</p>
        },
        None => Html::default(),
    };

    let captions = entry
        .and_then(|entry| entry.captions.clone())
        .filter(|captions| !captions.trim().is_empty())
        .map(|captions| html! { <track kind="subtitles" label="English" srclang="en" src={captions} /> });

    let details = entry.map(|entry| {
        html! {
            <div class="watch-details">
                <h2 id="watch-title">{entry.title.clone()}</h2>
                <p id="watch-description">{entry.description_text().to_string()}</p>
                <p class="watch-meta">
                    <span id="watch-genre">{entry.genre_label()}</span>
                    <span id="watch-year">{entry.year_label()}</span>
                    <span id="watch-rating">{format!("⭐ {}", entry.rating_label())}</span>
                </p>
            </div>
        }
    });

    html! {
        <section id="watch-area" class={classes!("watch-area", entry.is_none().then_some("hidden"))}>
            <button id="close-watch" type="button" onclick={on_back}>{"← Back"}</button>
            <div class="watch-player-container" ref={stage.container.clone()}>
                <video
                    ref={stage.video.clone()}
                    class="hidden"
                    playsinline=true
                    preload="auto"
                    onplay={on_media_event.clone()}
                    onpause={on_media_event.clone()}
                    onvolumechange={on_media_event}
                    {onended}
                >
                    {captions}
                </video>
                {surface}
            </div>
            {details}
        </section>
    }
}
