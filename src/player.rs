//! State and geometry of the watch overlay. Everything here is independent of
//! the DOM; the frontend owns the video element and the canvas and feeds
//! pointer positions and media snapshots in, applying the returned
//! [`MediaCommand`]s to the element.

use url::Url;

use crate::catalog::{is_direct_media, CatalogEntry};
use crate::config::{BRIGHTNESS_MAX, BRIGHTNESS_STEP, CONTROLS_HIDE_AFTER_MS};

pub const NO_VIDEO_MESSAGE: &str = "No video available";

const BAR_HEIGHT: f64 = 48.0;
const ICON_SIZE: f64 = 32.0;
const PADDING: f64 = 8.0;
const TIME_WIDTH: f64 = 120.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedProvider {
    YouTube,
    Vimeo,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PlaybackSource {
    /// Direct media drawn onto the canvas from a hidden `<video>`.
    Canvas { url: String },
    /// Hosted player that cannot be drawn to a canvas; shown as an iframe.
    Embed { provider: EmbedProvider, id: String },
    Unavailable { message: &'static str },
}

impl PlaybackSource {
    pub fn resolve(entry: &CatalogEntry) -> Self {
        let video = entry.video_url().trim();
        if !video.is_empty() && is_direct_media(video) {
            return Self::Canvas {
                url: video.to_string(),
            };
        }

        let fallback = entry
            .fallback_video
            .as_deref()
            .map(str::trim)
            .filter(|fallback| is_direct_media(fallback));
        if let Some(fallback) = fallback {
            return Self::Canvas {
                url: fallback.to_string(),
            };
        }

        match parse_embed(video) {
            Some((provider, id)) => Self::Embed { provider, id },
            None => Self::Unavailable {
                message: NO_VIDEO_MESSAGE,
            },
        }
    }

    pub fn runs_frame_loop(&self) -> bool {
        matches!(self, Self::Canvas { .. })
    }

    pub fn embed_url(&self) -> Option<String> {
        match self {
            Self::Embed {
                provider: EmbedProvider::YouTube,
                id,
            } => Some(format!("https://www.youtube.com/embed/{id}?autoplay=1")),
            Self::Embed {
                provider: EmbedProvider::Vimeo,
                id,
            } => Some(format!("https://player.vimeo.com/video/{id}?autoplay=1")),
            _ => None,
        }
    }
}

fn parse_embed(raw: &str) -> Option<(EmbedProvider, String)> {
    if raw.is_empty() {
        return None;
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let url = Url::parse(&candidate).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|segment| !segment.is_empty()).collect())
        .unwrap_or_default();

    let (provider, id) = match host.as_str() {
        "youtube.com" | "m.youtube.com" => {
            let from_query = url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned());
            let from_path = segments
                .last()
                .filter(|segment| **segment != "watch")
                .map(|segment| segment.to_string());
            (EmbedProvider::YouTube, from_query.or(from_path)?)
        }
        "youtu.be" => (EmbedProvider::YouTube, segments.first()?.to_string()),
        "vimeo.com" | "player.vimeo.com" => (EmbedProvider::Vimeo, segments.last()?.to_string()),
        _ => return None,
    };

    let valid = !id.is_empty()
        && id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');
    valid.then_some((provider, id))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    PlayPause,
    Mute,
    Seek,
    Brightness,
    Captions,
    Fullscreen,
}

/// Fixed strip along the bottom of the canvas: play, mute and the time
/// readout on the left, brightness, captions and fullscreen on the right,
/// the seek bar stretched between them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlLayout {
    pub bar: Rect,
    pub play: Rect,
    pub mute: Rect,
    pub time: Rect,
    pub seek: Rect,
    pub brightness: Rect,
    pub captions: Rect,
    pub fullscreen: Rect,
}

impl ControlLayout {
    pub fn new(width: f64, height: f64) -> Self {
        let bar_y = (height - BAR_HEIGHT).max(0.0);
        let icon_y = bar_y + (BAR_HEIGHT - ICON_SIZE) / 2.0;
        let icon = |x: f64| Rect {
            x,
            y: icon_y,
            width: ICON_SIZE,
            height: ICON_SIZE,
        };

        let play = icon(PADDING);
        let mute = icon(play.x + ICON_SIZE + PADDING);
        let time = Rect {
            x: mute.x + ICON_SIZE + PADDING,
            y: icon_y,
            width: TIME_WIDTH,
            height: ICON_SIZE,
        };

        let fullscreen = icon(width - PADDING - ICON_SIZE);
        let captions = icon(fullscreen.x - PADDING - ICON_SIZE);
        let brightness = icon(captions.x - PADDING - ICON_SIZE);

        let seek_x = time.x + time.width + PADDING;
        let seek = Rect {
            x: seek_x,
            y: icon_y,
            width: (brightness.x - PADDING - seek_x).max(0.0),
            height: ICON_SIZE,
        };

        Self {
            bar: Rect {
                x: 0.0,
                y: bar_y,
                width,
                height: BAR_HEIGHT.min(height),
            },
            play,
            mute,
            time,
            seek,
            brightness,
            captions,
            fullscreen,
        }
    }

    pub fn regions(&self) -> [(Control, Rect); 6] {
        [
            (Control::PlayPause, self.play),
            (Control::Mute, self.mute),
            (Control::Seek, self.seek),
            (Control::Brightness, self.brightness),
            (Control::Captions, self.captions),
            (Control::Fullscreen, self.fullscreen),
        ]
    }

    pub fn hit_test(&self, x: f64, y: f64) -> Option<Control> {
        if !self.bar.contains(x, y) {
            return None;
        }

        self.regions()
            .into_iter()
            .find(|(_, region)| region.contains(x, y))
            .map(|(control, _)| control)
    }

    pub fn seek_fraction(&self, x: f64) -> f64 {
        if self.seek.width <= 0.0 {
            return 0.0;
        }
        ((x - self.seek.x) / self.seek.width).clamp(0.0, 1.0)
    }
}

/// Changes to apply to the native media element or page.
#[derive(Clone, Debug, PartialEq)]
pub enum MediaCommand {
    Play,
    Pause,
    SetMuted(bool),
    SeekTo(f64),
    SetBrightness(f64),
    SetCaptions(bool),
    EnterFullscreen,
    ExitFullscreen,
}

/// What the native element reports; read once per frame and on media events.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaSnapshot {
    pub paused: bool,
    pub muted: bool,
    pub current_time: f64,
    pub duration: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub entry: CatalogEntry,
    pub source: PlaybackSource,
    pub is_playing: bool,
    pub is_muted: bool,
    pub brightness: f64,
    pub captions_enabled: bool,
    pub fullscreen: bool,
    pub current_time: f64,
    pub duration: f64,
    controls_hide_deadline: Option<f64>,
}

impl PlayerState {
    pub fn open(entry: CatalogEntry) -> Self {
        let source = PlaybackSource::resolve(&entry);
        Self {
            entry,
            source,
            is_playing: false,
            is_muted: false,
            brightness: 1.0,
            captions_enabled: false,
            fullscreen: false,
            current_time: 0.0,
            duration: f64::NAN,
            controls_hide_deadline: None,
        }
    }

    pub fn startup_commands(&self) -> Vec<MediaCommand> {
        if self.source.runs_frame_loop() {
            vec![MediaCommand::Play]
        } else {
            Vec::new()
        }
    }

    pub fn has_captions(&self) -> bool {
        self.entry
            .captions
            .as_deref()
            .is_some_and(|captions| !captions.trim().is_empty())
    }

    pub fn pointer_activity(&mut self, now_ms: f64) {
        self.controls_hide_deadline = Some(now_ms + CONTROLS_HIDE_AFTER_MS);
    }

    pub fn controls_visible(&self, now_ms: f64) -> bool {
        !self.is_playing
            || self
                .controls_hide_deadline
                .is_some_and(|deadline| now_ms < deadline)
    }

    /// Pointer press on the canvas at `(x, y)`, in canvas pixels.
    pub fn click(&mut self, layout: &ControlLayout, x: f64, y: f64, now_ms: f64) -> Vec<MediaCommand> {
        self.pointer_activity(now_ms);
        match layout.hit_test(x, y) {
            Some(control) => self.dispatch(control, layout.seek_fraction(x)),
            None => Vec::new(),
        }
    }

    /// `seek_fraction` is only consulted for [`Control::Seek`].
    pub fn dispatch(&mut self, control: Control, seek_fraction: f64) -> Vec<MediaCommand> {
        if !self.source.runs_frame_loop() {
            return Vec::new();
        }

        match control {
            Control::PlayPause => {
                if self.is_playing {
                    vec![MediaCommand::Pause]
                } else {
                    vec![MediaCommand::Play]
                }
            }
            Control::Mute => vec![MediaCommand::SetMuted(!self.is_muted)],
            Control::Seek => {
                if self.duration.is_finite() && self.duration > 0.0 {
                    vec![MediaCommand::SeekTo(seek_fraction.clamp(0.0, 1.0) * self.duration)]
                } else {
                    Vec::new()
                }
            }
            Control::Brightness => {
                self.brightness = next_brightness(self.brightness);
                vec![MediaCommand::SetBrightness(self.brightness)]
            }
            Control::Captions => {
                if !self.has_captions() {
                    return Vec::new();
                }
                self.captions_enabled = !self.captions_enabled;
                vec![MediaCommand::SetCaptions(self.captions_enabled)]
            }
            Control::Fullscreen => {
                self.fullscreen = !self.fullscreen;
                if self.fullscreen {
                    vec![MediaCommand::EnterFullscreen]
                } else {
                    vec![MediaCommand::ExitFullscreen]
                }
            }
        }
    }

    pub fn sync_media(&mut self, snapshot: MediaSnapshot) {
        self.is_playing = !snapshot.paused;
        self.is_muted = snapshot.muted;
        self.current_time = snapshot.current_time;
        self.duration = snapshot.duration;
    }

    pub fn sync_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn playback_failed(&mut self) {
        self.is_playing = false;
        self.source = PlaybackSource::Unavailable {
            message: NO_VIDEO_MESSAGE,
        };
    }

    pub fn progress(&self) -> f64 {
        if self.duration.is_finite() && self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn time_label(&self) -> String {
        format!(
            "{} / {}",
            format_time(self.current_time),
            format_time(self.duration)
        )
    }
}

fn next_brightness(current: f64) -> f64 {
    let stepped = ((current + BRIGHTNESS_STEP) * 10.0).round() / 10.0;
    if stepped > BRIGHTNESS_MAX {
        1.0
    } else {
        stepped
    }
}

/// The single watch overlay: closed, or open on exactly one entry.
#[derive(Debug, Default)]
pub struct Overlay {
    player: Option<PlayerState>,
}

impl Overlay {
    pub fn open(&mut self, entry: CatalogEntry) -> &PlayerState {
        self.player.insert(PlayerState::open(entry))
    }

    pub fn close(&mut self) -> Option<PlayerState> {
        self.player.take()
    }

    pub fn player(&self) -> Option<&PlayerState> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut PlayerState> {
        self.player.as_mut()
    }

    pub fn wants_frame_loop(&self) -> bool {
        self.player
            .as_ref()
            .is_some_and(|player| player.source.runs_frame_loop())
    }
}

pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }

    let total = seconds.floor() as u64;
    let (hours, minutes, secs) = (total / 3_600, (total % 3_600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::entry;
    use serde_json::json;

    fn mp4_entry() -> CatalogEntry {
        entry(json!({
            "id": 1,
            "title": "Nova",
            "video": "https://cdn.example.com/nova.mp4",
            "captions": "/subs/nova.vtt"
        }))
    }

    fn playing(state: &mut PlayerState) {
        state.sync_media(MediaSnapshot {
            paused: false,
            muted: false,
            current_time: 30.0,
            duration: 120.0,
        });
    }

    #[test]
    fn direct_media_plays_on_canvas() {
        let source = PlaybackSource::resolve(&mp4_entry());
        assert_eq!(
            source,
            PlaybackSource::Canvas {
                url: "https://cdn.example.com/nova.mp4".to_string()
            }
        );
        assert!(source.runs_frame_loop());
    }

    #[test]
    fn hosted_video_prefers_direct_fallback() {
        let with_fallback = entry(json!({
            "id": 2, "title": "Tides",
            "video": "https://youtu.be/abc",
            "fallbackVideo": "https://cdn.example.com/tides.m3u8"
        }));
        assert_eq!(
            PlaybackSource::resolve(&with_fallback),
            PlaybackSource::Canvas {
                url: "https://cdn.example.com/tides.m3u8".to_string()
            }
        );
    }

    #[test]
    fn hosted_video_ids_are_extracted() {
        let cases = [
            ("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=3", EmbedProvider::YouTube, "dQw4w9WgXcQ"),
            ("https://youtu.be/abc?si=share", EmbedProvider::YouTube, "abc"),
            ("youtube.com/embed/xyz_9", EmbedProvider::YouTube, "xyz_9"),
            ("https://vimeo.com/76979871", EmbedProvider::Vimeo, "76979871"),
        ];

        for (video, provider, id) in cases {
            let source = PlaybackSource::resolve(&entry(json!({ "id": 1, "title": "t", "video": video })));
            assert_eq!(
                source,
                PlaybackSource::Embed {
                    provider,
                    id: id.to_string()
                },
                "{video}"
            );
            assert!(!source.runs_frame_loop());
        }

        let youtube = PlaybackSource::Embed {
            provider: EmbedProvider::YouTube,
            id: "abc".to_string(),
        };
        assert_eq!(
            youtube.embed_url().as_deref(),
            Some("https://www.youtube.com/embed/abc?autoplay=1")
        );
    }

    #[test]
    fn missing_source_opens_without_frame_loop() {
        let mut overlay = Overlay::default();
        let state = overlay.open(entry(json!({ "id": 3, "title": "Silent" })));

        assert_eq!(
            state.source,
            PlaybackSource::Unavailable {
                message: NO_VIDEO_MESSAGE
            }
        );
        assert!(state.startup_commands().is_empty());
        assert!(overlay.player().is_some());
        assert!(!overlay.wants_frame_loop());

        let watch_page = entry(json!({ "id": 4, "title": "Bare", "video": "https://www.youtube.com/watch" }));
        overlay.open(watch_page);
        assert!(!overlay.wants_frame_loop());
    }

    #[test]
    fn overlay_open_replaces_and_close_resets() {
        let mut overlay = Overlay::default();
        assert!(!overlay.wants_frame_loop());

        overlay.open(mp4_entry());
        assert!(overlay.wants_frame_loop());
        if let Some(player) = overlay.player_mut() {
            player.dispatch(Control::Brightness, 0.0);
        }

        overlay.open(mp4_entry());
        assert_eq!(overlay.player().map(|player| player.brightness), Some(1.0));

        let closed = overlay.close();
        assert!(closed.is_some());
        assert!(overlay.player().is_none());
        assert!(!overlay.wants_frame_loop());
    }

    #[test]
    fn hit_test_maps_strip_regions() {
        let layout = ControlLayout::new(800.0, 450.0);

        for (control, region) in layout.regions() {
            let (x, y) = region.center();
            assert_eq!(layout.hit_test(x, y), Some(control));
        }

        let (time_x, time_y) = layout.time.center();
        assert_eq!(layout.hit_test(time_x, time_y), None);
        assert_eq!(layout.hit_test(400.0, 100.0), None);
        assert!(layout.seek.width > 0.0);
    }

    #[test]
    fn narrow_canvas_collapses_seek_bar() {
        let layout = ControlLayout::new(120.0, 90.0);
        assert_eq!(layout.seek.width, 0.0);
        assert_eq!(layout.seek_fraction(50.0), 0.0);
    }

    #[test]
    fn play_and_mute_issue_commands_until_media_reports() {
        let mut state = PlayerState::open(mp4_entry());
        assert_eq!(state.startup_commands(), vec![MediaCommand::Play]);

        assert_eq!(state.dispatch(Control::PlayPause, 0.0), vec![MediaCommand::Play]);
        assert!(!state.is_playing);

        playing(&mut state);
        assert_eq!(state.dispatch(Control::PlayPause, 0.0), vec![MediaCommand::Pause]);
        assert_eq!(state.dispatch(Control::Mute, 0.0), vec![MediaCommand::SetMuted(true)]);
    }

    #[test]
    fn seek_uses_fraction_of_known_duration() {
        let mut state = PlayerState::open(mp4_entry());
        assert!(state.dispatch(Control::Seek, 0.5).is_empty());

        playing(&mut state);
        assert_eq!(state.dispatch(Control::Seek, 0.25), vec![MediaCommand::SeekTo(30.0)]);

        let layout = ControlLayout::new(800.0, 450.0);
        let end = layout.seek.x + layout.seek.width - 0.5;
        let (_, y) = layout.seek.center();
        let commands = state.click(&layout, end, y, 0.0);
        assert!(matches!(commands.as_slice(), [MediaCommand::SeekTo(t)] if *t > 119.0));
    }

    #[test]
    fn brightness_steps_then_wraps() {
        let mut state = PlayerState::open(mp4_entry());
        let mut levels = Vec::new();
        for _ in 0..6 {
            state.dispatch(Control::Brightness, 0.0);
            levels.push(state.brightness);
        }
        assert_eq!(levels, vec![1.2, 1.4, 1.6, 1.8, 2.0, 1.0]);
    }

    #[test]
    fn captions_toggle_only_with_track() {
        let mut state = PlayerState::open(mp4_entry());
        assert_eq!(state.dispatch(Control::Captions, 0.0), vec![MediaCommand::SetCaptions(true)]);
        assert_eq!(state.dispatch(Control::Captions, 0.0), vec![MediaCommand::SetCaptions(false)]);

        let mut bare = PlayerState::open(entry(json!({
            "id": 9, "title": "Bare", "video": "https://cdn.example.com/bare.mp4"
        })));
        assert!(bare.dispatch(Control::Captions, 0.0).is_empty());
        assert!(!bare.captions_enabled);
    }

    #[test]
    fn fullscreen_toggles_and_follows_document() {
        let mut state = PlayerState::open(mp4_entry());
        assert_eq!(state.dispatch(Control::Fullscreen, 0.0), vec![MediaCommand::EnterFullscreen]);
        state.sync_fullscreen(false);
        assert_eq!(state.dispatch(Control::Fullscreen, 0.0), vec![MediaCommand::EnterFullscreen]);
        assert_eq!(state.dispatch(Control::Fullscreen, 0.0), vec![MediaCommand::ExitFullscreen]);
    }

    #[test]
    fn unavailable_source_ignores_controls() {
        let mut state = PlayerState::open(mp4_entry());
        state.playback_failed();

        assert_eq!(
            state.source,
            PlaybackSource::Unavailable {
                message: NO_VIDEO_MESSAGE
            }
        );
        assert!(!state.source.runs_frame_loop());
        assert!(state.dispatch(Control::PlayPause, 0.0).is_empty());
        assert!(state.dispatch(Control::Brightness, 0.0).is_empty());
    }

    #[test]
    fn controls_hide_while_playing_after_idle() {
        let mut state = PlayerState::open(mp4_entry());
        assert!(state.controls_visible(0.0));

        playing(&mut state);
        assert!(!state.controls_visible(10.0));

        state.pointer_activity(1_000.0);
        assert!(state.controls_visible(3_999.0));
        assert!(!state.controls_visible(4_000.0));
    }

    #[test]
    fn time_labels() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(65.9), "1:05");
        assert_eq!(format_time(3_725.0), "1:02:05");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(-3.0), "0:00");

        let mut state = PlayerState::open(mp4_entry());
        assert_eq!(state.time_label(), "0:00 / 0:00");
        playing(&mut state);
        assert_eq!(state.time_label(), "0:30 / 2:00");
        assert_eq!(state.progress(), 0.25);
    }
}
