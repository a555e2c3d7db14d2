use yew::prelude::*;

use super::browser::open_in_new_tab;
use crate::catalog::CatalogEntry;
use crate::config::{HERO_PLACEHOLDER, POSTER_PLACEHOLDER};

const TRAILER_FALLBACK_URL: &str = "https://www.youtube.com";

#[derive(Clone, PartialEq)]
pub enum HeroState {
    Loading,
    Ready(CatalogEntry),
    Failed,
}

#[derive(Properties, PartialEq)]
pub struct HeroBannerProps {
    pub state: HeroState,
}

#[function_component(HeroBanner)]
pub fn hero_banner(props: &HeroBannerProps) -> Html {
    let (title, tagline, poster, trailer) = match &props.state {
        HeroState::Loading => ("Loading…".to_string(), String::new(), HERO_PLACEHOLDER.to_string(), None),
        HeroState::Failed => (
            "Failed to load movie".to_string(),
            "Try again later.".to_string(),
            HERO_PLACEHOLDER.to_string(),
            None,
        ),
        HeroState::Ready(entry) => {
            let trailer = Some(entry.video_url())
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(TRAILER_FALLBACK_URL)
                .to_string();
            let poster = match entry.poster_url() {
                POSTER_PLACEHOLDER => HERO_PLACEHOLDER,
                url => url,
            };
            (
                entry.title.clone(),
                format!("{} • ⭐ {}", entry.year_label(), entry.rating_label()),
                poster.to_string(),
                Some(trailer),
            )
        }
    };

    let on_watch_trailer = Callback::from(move |_: MouseEvent| {
        if let Some(url) = trailer.as_deref() {
            open_in_new_tab(url);
        }
    });

    html! {
        <section class="hero" aria-labelledby="heroTitle">
            <video id="heroVideo" class="hero-video" poster={poster} muted=true playsinline=true />
            <div class="hero-copy">
                <h1 id="heroTitle">{title}</h1>
                <p id="heroTagline">{tagline}</p>
                <button id="watchTrailerBtn" type="button" onclick={on_watch_trailer}>
                    {"Watch trailer"}
                </button>
            </div>
        </section>
    }
}
