mod backdrop;
mod browser;
mod grid;
mod hero;
mod loader;
mod search_bar;
mod watch;

use serde_json::json;
use wasm_bindgen_futures::spawn_local;
use web_sys::window;
use yew::prelude::*;

use crate::catalog::{collect_genres, next_after, CatalogEntry};
use crate::logging::{log_event, set_min_level, LogLevel};
use backdrop::ParticleBackdrop;
use browser::{alert, catalog, random};
use grid::{GenreLayout, GenreMenu, GridState, MovieGrid};
use hero::{HeroBanner, HeroState};
use loader::Loader;
use search_bar::SearchBar;
use watch::WatchOverlay;

#[derive(Clone, Copy, PartialEq, Eq)]
enum NavItem {
    Home,
    Genre,
    Settings,
    Store,
    Profile,
}

impl NavItem {
    const ALL: [Self; 5] = [Self::Home, Self::Genre, Self::Settings, Self::Store, Self::Profile];

    fn id(self) -> &'static str {
        match self {
            Self::Home => "home-btn",
            Self::Genre => "genre-btn",
            Self::Settings => "settings-btn",
            Self::Store => "store-btn",
            Self::Profile => "profile-btn",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Genre => "Genre",
            Self::Settings => "Settings",
            Self::Store => "Store",
            Self::Profile => "Profile",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            Self::Home => "⌂",
            Self::Genre => "☰",
            Self::Settings => "⚙",
            Self::Store => "🛒",
            Self::Profile => "👤",
        }
    }

    fn coming_soon(self) -> Option<String> {
        match self {
            Self::Settings | Self::Store | Self::Profile => {
                Some(format!("{} feature coming soon!", self.label()))
            }
            Self::Home | Self::Genre => None,
        }
    }
}

fn load_home(hero: UseStateHandle<HeroState>, grid: UseStateHandle<GridState>, genres: UseStateHandle<Vec<String>>) {
    spawn_local(async move {
        let accessor = catalog();
        hero.set(match accessor.random_pick(random()).await {
            Some(entry) => HeroState::Ready(entry),
            None => HeroState::Failed,
        });

        let entries = accessor.load_all().await;
        genres.set(collect_genres(&entries));
        grid.set(GridState::Ready(entries));
    });
}

#[function_component(App)]
fn app() -> Html {
    let revealed = use_state(|| false);
    let hero = use_state(|| HeroState::Loading);
    let grid = use_state(|| GridState::Loading);
    let genres = use_state(Vec::<String>::new);
    let genre_popup = use_state(|| false);
    let active_nav = use_state(|| NavItem::Home);
    let watching = use_state(|| None::<CatalogEntry>);

    {
        let hero = hero.clone();
        let grid = grid.clone();
        let genres = genres.clone();
        use_effect_with((), move |_| {
            load_home(hero, grid, genres);
            || ()
        });
    }

    let on_loader_hidden = {
        let revealed = revealed.clone();
        Callback::from(move |_| revealed.set(true))
    };

    let on_nav = {
        let hero = hero.clone();
        let grid = grid.clone();
        let genres = genres.clone();
        let genre_popup = genre_popup.clone();
        let active_nav = active_nav.clone();
        Callback::from(move |item: NavItem| {
            active_nav.set(item);
            match item {
                NavItem::Home => {
                    genre_popup.set(false);
                    load_home(hero.clone(), grid.clone(), genres.clone());
                }
                NavItem::Genre => genre_popup.set(!*genre_popup),
                NavItem::Settings | NavItem::Store | NavItem::Profile => {
                    if let Some(message) = item.coming_soon() {
                        alert(&message);
                    }
                }
            }
        })
    };

    let on_genre = {
        let grid = grid.clone();
        let genre_popup = genre_popup.clone();
        Callback::from(move |genre: String| {
            genre_popup.set(false);
            let grid = grid.clone();
            spawn_local(async move {
                let entries = catalog().filter_by_genre(&genre).await;
                log_event(
                    LogLevel::Debug,
                    "genre_filtered",
                    json!({ "genre": genre, "entries": entries.len() }),
                );
                grid.set(GridState::Ready(entries));
            });
        })
    };

    let on_search_results = {
        let grid = grid.clone();
        let genre_popup = genre_popup.clone();
        Callback::from(move |entries: Vec<CatalogEntry>| {
            genre_popup.set(false);
            grid.set(GridState::Ready(entries));
        })
    };

    let on_search_submit = {
        let watching = watching.clone();
        Callback::from(move |_| watching.set(None))
    };

    let on_select = {
        let watching = watching.clone();
        Callback::from(move |entry: CatalogEntry| watching.set(Some(entry)))
    };

    let on_close_watch = {
        let watching = watching.clone();
        Callback::from(move |_| watching.set(None))
    };

    let on_ended = {
        let watching = watching.clone();
        let grid = grid.clone();
        Callback::from(move |finished: CatalogEntry| {
            let next = next_after(grid.entries(), &finished.id).cloned();
            log_event(
                LogLevel::Info,
                "playback_ended",
                json!({ "entry": finished.id_key(), "next": next.as_ref().map(CatalogEntry::id_key) }),
            );
            if next.is_some() {
                watching.set(next);
            }
        })
    };

    let nav_buttons = NavItem::ALL
        .into_iter()
        .map(|item| {
            let onclick = {
                let on_nav = on_nav.clone();
                Callback::from(move |_: MouseEvent| on_nav.emit(item))
            };
            html! {
                <button
                    id={item.id()}
                    type="button"
                    class={classes!("nav-btn", (*active_nav == item).then_some("active"))}
                    aria-label={item.label()}
                    {onclick}
                >
                    <span aria-hidden="true">{item.icon()}</span>
                </button>
            }
        })
        .collect::<Html>();

    html! {
        <>
            <ParticleBackdrop />
            <Loader on_hidden={on_loader_hidden} />
            <div id="home-layout" class={classes!("home-layout", (!*revealed).then_some("hidden"))}>
                <nav class="side-nav" aria-label="Primary">{nav_buttons}</nav>
                <GenreMenu
                    genres={(*genres).clone()}
                    layout={GenreLayout::Popup}
                    visible={*genre_popup}
                    on_pick={on_genre.clone()}
                />
                <main class="content">
                    <header class="top-bar">
                        <SearchBar on_results={on_search_results} on_submit={on_search_submit} />
                    </header>
                    <HeroBanner state={(*hero).clone()} />
                    <WatchOverlay entry={(*watching).clone()} on_close={on_close_watch} {on_ended} />
                    <GenreMenu genres={(*genres).clone()} layout={GenreLayout::Strip} on_pick={on_genre} />
                    <MovieGrid state={(*grid).clone()} {on_select} />
                </main>
            </div>
        </>
    }
}

pub fn run() {
    set_min_level(LogLevel::Info);
    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
