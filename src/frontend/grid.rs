use yew::prelude::*;

use crate::catalog::CatalogEntry;
use crate::util::format_title;

#[derive(Clone, PartialEq)]
pub enum GridState {
    Loading,
    Ready(Vec<CatalogEntry>),
}

impl GridState {
    pub fn entries(&self) -> &[CatalogEntry] {
        match self {
            Self::Ready(entries) => entries,
            Self::Loading => &[],
        }
    }
}

#[derive(Properties, PartialEq)]
struct MovieCardProps {
    entry: CatalogEntry,
    on_select: Callback<CatalogEntry>,
}

#[function_component(MovieCard)]
fn movie_card(props: &MovieCardProps) -> Html {
    let onclick = {
        let entry = props.entry.clone();
        let on_select = props.on_select.clone();
        Callback::from(move |_: MouseEvent| on_select.emit(entry.clone()))
    };
    let entry = &props.entry;

    html! {
        <div class="movie-card" data-id={entry.id_key()} role="button" tabindex="0" {onclick}>
            <img
                class="movie-poster"
                src={entry.poster_url().to_string()}
                alt={format!("{} poster", entry.title)}
                loading="lazy"
            />
            <div class="movie-info">
                <div class="movie-title" title={entry.title.clone()}>{format_title(&entry.title)}</div>
                <div class="movie-meta">
                    <span>{entry.genre_label()}</span>
                    <span>{format!("⭐ {}", entry.rating_label())}</span>
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct MovieGridProps {
    pub state: GridState,
    pub on_select: Callback<CatalogEntry>,
}

#[function_component(MovieGrid)]
pub fn movie_grid(props: &MovieGridProps) -> Html {
    let body = match &props.state {
        GridState::Loading => html! { <p class="no-results">{"Loading…"}</p> },
        GridState::Ready(entries) if entries.is_empty() => html! {
            <p class="no-results">{"No movies found."}</p>
        },
        GridState::Ready(entries) => entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                html! {
                    <MovieCard
                        key={format!("{index}-{}", entry.id_key())}
                        entry={entry.clone()}
                        on_select={props.on_select.clone()}
                    />
                }
            })
            .collect::<Html>(),
    };

    html! { <div id="movieGrid" class="movie-grid">{body}</div> }
}

#[derive(Clone, Copy, PartialEq)]
pub enum GenreLayout {
    Popup,
    Strip,
}

#[derive(Properties, PartialEq)]
pub struct GenreMenuProps {
    pub genres: Vec<String>,
    pub layout: GenreLayout,
    pub on_pick: Callback<String>,
    #[prop_or(true)]
    pub visible: bool,
}

#[function_component(GenreMenu)]
pub fn genre_menu(props: &GenreMenuProps) -> Html {
    let item = |genre: &String| {
        let onclick = {
            let genre = genre.clone();
            let on_pick = props.on_pick.clone();
            Callback::from(move |_: MouseEvent| on_pick.emit(genre.clone()))
        };
        match props.layout {
            GenreLayout::Popup => html! { <li key={genre.clone()} {onclick}>{genre.clone()}</li> },
            GenreLayout::Strip => html! {
                <div key={genre.clone()} class="category-item" {onclick}>{genre.clone()}</div>
            },
        }
    };
    let items = props.genres.iter().map(item).collect::<Html>();

    match props.layout {
        GenreLayout::Popup => html! {
            <div id="genre-popup" class={classes!("genre-popup", (!props.visible).then_some("hidden"))}>
                <ul id="genre-list">{items}</ul>
            </div>
        },
        GenreLayout::Strip => html! { <div id="categoryList" class="category-list">{items}</div> },
    }
}
