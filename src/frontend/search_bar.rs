use std::rc::Rc;

use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

use super::browser::{catalog, BrowserTimer};
use crate::catalog::{collect_genres, CatalogEntry};
use crate::config::{GRID_SEARCH_DEBOUNCE_MS, SUGGESTION_DEBOUNCE_MS};
use crate::search::{suggestions, SearchHistory};
use crate::store::LocalStore;
use crate::util::{highlight_match, Debouncer};

#[derive(Clone, PartialEq)]
enum Dropdown {
    Hidden,
    History(Vec<String>),
    Suggestions { query: String, items: Vec<String> },
}

type History = SearchHistory<LocalStore>;

fn history_dropdown(history: &History) -> Dropdown {
    let entries = history.entries();
    if entries.is_empty() {
        Dropdown::Hidden
    } else {
        Dropdown::History(entries)
    }
}

#[derive(Properties, PartialEq)]
pub struct SearchBarProps {
    pub on_results: Callback<Vec<CatalogEntry>>,
    pub on_submit: Callback<()>,
}

#[function_component(SearchBar)]
pub fn search_bar(props: &SearchBarProps) -> Html {
    let history = use_memo((), |_| History::new(LocalStore::open()));
    let query = use_state(String::new);
    let active = use_state(|| false);
    let dropdown = use_state(|| Dropdown::Hidden);
    let suggest_debounce = use_mut_ref(|| Debouncer::new(BrowserTimer, SUGGESTION_DEBOUNCE_MS));
    let grid_debounce = use_mut_ref(|| Debouncer::new(BrowserTimer, GRID_SEARCH_DEBOUNCE_MS));

    let perform_search: Rc<dyn Fn(String)> = {
        let history = Rc::clone(&history);
        let dropdown = dropdown.clone();
        let grid_debounce = grid_debounce.clone();
        let on_results = props.on_results.clone();
        let on_submit = props.on_submit.clone();
        Rc::new(move |term: String| {
            if term.trim().is_empty() {
                return;
            }
            grid_debounce.borrow().cancel();
            history.save(&term);
            dropdown.set(Dropdown::Hidden);
            on_submit.emit(());

            let on_results = on_results.clone();
            spawn_local(async move {
                on_results.emit(catalog().search(term.trim()).await);
            });
        })
    };

    let onfocus = {
        let active = active.clone();
        let query = query.clone();
        let dropdown = dropdown.clone();
        let history = Rc::clone(&history);
        Callback::from(move |_: FocusEvent| {
            active.set(true);
            if query.trim().is_empty() {
                dropdown.set(history_dropdown(&history));
            }
        })
    };

    let oninput = {
        let query = query.clone();
        let dropdown = dropdown.clone();
        let suggest_debounce = suggest_debounce.clone();
        let grid_debounce = grid_debounce.clone();
        let on_results = props.on_results.clone();
        let history = Rc::clone(&history);
        Callback::from(move |event: InputEvent| {
            let value = event.target_unchecked_into::<HtmlInputElement>().value();
            query.set(value.clone());
            let trimmed = value.trim().to_string();

            let dropdown = dropdown.clone();
            let history = Rc::clone(&history);
            let term = trimmed.clone();
            suggest_debounce.borrow().call(move || {
                if term.is_empty() {
                    dropdown.set(history_dropdown(&history));
                    return;
                }
                spawn_local(async move {
                    let entries = catalog().load_all().await;
                    let genres = collect_genres(&entries);
                    let items = suggestions(&entries, &genres, &term);
                    dropdown.set(Dropdown::Suggestions { query: term, items });
                });
            });

            if trimmed.is_empty() {
                grid_debounce.borrow().cancel();
                return;
            }
            let on_results = on_results.clone();
            grid_debounce.borrow().call(move || {
                spawn_local(async move {
                    on_results.emit(catalog().search(&trimmed).await);
                });
            });
        })
    };

    let onkeydown = {
        let query = query.clone();
        let suggest_debounce = suggest_debounce.clone();
        let perform_search = Rc::clone(&perform_search);
        Callback::from(move |event: KeyboardEvent| {
            if event.key() == "Enter" {
                suggest_debounce.borrow().cancel();
                perform_search((*query).clone());
            }
        })
    };

    let on_back = {
        let query = query.clone();
        let active = active.clone();
        let dropdown = dropdown.clone();
        let suggest_debounce = suggest_debounce.clone();
        let grid_debounce = grid_debounce.clone();
        Callback::from(move |_: MouseEvent| {
            suggest_debounce.borrow().cancel();
            grid_debounce.borrow().cancel();
            query.set(String::new());
            active.set(false);
            dropdown.set(Dropdown::Hidden);
        })
    };

    let pick = |term: &str| {
        let query = query.clone();
        let suggest_debounce = suggest_debounce.clone();
        let perform_search = Rc::clone(&perform_search);
        let term = term.to_string();
        Callback::from(move |_: MouseEvent| {
            suggest_debounce.borrow().cancel();
            query.set(term.clone());
            perform_search(term.clone());
        })
    };

    let dropdown_items = match &*dropdown {
        Dropdown::Hidden => Html::default(),
        Dropdown::History(entries) => {
            let rows = entries
                .iter()
                .map(|term| {
                    let on_delete = {
                        let dropdown = dropdown.clone();
                        let history = Rc::clone(&history);
                        let term = term.clone();
                        Callback::from(move |event: MouseEvent| {
                            event.stop_propagation();
                            history.remove(&term);
                            dropdown.set(history_dropdown(&history));
                        })
                    };
                    html! {
                        <li key={term.clone()} data-query={term.clone()} onclick={pick(term)}>
                            {term.clone()}
                            <button
                                class="delete-btn"
                                type="button"
                                aria-label={format!("Delete {term} from history")}
                                onclick={on_delete}
                            >
                                {"×"}
                            </button>
                        </li>
                    }
                })
                .collect::<Html>();
            let on_clear = {
                let dropdown = dropdown.clone();
                let history = Rc::clone(&history);
                Callback::from(move |_: MouseEvent| {
                    history.clear();
                    dropdown.set(Dropdown::Hidden);
                })
            };
            html! {
                <>
                    {rows}
                    <li key="clear-all" class="clear-all" onclick={on_clear}>{"Clear all history"}</li>
                </>
            }
        }
        Dropdown::Suggestions { query: term, items } => items
            .iter()
            .map(|item| {
                let marked = Html::from_html_unchecked(AttrValue::from(highlight_match(item, term)));
                html! {
                    <li key={item.clone()} data-query={item.clone()} onclick={pick(item)}>{marked}</li>
                }
            })
            .collect::<Html>(),
    };

    let dropdown_hidden = matches!(*dropdown, Dropdown::Hidden);

    html! {
        <div class="search">
            <button
                type="button"
                class={classes!("search-back-icon", (!*active).then_some("hidden"))}
                aria-label="Close search"
                onclick={on_back}
            >
                {"←"}
            </button>
            <input
                id="search-input"
                type="search"
                class={classes!((*active).then_some("active"))}
                placeholder="Search movies, series, genres"
                autocomplete="off"
                value={(*query).clone()}
                {onfocus}
                {oninput}
                {onkeydown}
            />
            <ul class={classes!("search-dropdown", dropdown_hidden.then_some("hidden"))}>
                {dropdown_items}
            </ul>
        </div>
    }
}
