use yew::prelude::*;

use super::browser::BrowserTimer;
use crate::config::{LOADER_DURATION_MS, LOADER_FADE_MS};
use crate::util::TimerHost;

#[derive(Clone, Copy, PartialEq)]
enum Phase {
    Showing,
    Fading,
    Gone,
}

#[derive(Properties, PartialEq)]
pub struct LoaderProps {
    /// Fired once the splash starts fading and the page underneath may show.
    pub on_hidden: Callback<()>,
}

#[function_component(Loader)]
pub fn loader(props: &LoaderProps) -> Html {
    let phase = use_state(|| Phase::Showing);

    {
        let phase = phase.clone();
        let on_hidden = props.on_hidden.clone();
        use_effect_with((), move |_| {
            let fading = {
                let phase = phase.clone();
                BrowserTimer.schedule(
                    LOADER_DURATION_MS,
                    Box::new(move || {
                        phase.set(Phase::Fading);
                        on_hidden.emit(());
                    }),
                )
            };
            let gone = BrowserTimer.schedule(
                LOADER_DURATION_MS + LOADER_FADE_MS,
                Box::new(move || phase.set(Phase::Gone)),
            );

            move || {
                for handle in [fading, gone].into_iter().flatten() {
                    BrowserTimer.cancel(handle);
                }
            }
        });
    }

    if *phase == Phase::Gone {
        return Html::default();
    }

    html! {
        <div id="abong-loader" class={classes!("loader", (*phase == Phase::Fading).then_some("hidden"))}>
            <div class="loader-mark" aria-hidden="true" />
            <p class="loader-label">{"Loading…"}</p>
        </div>
    }
}
