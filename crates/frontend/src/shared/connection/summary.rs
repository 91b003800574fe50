use leptos::prelude::*;
use thaw::*;

use super::config::ConnectionConfig;
use super::state::{ConnectionState, LoadKind, Phase};

/// Строка сводки под списком; `None`, если показывать нечего.
pub fn summarize<N>(
    config: &ConnectionConfig,
    state: &ConnectionState<N>,
    search: Option<&str>,
    filters_active: bool,
) -> Option<String> {
    if matches!(state.phase, Phase::Idle | Phase::Loading(LoadKind::Initial)) {
        return None;
    }
    if state.nodes.is_empty() && state.error.is_some() {
        return None;
    }
    if config.no_summary_if_all_nodes_visible
        && !state.has_more
        && search.is_none()
        && !filters_active
    {
        return None;
    }

    let loaded = state.nodes.len();
    let matching = search
        .map(|q| format!(" matching \"{}\"", q))
        .unwrap_or_default();

    match state.total_count {
        Some(total) if total > 0 => {
            let mut text = format!("{} {}", total, config.pluralize(total));
            if matching.is_empty() {
                text.push_str(" total");
            } else {
                text.push_str(&matching);
            }
            if loaded < total {
                text.push_str(&format!(" (showing first {})", loaded));
            }
            Some(text)
        }
        _ if state.has_more => Some(format!(
            "Showing first {} {}{}",
            loaded,
            config.pluralize(loaded),
            matching
        )),
        _ if loaded == 0 => Some(format!("No {}{}", config.plural_noun(), matching)),
        _ => None,
    }
}

/// Показывать ли кнопку "Show more".
pub fn display_show_more<N>(config: &ConnectionConfig, state: &ConnectionState<N>) -> bool {
    !config.no_show_more && state.has_more && !state.is_loading()
}

/// Кнопка повтора под ошибкой: только если "Show more" её не заменяет.
pub fn display_retry<N>(config: &ConnectionConfig, state: &ConnectionState<N>) -> bool {
    state.phase == Phase::Failed && !display_show_more(config, state)
}

/// Строка сводки и необязательная кнопка "Show more".
///
/// О пагинации ничего не знает: каждый клик один раз вызывает `on_show_more`.
#[component]
pub fn ConnectionNodesSummary(
    #[prop(into)] summary: Signal<Option<String>>,
    #[prop(into)] display_show_more_button: Signal<bool>,
    #[prop(optional)] on_show_more: Option<Callback<()>>,
    #[prop(optional, into)] show_more_class: String,
) -> impl IntoView {
    let show_more_class = StoredValue::new(format!(
        "filtered-connection__show-more {}",
        show_more_class
    ));

    view! {
        <div class="filtered-connection__summary-container">
            {move || {
                summary
                    .get()
                    .map(|text| view! { <p class="filtered-connection__summary">{text}</p> })
            }}
            {move || {
                display_show_more_button
                    .get()
                    .then(|| {
                        view! {
                            <Button
                                appearance=ButtonAppearance::Subtle
                                size=ButtonSize::Small
                                attr:class=show_more_class.get_value()
                                on_click=move |_| {
                                    if let Some(on_show_more) = on_show_more {
                                        on_show_more.run(());
                                    }
                                }
                            >
                                "Show more"
                            </Button>
                        }
                    })
            }}
        </div>
    }
}
