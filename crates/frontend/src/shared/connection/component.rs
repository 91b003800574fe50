use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos::task::spawn_local;
use thaw::*;

use super::fetcher::{ConnectionFetcher, PendingFetch};
use super::filters::FilterSelections;
use super::summary::ConnectionNodesSummary;

fn run(pending: PendingFetch) {
    spawn_local(async move {
        pending.await;
    });
}

/// Список с поиском и фильтрами поверх [`ConnectionFetcher`].
///
/// Вызывающий создаёт fetcher и может держать его клон, например чтобы
/// вызвать `refetch()` после изменения в другой части страницы или
/// `reconfigure()` при смене набора фильтров: форма перестраивается по
/// новой конфигурации.
#[component]
pub fn FilteredConnection<N, F, IV>(
    fetcher: ConnectionFetcher<N>,
    /// Отрисовка одного узла
    node_view: F,
    #[prop(optional, into)] list_class: String,
    #[prop(optional, into)] show_more_class: String,
) -> impl IntoView
where
    N: Clone + 'static,
    F: Fn(N) -> IV + Clone + Send + Sync + 'static,
    IV: IntoView + 'static,
{
    let state = RwSignal::new_local(fetcher.state());
    let summary = RwSignal::new(fetcher.summary());
    let show_more_visible = RwSignal::new(fetcher.display_show_more());
    let retry_visible = RwSignal::new(fetcher.display_retry());
    let generation = RwSignal::new(fetcher.generation());
    let selections = RwSignal::new(fetcher.selections());
    let search = RwSignal::new(fetcher.search_text());

    let stored = StoredValue::new_local(fetcher.clone());
    let subscription = fetcher.subscribe(move |snapshot| {
        let _ = state.try_set(snapshot.clone());
        let Some(fetcher) = stored.try_get_value() else {
            return;
        };
        let _ = summary.try_set(fetcher.summary());
        let _ = show_more_visible.try_set(fetcher.display_show_more());
        let _ = retry_visible.try_set(fetcher.display_retry());
        // Сигналы формы трогаем только при реальном изменении,
        // иначе каждая загрузка перерисовывала бы фильтры.
        let current = fetcher.generation();
        if generation.try_get_untracked().is_some_and(|g| g != current) {
            let _ = generation.try_set(current);
        }
        let current = fetcher.selections();
        if selections.try_with_untracked(|s| s != &current).unwrap_or(false) {
            let _ = selections.try_set(current);
        }
    });
    on_cleanup(move || {
        if let Some(fetcher) = stored.try_get_value() {
            fetcher.unsubscribe(subscription);
        }
    });

    // Первая загрузка
    run(fetcher.refetch());

    // search -> fetcher (с задержкой)
    let debounce = StoredValue::new_local(None::<Timeout>);
    let search_first_run = StoredValue::new(true);
    Effect::new(move |_| {
        let text = search.get();
        if search_first_run.get_value() {
            search_first_run.set_value(false);
            return;
        }
        let Some(fetcher) = stored.try_get_value() else {
            return;
        };
        let debounce_ms = fetcher.config().search_debounce_ms;
        // Замена дескриптора отменяет предыдущий таймер.
        let timeout = Timeout::new(debounce_ms, move || {
            if let Some(fetcher) = stored.try_get_value() {
                if let Some(pending) = fetcher.set_search(&text) {
                    run(pending);
                }
            }
        });
        debounce.set_value(Some(timeout));
    });

    // reconfigure сбрасывает поиск: отменяем отложенный запрос и очищаем поле.
    let generation_first_run = StoredValue::new(true);
    Effect::new(move |_| {
        generation.track();
        if generation_first_run.get_value() {
            generation_first_run.set_value(false);
            return;
        }
        debounce.set_value(None);
        if let Some(fetcher) = stored.try_get_value() {
            search.set(fetcher.search_text());
        }
    });

    let form = move || {
        generation.track();
        let Some(fetcher) = stored.try_get_value() else {
            return ().into_any();
        };
        let config = fetcher.config();
        let registry = fetcher.filters();
        let initial = selections.get_untracked();

        let filter_views = registry
            .definitions()
            .iter()
            .map(|def| {
                let selected = RwSignal::new(
                    registry
                        .selected_value(&initial, &def.id)
                        .map(|v| v.value.clone())
                        .unwrap_or_default(),
                );

                // fetcher -> select
                let sync_id = def.id.clone();
                let sync_registry = registry.clone();
                Effect::new(move |_| {
                    let value = selections.with(|s: &FilterSelections| {
                        sync_registry
                            .selected_value(s, &sync_id)
                            .map(|v| v.value.clone())
                    });
                    if let Some(value) = value {
                        if selected.get_untracked() != value {
                            selected.set(value);
                        }
                    }
                });

                // select -> fetcher; повторный выбор того же значения запроса не делает
                let filter_id = def.id.clone();
                let first_run = StoredValue::new(true);
                Effect::new(move |_| {
                    let value = selected.get();
                    if first_run.get_value() {
                        first_run.set_value(false);
                        return;
                    }
                    let Some(fetcher) = stored.try_get_value() else {
                        return;
                    };
                    match fetcher.select_filter(&filter_id, &value) {
                        Ok(Some(pending)) => run(pending),
                        Ok(None) => {}
                        Err(err) => log::warn!("{}", err),
                    }
                });

                let options = def
                    .values
                    .iter()
                    .map(|v| {
                        view! {
                            <option value=v.value.clone() title=v.tooltip.clone().unwrap_or_default()>
                                {v.label.clone()}
                            </option>
                        }
                    })
                    .collect_view();

                view! {
                    <label class="filtered-connection__filter" title=def.tooltip.clone().unwrap_or_default()>
                        <span class="filtered-connection__filter-label">{def.label.clone()}</span>
                        <Select value=selected size=SelectSize::Small>
                            {options}
                        </Select>
                    </label>
                }
            })
            .collect_view();

        let search_view = (!config.hide_search).then(|| {
            view! {
                <div class="filtered-connection__search">
                    <Input value=search placeholder=config.placeholder() />
                </div>
            }
        });

        view! {
            <div class="filtered-connection__form">
                {search_view}
                {filter_views}
            </div>
        }
        .into_any()
    };

    let on_show_more = Callback::new(move |_: ()| {
        if let Some(fetcher) = stored.try_get_value() {
            if let Some(pending) = fetcher.show_more() {
                run(pending);
            }
        }
    });

    let on_retry = move |_| {
        if let Some(fetcher) = stored.try_get_value() {
            run(fetcher.refetch());
        }
    };

    let list_class = format!("filtered-connection__nodes {}", list_class);

    view! {
        <div class="filtered-connection">
            {form}
            {move || {
                state
                    .with(|s| s.error.as_ref().map(|err| err.to_string()))
                    .map(|message| {
                        view! {
                            <div class="filtered-connection__error">
                                <span>{message}</span>
                                <Show when=move || retry_visible.get()>
                                    <Button
                                        appearance=ButtonAppearance::Subtle
                                        size=ButtonSize::Small
                                        attr:class="filtered-connection__retry"
                                        on_click=on_retry
                                    >
                                        "Retry"
                                    </Button>
                                </Show>
                            </div>
                        }
                    })
            }}
            <ul class=list_class>
                {move || {
                    let node_view = node_view.clone();
                    state.with(|s| s.nodes.iter().cloned().map(node_view).collect_view())
                }}
            </ul>
            {move || {
                state
                    .with(|s| s.is_loading())
                    .then(|| view! { <div class="filtered-connection__loader"><Spinner /></div> })
            }}
            <ConnectionNodesSummary
                summary=summary
                display_show_more_button=show_more_visible
                on_show_more=on_show_more
                show_more_class=show_more_class
            />
        </div>
    }
}
