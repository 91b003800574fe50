//! Жизненный цикл запросов одного списка.
//!
//! Каждый изменяющий вызов сразу выполняет синхронную часть (переход
//! состояния, уведомление подписчиков) и возвращает [`PendingFetch`],
//! который вызывающий запускает, обычно через `leptos::task::spawn_local`.
//! У каждого запроса есть порядковый номер; ответ применяется, только если
//! его номер всё ещё последний выданный (побеждает последний отправленный,
//! а не последний пришедший).

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};

use contracts::shared::connection::{ConnectionPage, QueryArguments};
use futures::future::{FutureExt, LocalBoxFuture};

use super::config::ConnectionConfig;
use super::error::ConnectionError;
use super::filters::{FilterRegistry, FilterSelections};
use super::paging::{MergeMode, PageStats, PagingController};
use super::query::{compose_base, normalize_search, BaseQuery, PagingState};
use super::state::{ConnectionState, LoadKind, Phase};
use super::summary;

pub type QueryFuture<N> = LocalBoxFuture<'static, Result<ConnectionPage<N>, ConnectionError>>;

/// Итог выполнения [`PendingFetch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    Failed,
    /// До ответа был отправлен более новый запрос (или fetcher уничтожен).
    Superseded,
}

pub type PendingFetch = LocalBoxFuture<'static, FetchOutcome>;

/// Вызов бэкенда, на котором строится список.
pub trait QueryConnection<N> {
    fn query_connection(&self, args: QueryArguments) -> QueryFuture<N>;
}

impl<N, F, Fut> QueryConnection<N> for F
where
    F: Fn(QueryArguments) -> Fut,
    Fut: Future<Output = Result<ConnectionPage<N>, ConnectionError>> + 'static,
{
    fn query_connection(&self, args: QueryArguments) -> QueryFuture<N> {
        self(args).boxed_local()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber<N> = Rc<dyn Fn(&ConnectionState<N>)>;

struct Request {
    seq: u64,
    args: QueryArguments,
    paging: PagingState,
    merge: MergeMode,
}

struct Inner<N> {
    config: Rc<ConnectionConfig>,
    registry: FilterRegistry,
    paging: PagingController,
    base: BaseQuery,
    selections: FilterSelections,
    search_text: String,
    /// Пагинация последней применённой страницы.
    committed: PagingState,
    state: ConnectionState<N>,
    seq: u64,
    /// Растёт при каждом `reconfigure`.
    generation: u64,
    next_subscription: u64,
    subscribers: Vec<(SubscriptionId, Subscriber<N>)>,
}

impl<N> Inner<N> {
    fn begin_reset(&mut self) -> Request {
        self.seq += 1;
        let paging = self.paging.initial();
        self.committed = paging.clone();
        self.state.reset(paging.first);
        Request {
            seq: self.seq,
            args: compose_base(&self.base, &paging),
            paging,
            merge: MergeMode::Replace,
        }
    }

    fn begin_show_more(&mut self) -> Option<Request> {
        if self.config.no_show_more || self.state.is_loading() || !self.state.has_more {
            return None;
        }
        let Some(paging) = self.paging.next(&self.committed, self.state.page_info.as_ref()) else {
            log::warn!("connection reports more nodes but gave no cursor to continue from");
            return None;
        };
        self.seq += 1;
        self.state.phase = Phase::Loading(LoadKind::Increment);
        self.state.error = None;
        self.state.first_requested = paging.first;
        Some(Request {
            seq: self.seq,
            args: compose_base(&self.base, &paging),
            paging,
            merge: self.paging.show_more_merge(),
        })
    }

    fn apply_page(&mut self, paging: PagingState, merge: MergeMode, page: ConnectionPage<N>) {
        let returned = page.nodes.len();
        match merge {
            MergeMode::Accumulate => self.state.nodes.extend(page.nodes),
            MergeMode::Replace => self.state.nodes = page.nodes,
        }
        let stats = PageStats {
            loaded: self.state.nodes.len(),
            requested: paging.first,
            returned,
        };
        self.state.has_more = self
            .paging
            .has_more(stats, page.total_count, page.page_info.as_ref());
        self.state.total_count = page.total_count;
        self.state.page_info = page.page_info;
        self.state.first_requested = paging.first;
        self.state.phase = Phase::Loaded;
        self.state.error = None;
        self.committed = paging;
    }
}

/// Состояние пагинации, фильтров и поиска одного списка.
///
/// Клоны дешёвые и разделяют одно и то же состояние.
pub struct ConnectionFetcher<N: 'static> {
    inner: Rc<RefCell<Inner<N>>>,
    query: Rc<dyn QueryConnection<N>>,
}

impl<N: 'static> Clone for ConnectionFetcher<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            query: Rc::clone(&self.query),
        }
    }
}

impl<N: Clone + 'static> ConnectionFetcher<N> {
    /// Создаёт список в состоянии Idle. До [`Self::refetch`] ничего не загружается.
    pub fn new(
        config: ConnectionConfig,
        base_args: QueryArguments,
        query: impl QueryConnection<N> + 'static,
    ) -> Result<Self, ConnectionError> {
        let registry = FilterRegistry::new(config.filters.clone())?;
        let paging = PagingController::from_config(&config);
        let selections = registry.default_selections();
        let base = BaseQuery::new(base_args, registry.merged_args(&selections), "");
        let committed = paging.initial();
        let inner = Inner {
            config: Rc::new(config),
            registry,
            paging,
            base,
            selections,
            search_text: String::new(),
            state: ConnectionState::new(committed.first),
            committed,
            seq: 0,
            generation: 0,
            next_subscription: 0,
            subscribers: Vec::new(),
        };
        Ok(Self {
            inner: Rc::new(RefCell::new(inner)),
            query: Rc::new(query),
        })
    }

    pub fn config(&self) -> Rc<ConnectionConfig> {
        Rc::clone(&self.inner.borrow().config)
    }

    pub fn state(&self) -> ConnectionState<N> {
        self.inner.borrow().state.clone()
    }

    /// Номер текущей конфигурации; меняется только в `reconfigure`.
    pub fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    pub fn filters(&self) -> FilterRegistry {
        self.inner.borrow().registry.clone()
    }

    pub fn selections(&self) -> FilterSelections {
        self.inner.borrow().selections.clone()
    }

    pub fn search_text(&self) -> String {
        self.inner.borrow().search_text.clone()
    }

    /// Хотя бы один фильтр не на значении по умолчанию.
    pub fn filters_active(&self) -> bool {
        let inner = self.inner.borrow();
        !inner.registry.is_default(&inner.selections)
    }

    /// Аргументы последней применённой (или начальной) страницы.
    pub fn query_arguments(&self) -> QueryArguments {
        let inner = self.inner.borrow();
        compose_base(&inner.base, &inner.committed)
    }

    pub fn summary(&self) -> Option<String> {
        let inner = self.inner.borrow();
        summary::summarize(
            &inner.config,
            &inner.state,
            inner.base.search.as_deref(),
            !inner.registry.is_default(&inner.selections),
        )
    }

    pub fn display_show_more(&self) -> bool {
        let inner = self.inner.borrow();
        summary::display_show_more(&inner.config, &inner.state)
    }

    pub fn display_retry(&self) -> bool {
        let inner = self.inner.borrow();
        summary::display_retry(&inner.config, &inner.state)
    }

    /// Очищает список и загружает первую страницу текущего базового запроса.
    ///
    /// Вызывается при монтировании и после изменений данных в другом месте.
    pub fn refetch(&self) -> PendingFetch {
        let request = self.inner.borrow_mut().begin_reset();
        self.notify();
        self.dispatch(request)
    }

    /// `None`, если нормализованный текст поиска не изменился.
    pub fn set_search(&self, text: &str) -> Option<PendingFetch> {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            inner.search_text = text.to_string();
            let search = normalize_search(text);
            if search == inner.base.search {
                false
            } else {
                inner.base.search = search;
                true
            }
        };
        changed.then(|| self.refetch())
    }

    /// `Ok(None)`, если `value` уже выбрано.
    pub fn select_filter(
        &self,
        filter_id: &str,
        value: &str,
    ) -> Result<Option<PendingFetch>, ConnectionError> {
        let changed = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let changed = inner.registry.select(&mut inner.selections, filter_id, value)?;
            if changed {
                inner.base.filter_args = inner.registry.merged_args(&inner.selections);
            }
            changed
        };
        Ok(changed.then(|| self.refetch()))
    }

    /// Заменяет фиксированные аргументы; `None`, если они не изменились.
    pub fn set_base_args(&self, base_args: QueryArguments) -> Option<PendingFetch> {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            if inner.base.base_args == base_args {
                false
            } else {
                inner.base.base_args = base_args;
                true
            }
        };
        changed.then(|| self.refetch())
    }

    /// Меняет конфигурацию. Работает как повторное монтирование: фильтры
    /// возвращаются к значениям по умолчанию, поиск очищается, первая
    /// страница загружается заново.
    pub fn reconfigure(&self, config: ConnectionConfig) -> Result<PendingFetch, ConnectionError> {
        let registry = FilterRegistry::new(config.filters.clone())?;
        {
            let mut inner = self.inner.borrow_mut();
            inner.paging = PagingController::from_config(&config);
            inner.selections = registry.default_selections();
            inner.base.filter_args = registry.merged_args(&inner.selections);
            inner.base.search = None;
            inner.search_text.clear();
            inner.registry = registry;
            inner.config = Rc::new(config);
            inner.generation += 1;
        }
        Ok(self.refetch())
    }

    /// `None`, пока идёт запрос или когда догружать нечего.
    pub fn show_more(&self) -> Option<PendingFetch> {
        let request = self.inner.borrow_mut().begin_show_more()?;
        self.notify();
        Some(self.dispatch(request))
    }

    /// Регистрирует наблюдателя, вызываемого после каждого перехода состояния.
    ///
    /// Наблюдатель не должен владеть клоном fetcher; отписка при размонтировании.
    pub fn subscribe(&self, subscriber: impl Fn(&ConnectionState<N>) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        inner.next_subscription += 1;
        let id = SubscriptionId(inner.next_subscription);
        inner.subscribers.push((id, Rc::new(subscriber)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|(sub_id, _)| *sub_id != id);
    }

    fn notify(&self) {
        notify(&self.inner);
    }

    fn dispatch(&self, request: Request) -> PendingFetch {
        log::debug!(
            "connection request #{} first={} after={:?}",
            request.seq,
            request.paging.first,
            request.paging.after
        );
        let response = self.query.query_connection(request.args.clone());
        let inner = Rc::downgrade(&self.inner);
        async move {
            let result = response.await;
            apply(&inner, request, result)
        }
        .boxed_local()
    }
}

fn apply<N: Clone>(
    inner: &Weak<RefCell<Inner<N>>>,
    request: Request,
    result: Result<ConnectionPage<N>, ConnectionError>,
) -> FetchOutcome {
    let Some(inner) = inner.upgrade() else {
        log::debug!("connection dropped before response #{} arrived", request.seq);
        return FetchOutcome::Superseded;
    };
    let outcome = {
        let mut guard = inner.borrow_mut();
        if guard.seq != request.seq {
            log::warn!(
                "discarding stale response #{} (latest is #{})",
                request.seq,
                guard.seq
            );
            return FetchOutcome::Superseded;
        }
        match result {
            Ok(page) => {
                guard.apply_page(request.paging, request.merge, page);
                log::debug!(
                    "connection response #{} applied, {} nodes loaded",
                    request.seq,
                    guard.state.nodes.len()
                );
                FetchOutcome::Applied
            }
            Err(err) => {
                log::error!("connection request #{} failed: {}", request.seq, err);
                guard.state.phase = Phase::Failed;
                guard.state.error = Some(err);
                guard.state.first_requested = guard.committed.first;
                FetchOutcome::Failed
            }
        }
    };
    notify(&inner);
    outcome
}

/// Вызывает подписчиков без активного borrow: они могут обращаться к fetcher.
fn notify<N: Clone>(inner: &Rc<RefCell<Inner<N>>>) {
    let (subscribers, snapshot) = {
        let guard = inner.borrow();
        if guard.subscribers.is_empty() {
            return;
        }
        let subscribers: Vec<Subscriber<N>> =
            guard.subscribers.iter().map(|(_, s)| Rc::clone(s)).collect();
        (subscribers, guard.state.clone())
    };
    for subscriber in subscribers {
        subscriber(&snapshot);
    }
}
