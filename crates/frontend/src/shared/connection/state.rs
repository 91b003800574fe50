use contracts::shared::connection::PageInfo;

use super::error::ConnectionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// Первая страница (нового) базового запроса; список пока пуст.
    Initial,
    /// "Show more" поверх уже загруженных узлов.
    Increment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading(LoadKind),
    Loaded,
    Failed,
}

/// Снимок состояния списка для сводки и отрисовки узлов.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionState<N> {
    /// Порядок сервера. В режиме курсора накапливаются, в режиме offset заменяются.
    pub nodes: Vec<N>,
    pub total_count: Option<usize>,
    /// Последний pageInfo от бэкенда.
    pub page_info: Option<PageInfo>,
    pub phase: Phase,
    /// Ошибка последнего запроса; сбрасывается при старте нового.
    pub error: Option<ConnectionError>,
    /// Размер страницы текущего (или последнего) запроса.
    pub first_requested: usize,
    /// Есть ли что догружать, по последней применённой странице.
    pub has_more: bool,
}

impl<N> ConnectionState<N> {
    pub fn new(first: usize) -> Self {
        Self {
            nodes: Vec::new(),
            total_count: None,
            page_info: None,
            phase: Phase::Idle,
            error: None,
            first_requested: first,
            has_more: false,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading(_))
    }

    /// Очищает список и переходит в `Loading(Initial)`.
    pub(super) fn reset(&mut self, first: usize) {
        self.nodes.clear();
        self.total_count = None;
        self.page_info = None;
        self.phase = Phase::Loading(LoadKind::Initial);
        self.error = None;
        self.first_requested = first;
        self.has_more = false;
    }
}
