//! Пагинация курсором (накопление) и через offset (замена).

use contracts::shared::connection::PageInfo;

use super::config::{ConnectionConfig, PagingMode};
use super::query::PagingState;

/// Как успешный ответ объединяется с загруженными узлами.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    Accumulate,
    Replace,
}

/// Счётчики только что применённой страницы.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageStats {
    /// Узлов после слияния.
    pub loaded: usize,
    /// `first` запроса.
    pub requested: usize,
    /// Узлов в ответе.
    pub returned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingController {
    mode: PagingMode,
    default_first: usize,
}

impl PagingController {
    pub fn new(mode: PagingMode, default_first: usize) -> Self {
        Self {
            mode,
            default_first: default_first.max(1),
        }
    }

    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self::new(config.paging, config.default_first)
    }

    pub fn initial(&self) -> PagingState {
        PagingState::first_page(self.default_first)
    }

    /// Режим слияния ответа "show more". Загрузка базового запроса всегда заменяет.
    pub fn show_more_merge(&self) -> MergeMode {
        match self.mode {
            PagingMode::Cursor => MergeMode::Accumulate,
            PagingMode::Offset { .. } => MergeMode::Replace,
        }
    }

    /// Пагинация следующего "show more"; `None`, если дальше идти некуда.
    pub fn next(&self, current: &PagingState, page_info: Option<&PageInfo>) -> Option<PagingState> {
        match self.mode {
            PagingMode::Cursor => {
                let cursor = page_info?.end_cursor.clone()?;
                Some(PagingState {
                    first: self.default_first,
                    after: Some(cursor),
                })
            }
            PagingMode::Offset { growth } => Some(PagingState::first_page(growth.grow(current.first))),
        }
    }

    /// Осталось ли что-то кроме загруженных узлов.
    ///
    /// Известный total, равный числу загруженных, важнее `hasNextPage` бэкенда.
    pub fn has_more(
        &self,
        stats: PageStats,
        total_count: Option<usize>,
        page_info: Option<&PageInfo>,
    ) -> bool {
        if let Some(total) = total_count {
            if stats.loaded >= total {
                return false;
            }
        }
        match self.mode {
            PagingMode::Cursor => match page_info {
                Some(info) => info.has_next_page && info.end_cursor.is_some(),
                None => false,
            },
            PagingMode::Offset { .. } => match (total_count, page_info) {
                (Some(total), _) => stats.loaded < total,
                (None, Some(info)) => info.has_next_page,
                // total неизвестен: конец доказывает только неполная страница.
                (None, None) => stats.returned >= stats.requested,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::connection::config::PageGrowth;

    fn info(has_next_page: bool, end_cursor: Option<&str>) -> PageInfo {
        PageInfo {
            has_next_page,
            end_cursor: end_cursor.map(str::to_string),
        }
    }

    fn stats(loaded: usize, requested: usize, returned: usize) -> PageStats {
        PageStats {
            loaded,
            requested,
            returned,
        }
    }

    #[test]
    fn test_cursor_next_uses_end_cursor() {
        let paging = PagingController::new(PagingMode::Cursor, 2);
        let next = paging
            .next(&paging.initial(), Some(&info(true, Some("c2"))))
            .unwrap();
        assert_eq!(next.first, 2);
        assert_eq!(next.after.as_deref(), Some("c2"));
        assert_eq!(paging.next(&paging.initial(), None), None);
        assert_eq!(paging.next(&paging.initial(), Some(&info(true, None))), None);
        assert_eq!(paging.show_more_merge(), MergeMode::Accumulate);
    }

    #[test]
    fn test_offset_next_grows_from_start() {
        let paging = PagingController::new(
            PagingMode::Offset {
                growth: PageGrowth::Double,
            },
            5,
        );
        let next = paging.next(&paging.initial(), None).unwrap();
        assert_eq!(next, PagingState::first_page(10));

        let stepped = PagingController::new(
            PagingMode::Offset {
                growth: PageGrowth::Increment(5),
            },
            5,
        );
        let next = stepped.next(&PagingState::first_page(10), None).unwrap();
        assert_eq!(next, PagingState::first_page(15));
        assert_eq!(stepped.show_more_merge(), MergeMode::Replace);
    }

    #[test]
    fn test_total_equal_to_loaded_suppresses_more() {
        let cursor = PagingController::new(PagingMode::Cursor, 2);
        assert!(!cursor.has_more(stats(4, 2, 2), Some(4), Some(&info(true, Some("c4")))));
        assert!(cursor.has_more(stats(4, 2, 2), Some(6), Some(&info(true, Some("c4")))));
        assert!(!cursor.has_more(stats(4, 2, 2), None, Some(&info(false, Some("c4")))));
    }

    #[test]
    fn test_offset_has_more() {
        let paging = PagingController::new(PagingMode::Offset { growth: PageGrowth::Double }, 5);
        assert!(paging.has_more(stats(5, 5, 5), Some(7), None));
        assert!(!paging.has_more(stats(7, 10, 7), Some(7), None));
        // total неизвестен: полная страница значит, что может быть ещё.
        assert!(paging.has_more(stats(5, 5, 5), None, None));
        assert!(!paging.has_more(stats(3, 5, 3), None, None));
    }
}
