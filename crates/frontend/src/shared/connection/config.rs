use serde::{Deserialize, Serialize};

use super::filters::FilterDefinition;

pub const DEFAULT_FIRST: usize = 20;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u32 = 200;

/// Как "show more" увеличивает размер страницы в режиме offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageGrowth {
    #[default]
    Double,
    Increment(usize),
}

impl PageGrowth {
    pub fn grow(self, first: usize) -> usize {
        let grown = match self {
            PageGrowth::Double => first.saturating_mul(2),
            PageGrowth::Increment(step) => first.saturating_add(step),
        };
        // Нулевой шаг запрашивал бы одну и ту же страницу бесконечно.
        grown.max(first.saturating_add(1))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Следующая страница после `pageInfo.endCursor`; узлы накапливаются.
    #[default]
    Cursor,
    /// Страница побольше с начала; узлы заменяются.
    Offset {
        #[serde(default)]
        growth: PageGrowth,
    },
}

/// Статическая конфигурация списка.
///
/// После передачи в fetcher не меняется; замена равносильна полному сбросу.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub filters: Vec<FilterDefinition>,
    pub default_first: usize,
    pub paging: PagingMode,
    pub hide_search: bool,
    pub noun: String,
    /// `{noun}s`, если не задано.
    pub plural_noun: Option<String>,
    pub no_summary_if_all_nodes_visible: bool,
    pub no_show_more: bool,
    pub search_debounce_ms: u32,
    pub input_placeholder: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            default_first: DEFAULT_FIRST,
            paging: PagingMode::default(),
            hide_search: false,
            noun: "item".to_string(),
            plural_noun: None,
            no_summary_if_all_nodes_visible: false,
            no_show_more: false,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            input_placeholder: None,
        }
    }
}

impl ConnectionConfig {
    pub fn new(noun: impl Into<String>) -> Self {
        Self {
            noun: noun.into(),
            ..Self::default()
        }
    }

    pub fn with_filters(mut self, filters: Vec<FilterDefinition>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_default_first(mut self, first: usize) -> Self {
        self.default_first = first.max(1);
        self
    }

    pub fn cursor_paging(mut self) -> Self {
        self.paging = PagingMode::Cursor;
        self
    }

    pub fn offset_paging(mut self, growth: PageGrowth) -> Self {
        self.paging = PagingMode::Offset { growth };
        self
    }

    pub fn with_hide_search(mut self, hide: bool) -> Self {
        self.hide_search = hide;
        self
    }

    pub fn with_plural_noun(mut self, plural: impl Into<String>) -> Self {
        self.plural_noun = Some(plural.into());
        self
    }

    pub fn with_no_summary_if_all_nodes_visible(mut self, value: bool) -> Self {
        self.no_summary_if_all_nodes_visible = value;
        self
    }

    pub fn with_no_show_more(mut self, value: bool) -> Self {
        self.no_show_more = value;
        self
    }

    pub fn with_search_debounce_ms(mut self, ms: u32) -> Self {
        self.search_debounce_ms = ms;
        self
    }

    pub fn with_input_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.input_placeholder = Some(placeholder.into());
        self
    }

    pub fn plural_noun(&self) -> String {
        self.plural_noun
            .clone()
            .unwrap_or_else(|| format!("{}s", self.noun))
    }

    /// Существительное в форме для `count`.
    pub fn pluralize(&self, count: usize) -> String {
        if count == 1 {
            self.noun.clone()
        } else {
            self.plural_noun()
        }
    }

    pub fn placeholder(&self) -> String {
        self.input_placeholder
            .clone()
            .unwrap_or_else(|| format!("Filter {}...", self.plural_noun()))
    }
}
