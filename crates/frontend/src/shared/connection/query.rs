//! Builds the arguments of one connection query from filters, search text and paging.

use contracts::shared::connection::{QueryArguments, AFTER_KEY, FIRST_KEY, QUERY_KEY};

/// Paging part of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingState {
    pub first: usize,
    /// Cursor paging only.
    pub after: Option<String>,
}

impl PagingState {
    pub fn first_page(first: usize) -> Self {
        Self { first, after: None }
    }
}

/// Everything in a query except paging. A change here resets the connection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseQuery {
    pub base_args: QueryArguments,
    pub filter_args: QueryArguments,
    pub search: Option<String>,
}

impl BaseQuery {
    pub fn new(base_args: QueryArguments, filter_args: QueryArguments, search_text: &str) -> Self {
        Self {
            base_args,
            filter_args,
            search: normalize_search(search_text),
        }
    }
}

/// Blank search text means "no search", not a match on the empty string.
pub fn normalize_search(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Merges caller-fixed args, filter args, search text and paging.
///
/// Precedence, lowest first: base args, filter args, search, paging. Filter
/// args can never clobber `query`, `first` or `after`.
pub fn compose(
    base_args: &QueryArguments,
    filter_args: &QueryArguments,
    search_text: &str,
    paging: &PagingState,
) -> QueryArguments {
    compose_base(
        &BaseQuery::new(base_args.clone(), filter_args.clone(), search_text),
        paging,
    )
}

pub fn compose_base(base: &BaseQuery, paging: &PagingState) -> QueryArguments {
    let mut args = base.base_args.clone();
    args.merge(&base.filter_args);

    match &base.search {
        Some(search) => {
            args.insert(QUERY_KEY, search.as_str());
        }
        None => {
            args.remove(QUERY_KEY);
        }
    }

    args.insert(FIRST_KEY, paging.first);
    match &paging.after {
        Some(cursor) => {
            args.insert(AFTER_KEY, cursor.as_str());
        }
        None => {
            args.remove(AFTER_KEY);
        }
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_search_omits_query() {
        let args = compose(
            &QueryArguments::new(),
            &QueryArguments::new(),
            "   ",
            &PagingState::first_page(10),
        );
        assert!(!args.contains_key(QUERY_KEY));
        assert_eq!(args.first(), Some(10));
        assert!(!args.contains_key(AFTER_KEY));
    }

    #[test]
    fn test_search_is_trimmed() {
        let args = compose(
            &QueryArguments::new(),
            &QueryArguments::new(),
            "  repo ",
            &PagingState::first_page(10),
        );
        assert_eq!(args.query(), Some("repo"));
    }

    #[test]
    fn test_filters_cannot_clobber_search_or_paging() {
        let filter_args = QueryArguments::new()
            .with(QUERY_KEY, "from-filter")
            .with(FIRST_KEY, 999)
            .with(AFTER_KEY, "bogus")
            .with("namespace", "org-1");
        let paging = PagingState {
            first: 5,
            after: Some("c1".to_string()),
        };
        let args = compose(&QueryArguments::new(), &filter_args, "needle", &paging);
        assert_eq!(args.query(), Some("needle"));
        assert_eq!(args.first(), Some(5));
        assert_eq!(args.after(), Some("c1"));
        assert_eq!(args.get("namespace"), Some(&json!("org-1")));
    }

    #[test]
    fn test_blank_search_drops_filter_supplied_query() {
        let filter_args = QueryArguments::new().with(QUERY_KEY, "from-filter");
        let args = compose(&QueryArguments::new(), &filter_args, "", &PagingState::first_page(3));
        assert_eq!(args.query(), None);
    }

    #[test]
    fn test_filter_args_override_base_args() {
        let base_args = QueryArguments::new().with("batchChange", "b1").with("state", "ALL");
        let filter_args = QueryArguments::new().with("state", "OPEN");
        let args = compose(&base_args, &filter_args, "", &PagingState::first_page(3));
        assert_eq!(args.get("batchChange"), Some(&json!("b1")));
        assert_eq!(args.get("state"), Some(&json!("OPEN")));
    }

    #[test]
    fn test_paging_change_keeps_base() {
        let base = BaseQuery::new(
            QueryArguments::new(),
            QueryArguments::new().with("state", "OPEN"),
            "needle",
        );
        let first = compose_base(&base, &PagingState::first_page(2));
        let next = compose_base(
            &base,
            &PagingState {
                first: 2,
                after: Some("c2".to_string()),
            },
        );
        assert_eq!(first.query(), next.query());
        assert_eq!(first.get("state"), next.get("state"));
        assert_eq!(next.after(), Some("c2"));
    }
}
