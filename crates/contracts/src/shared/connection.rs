//! Wire types for paginated, filterable list queries.
//!
//! Shaped after Relay-style connections: a page of nodes, an optional
//! total count and optional cursor information. Field names are camelCase
//! on the wire so GraphQL-style backends can be decoded directly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Page size argument.
pub const FIRST_KEY: &str = "first";
/// Continuation cursor argument (cursor paging only).
pub const AFTER_KEY: &str = "after";
/// Free-text search argument.
pub const QUERY_KEY: &str = "query";

/// Arguments passed to a connection query.
///
/// A flat JSON object: paging keys (`first`, `after`), the free-text
/// `query` and whatever keys the selected filters contribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryArguments(Map<String, Value>);

impl QueryArguments {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Copies every key of `other` into `self`, overwriting existing keys.
    pub fn merge(&mut self, other: &QueryArguments) {
        for (key, value) in other.0.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn first(&self) -> Option<usize> {
        self.0
            .get(FIRST_KEY)
            .and_then(Value::as_u64)
            .map(|v| v as usize)
    }

    pub fn after(&self) -> Option<&str> {
        self.0.get(AFTER_KEY).and_then(Value::as_str)
    }

    pub fn query(&self) -> Option<&str> {
        self.0.get(QUERY_KEY).and_then(Value::as_str)
    }

}

impl From<Map<String, Value>> for QueryArguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Cursor information reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// One response of a connection query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionPage<N> {
    pub nodes: Vec<N>,
    /// `None` when the backend does not know (or does not compute) the total.
    #[serde(default)]
    pub total_count: Option<usize>,
    /// Present only for cursor-paged connections.
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

impl<N> ConnectionPage<N> {
    pub fn new(nodes: Vec<N>) -> Self {
        Self {
            nodes,
            total_count: None,
            page_info: None,
        }
    }

    pub fn with_total_count(mut self, total_count: usize) -> Self {
        self.total_count = Some(total_count);
        self
    }

    pub fn with_page_info(mut self, has_next_page: bool, end_cursor: Option<&str>) -> Self {
        self.page_info = Some(PageInfo {
            has_next_page,
            end_cursor: end_cursor.map(str::to_string),
        });
        self
    }
}
