use thiserror::Error;

/// Ошибки списка.
///
/// Каждая относится к одному экземпляру списка и не роняет страницу.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("Failed to load: {0}")]
    FetchFailed(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Unknown value {value:?} for filter {filter:?}")]
    UnknownFilterValue { filter: String, value: String },

    #[error("Invalid filter configuration: {0}")]
    InvalidFilters(String),
}

impl ConnectionError {
    /// Оборачивает произвольную ошибку функции запроса.
    pub fn fetch_failed(err: impl std::fmt::Display) -> Self {
        Self::FetchFailed(err.to_string())
    }
}
