//! Списки с пагинацией и фильтрами: реестр фильтров, сборка запроса,
//! пагинация, машина состояний загрузки и привязанные к ней компоненты.

pub mod component;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod filters;
pub mod http;
pub mod paging;
pub mod query;
pub mod state;
pub mod summary;

pub use component::FilteredConnection;
pub use config::{ConnectionConfig, PageGrowth, PagingMode};
pub use error::ConnectionError;
pub use fetcher::{ConnectionFetcher, FetchOutcome, PendingFetch, QueryConnection, SubscriptionId};
pub use filters::{FilterDefinition, FilterRegistry, FilterSelections, FilterValue};
pub use state::{ConnectionState, LoadKind, Phase};
pub use summary::ConnectionNodesSummary;
