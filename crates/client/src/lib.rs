//! Search collaborator contracts for dashbrowse.
//!
//! This crate defines what the search-state core consumes from the outside
//! world: the row model, the backend query shape, result views with lazy
//! loading, and the `SearchService` trait. It also ships an in-memory
//! catalog service used by the CLI and a scriptable service for tests.

pub mod error;
pub mod memory;
pub mod metrics;
pub mod metrics_exporter;
pub mod models;
pub mod service;
pub mod view;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use error::{ClientError, Result};
pub use memory::{MemorySearchService, SORT_ALPHA_ASC, SORT_ALPHA_DESC};
pub use metrics::{ErrorCategory, SearchKind, SearchMetrics};
pub use metrics_exporter::{MetricsExporter, MetricsExporterError};
pub use models::{
    KIND_DASHBOARD, KIND_FOLDER, KIND_PANEL, Row, SearchQuery, SortOption, TermCount,
    WILDCARD_TERM,
};
pub use service::SearchService;
pub use view::{PagedRowView, QueryResponse, ResultView, RowView};
