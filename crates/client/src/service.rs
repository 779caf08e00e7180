//! Search service contract consumed by the state core.
//!
//! Responsibilities:
//! - Define the `SearchService` trait (plain and starred search, tag and sort
//!   option lookups).
//!
//! Does NOT handle:
//! - Ordering of overlapping responses (the caller tags dispatches).
//! - Cancellation; dropping a returned future is the only cancellation the
//!   contract offers, and implementations may ignore it.

use futures::future::BoxFuture;

use crate::error::Result;
use crate::models::{SearchQuery, SortOption, TermCount};
use crate::view::QueryResponse;

/// A backend able to answer search queries.
///
/// Methods return boxed `'static` futures so implementations can be shared
/// as `Arc<dyn SearchService>` and the futures can be spawned.
pub trait SearchService: Send + Sync {
    /// Run a query over all items.
    fn search(&self, query: SearchQuery) -> BoxFuture<'static, Result<QueryResponse>>;

    /// Run a query restricted to the current user's starred items.
    fn search_starred(&self, query: SearchQuery) -> BoxFuture<'static, Result<QueryResponse>>;

    /// Tag facets for the rows matching `query`.
    fn tag_options(&self, query: SearchQuery) -> BoxFuture<'static, Result<Vec<TermCount>>>;

    /// Sorts the backend supports.
    fn sort_options(&self) -> BoxFuture<'static, Result<Vec<SortOption>>>;
}
