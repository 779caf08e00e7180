//! Result views returned by search backends.
//!
//! Responsibilities:
//! - Define the `RowView` contract (random access, lazy loading).
//! - Provide `ResultView`, a cheaply cloneable handle whose identity is the
//!   identity of the underlying allocation.
//! - Provide `PagedRowView`, an in-memory view that materializes rows in pages.
//!
//! Invariants:
//! - Two `ResultView`s are the "same view" only if they share an allocation;
//!   equal contents in separate allocations are different views.
//! - `get(i)` returns `None` for rows that are not loaded yet, never panics.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt};

use crate::error::{ClientError, Result};
use crate::models::Row;

/// Row-indexable, possibly partially loaded result sequence.
pub trait RowView: Send + Sync {
    /// Total number of rows the backend reported, loaded or not.
    fn total_rows(&self) -> usize;

    /// Whether the row at `index` is materialized.
    fn is_item_loaded(&self, index: usize) -> bool;

    /// Materialize rows in `start..end`.
    fn load_more_items(&self, start: usize, end: usize) -> BoxFuture<'static, Result<()>>;

    /// The row at `index` if it is loaded.
    fn get(&self, index: usize) -> Option<Row>;

    /// Number of rows currently materialized (a prefix of the sequence).
    fn loaded_rows(&self) -> usize;
}

/// Shared handle to a backend view.
#[derive(Clone)]
pub struct ResultView(Arc<dyn RowView>);

impl ResultView {
    pub fn new(view: impl RowView + 'static) -> Self {
        Self(Arc::new(view))
    }

    /// Identity comparison: true only for handles to the same allocation.
    pub fn same_view(&self, other: &ResultView) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn total_rows(&self) -> usize {
        self.0.total_rows()
    }

    pub fn is_item_loaded(&self, index: usize) -> bool {
        self.0.is_item_loaded(index)
    }

    pub fn load_more_items(&self, start: usize, end: usize) -> BoxFuture<'static, Result<()>> {
        self.0.load_more_items(start, end)
    }

    pub fn get(&self, index: usize) -> Option<Row> {
        self.0.get(index)
    }

    pub fn loaded_rows(&self) -> usize {
        self.0.loaded_rows()
    }

    /// The `url` field of the row at `index`, if the row is loaded.
    pub fn url_at(&self, index: usize) -> Option<String> {
        self.get(index).map(|row| row.url)
    }

    /// Loaded rows in index order.
    pub fn loaded(&self) -> Vec<Row> {
        (0..self.loaded_rows()).filter_map(|i| self.get(i)).collect()
    }
}

impl fmt::Debug for ResultView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultView")
            .field("total_rows", &self.total_rows())
            .field("loaded_rows", &self.loaded_rows())
            .finish()
    }
}

/// Response of a search call.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub total_rows: usize,
    pub view: ResultView,
}

impl QueryResponse {
    pub fn new(view: ResultView) -> Self {
        Self {
            total_rows: view.total_rows(),
            view,
        }
    }

    /// A response over a fully loaded list of rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let page_size = rows.len().max(1);
        Self::new(ResultView::new(PagedRowView::new(rows, page_size)))
    }
}

/// In-memory view that exposes its rows one page at a time.
///
/// The first page is loaded on construction; later pages appear through
/// `load_more_items`, which mirrors how a remote view fills in while the
/// user scrolls.
pub struct PagedRowView {
    rows: Arc<Vec<Row>>,
    loaded: Arc<Mutex<usize>>,
    page_size: usize,
}

impl PagedRowView {
    pub fn new(rows: Vec<Row>, page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let loaded = page_size.min(rows.len());
        Self {
            rows: Arc::new(rows),
            loaded: Arc::new(Mutex::new(loaded)),
            page_size,
        }
    }

    fn loaded_count(&self) -> usize {
        *self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl RowView for PagedRowView {
    fn total_rows(&self) -> usize {
        self.rows.len()
    }

    fn is_item_loaded(&self, index: usize) -> bool {
        index < self.loaded_count()
    }

    fn load_more_items(&self, start: usize, end: usize) -> BoxFuture<'static, Result<()>> {
        let total = self.rows.len();
        let loaded = Arc::clone(&self.loaded);
        let page_size = self.page_size;
        async move {
            if start > end || start > total {
                return Err(ClientError::NotLoaded { start, end });
            }
            // Round up to a full page so partial requests still fill whole pages.
            let pages = end.div_ceil(page_size);
            let target = (pages * page_size).min(total);
            let mut guard = loaded.lock().unwrap_or_else(PoisonError::into_inner);
            if target > *guard {
                tracing::debug!(from = *guard, to = target, "loading more rows");
                *guard = target;
            }
            Ok(())
        }
        .boxed()
    }

    fn get(&self, index: usize) -> Option<Row> {
        if self.is_item_loaded(index) {
            self.rows.get(index).cloned()
        } else {
            None
        }
    }

    fn loaded_rows(&self) -> usize {
        self.loaded_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KIND_DASHBOARD;

    fn rows(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| Row {
                kind: KIND_DASHBOARD.to_string(),
                uid: format!("d{i}"),
                name: format!("Dashboard {i}"),
                url: format!("/d/d{i}"),
                tags: vec![],
                location: String::new(),
                panel_type: None,
                datasources: vec![],
            })
            .collect()
    }

    #[test]
    fn test_first_page_loaded_on_construction() {
        let view = PagedRowView::new(rows(25), 10);
        assert_eq!(view.total_rows(), 25);
        assert_eq!(view.loaded_rows(), 10);
        assert!(view.is_item_loaded(9));
        assert!(!view.is_item_loaded(10));
        assert!(view.get(10).is_none());
    }

    #[tokio::test]
    async fn test_load_more_rounds_up_to_page() {
        let view = PagedRowView::new(rows(25), 10);
        view.load_more_items(10, 12).await.unwrap();
        assert_eq!(view.loaded_rows(), 20);

        view.load_more_items(20, 100).await.unwrap();
        assert_eq!(view.loaded_rows(), 25);
        assert_eq!(view.get(24).unwrap().uid, "d24");
    }

    #[tokio::test]
    async fn test_load_more_rejects_inverted_range() {
        let view = PagedRowView::new(rows(5), 2);
        let err = view.load_more_items(4, 1).await.unwrap_err();
        assert!(matches!(err, ClientError::NotLoaded { start: 4, end: 1 }));
    }

    #[test]
    fn test_same_view_is_identity_not_equality() {
        let a = QueryResponse::from_rows(rows(3)).view;
        let b = QueryResponse::from_rows(rows(3)).view;
        let a2 = a.clone();

        assert!(a.same_view(&a2));
        assert!(!a.same_view(&b));
    }

    #[test]
    fn test_url_at() {
        let view = QueryResponse::from_rows(rows(2)).view;
        assert_eq!(view.url_at(1).as_deref(), Some("/d/d1"));
        assert_eq!(view.url_at(2), None);
    }

    #[test]
    fn test_empty_view() {
        let response = QueryResponse::from_rows(vec![]);
        assert_eq!(response.total_rows, 0);
        assert!(response.view.loaded().is_empty());
    }
}
