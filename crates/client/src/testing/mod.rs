//! Testing utilities for code that consumes a search service.
//!
//! This module provides a scriptable `SearchService` whose responses can be
//! produced immediately or released by the test in any order, plus a
//! deterministic catalog generator.
//! Available when running tests or when the `test-utils` feature is enabled.
//!
//! # Example
//! ```ignore
//! use dashbrowse_client::testing::{ScriptedSearchService, generators::CatalogGenerator};
//!
//! let rows = CatalogGenerator::new().with_folders(2).with_dashboards_per_folder(3).generate();
//! let service = ScriptedSearchService::manual();
//! // ... dispatch two searches, then release them out of order:
//! service.respond(1, Ok(QueryResponse::from_rows(rows.clone())));
//! service.respond(0, Ok(QueryResponse::from_rows(rows)));
//! ```

pub mod generators;

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{self, BoxFuture, FutureExt};
use tokio::sync::oneshot;

use crate::error::{ClientError, Result};
use crate::models::{Row, SearchQuery, SortOption, TermCount};
use crate::service::SearchService;
use crate::view::QueryResponse;

/// A search call observed by the scripted service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub query: SearchQuery,
    pub starred: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Answer every call immediately from `rows`.
    Auto,
    /// Park every call until the test releases it.
    Manual,
}

struct ScriptState {
    mode: Mode,
    rows: Vec<Row>,
    calls: Vec<RecordedCall>,
    failures: VecDeque<String>,
    pending: BTreeMap<usize, oneshot::Sender<Result<QueryResponse>>>,
    tag_lookups: Vec<SearchQuery>,
}

/// Search service driven by the test.
#[derive(Clone)]
pub struct ScriptedSearchService {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedSearchService {
    fn with_mode(mode: Mode, rows: Vec<Row>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScriptState {
                mode,
                rows,
                calls: Vec::new(),
                failures: VecDeque::new(),
                pending: BTreeMap::new(),
                tag_lookups: Vec::new(),
            })),
        }
    }

    /// Answer every call immediately with a fresh view over `rows`.
    pub fn auto(rows: Vec<Row>) -> Self {
        Self::with_mode(Mode::Auto, rows)
    }

    /// Park every call until [`Self::respond`] releases it.
    pub fn manual() -> Self {
        Self::with_mode(Mode::Manual, Vec::new())
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next auto-answered call fail with a backend error.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.lock().failures.push_back(message.into());
    }

    /// Replace the rows auto-answered calls return.
    pub fn set_rows(&self, rows: Vec<Row>) {
        self.lock().rows = rows;
    }

    /// Every search call observed so far, in call order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Queries passed to `tag_options`.
    pub fn tag_lookups(&self) -> Vec<SearchQuery> {
        self.lock().tag_lookups.clone()
    }

    /// Number of parked calls not yet released.
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Release parked call `index` (0-based call order) with `result`.
    ///
    /// Returns false if no such call is parked.
    pub fn respond(&self, index: usize, result: Result<QueryResponse>) -> bool {
        let sender = self.lock().pending.remove(&index);
        match sender {
            Some(tx) => tx.send(result).is_ok(),
            None => false,
        }
    }

    fn dispatch(&self, query: SearchQuery, starred: bool) -> BoxFuture<'static, Result<QueryResponse>> {
        let mut state = self.lock();
        let index = state.calls.len();
        state.calls.push(RecordedCall { query, starred });

        match state.mode {
            Mode::Auto => {
                let result = match state.failures.pop_front() {
                    Some(message) => Err(ClientError::Backend {
                        status: 500,
                        message,
                    }),
                    None => Ok(QueryResponse::from_rows(state.rows.clone())),
                };
                future::ready(result).boxed()
            }
            Mode::Manual => {
                let (tx, rx) = oneshot::channel();
                state.pending.insert(index, tx);
                async move { rx.await.unwrap_or(Err(ClientError::Abandoned)) }.boxed()
            }
        }
    }
}

impl SearchService for ScriptedSearchService {
    fn search(&self, query: SearchQuery) -> BoxFuture<'static, Result<QueryResponse>> {
        self.dispatch(query, false)
    }

    fn search_starred(&self, query: SearchQuery) -> BoxFuture<'static, Result<QueryResponse>> {
        self.dispatch(query, true)
    }

    fn tag_options(&self, query: SearchQuery) -> BoxFuture<'static, Result<Vec<TermCount>>> {
        let mut state = self.lock();
        state.tag_lookups.push(query);
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for tag in state.rows.iter().flat_map(|row| row.tags.iter()) {
            *counts.entry(tag.clone()).or_default() += 1;
        }
        let options = counts
            .into_iter()
            .map(|(term, count)| TermCount { term, count })
            .collect();
        future::ready(Ok(options)).boxed()
    }

    fn sort_options(&self) -> BoxFuture<'static, Result<Vec<SortOption>>> {
        future::ready(Ok(vec![
            SortOption::new("alpha-asc", "Alphabetically (A–Z)"),
            SortOption::new("alpha-desc", "Alphabetically (Z–A)"),
        ]))
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use generators::CatalogGenerator;

    #[tokio::test]
    async fn test_auto_mode_answers_and_records() {
        let service = ScriptedSearchService::auto(CatalogGenerator::new().generate());
        service.fail_next("boom");

        let first = service.search(SearchQuery::browse_all()).await;
        assert!(matches!(first, Err(ClientError::Backend { status: 500, .. })));

        let second = service.search_starred(SearchQuery::browse_all()).await.unwrap();
        assert!(second.total_rows > 0);

        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        assert!(!calls[0].starred);
        assert!(calls[1].starred);
    }

    #[tokio::test]
    async fn test_manual_mode_releases_out_of_order() {
        let service = ScriptedSearchService::manual();
        let first = service.search(SearchQuery::default());
        let second = service.search(SearchQuery::browse_all());
        assert_eq!(service.pending_count(), 2);

        assert!(service.respond(1, Ok(QueryResponse::from_rows(vec![]))));
        assert!(second.await.is_ok());

        assert!(service.respond(0, Err(ClientError::Timeout(std::time::Duration::from_secs(1)))));
        assert!(matches!(first.await, Err(ClientError::Timeout(_))));
        assert!(!service.respond(0, Ok(QueryResponse::from_rows(vec![]))));
    }

    #[test]
    fn test_manual_call_stays_pending_until_released() {
        use tokio_test::{assert_pending, assert_ready_ok, task};

        let service = ScriptedSearchService::manual();
        let mut call = task::spawn(service.search(SearchQuery::default()));
        assert_pending!(call.poll());

        assert!(service.respond(0, Ok(QueryResponse::from_rows(vec![]))));
        assert!(call.is_woken());
        let response = assert_ready_ok!(call.poll());
        assert_eq!(response.total_rows, 0);
    }

    #[tokio::test]
    async fn test_dropping_service_state_abandons_call() {
        let service = ScriptedSearchService::manual();
        let call = service.search(SearchQuery::default());
        service.lock().pending.clear();
        assert!(matches!(call.await, Err(ClientError::Abandoned)));
    }
}
