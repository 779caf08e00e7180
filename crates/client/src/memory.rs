//! In-memory search service over a static catalog.
//!
//! Responsibilities:
//! - Load a catalog of rows from JSON and validate it.
//! - Answer `SearchQuery`s with the same filter semantics a remote backend
//!   applies (term, tags, kind, datasource, panel type, folder, starred).
//! - Serve results through `PagedRowView` so lazy loading is exercised.
//!
//! Does NOT handle:
//! - Relevance ranking; unsorted results keep catalog order.
//! - Persistence of stars; the starred set is fixed at construction.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use futures::future::{self, BoxFuture, FutureExt};
use serde::Deserialize;

use crate::error::{ClientError, Result};
use crate::models::{Row, SearchQuery, SortOption, TermCount};
use crate::service::SearchService;
use crate::view::{PagedRowView, QueryResponse, ResultView};

/// Sort value for ascending name order.
pub const SORT_ALPHA_ASC: &str = "alpha-asc";

/// Sort value for descending name order.
pub const SORT_ALPHA_DESC: &str = "alpha-desc";

/// Default page size for views produced by the memory service.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// On-disk catalog layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    rows: Vec<Row>,
    #[serde(default)]
    starred: Vec<String>,
}

#[derive(Debug)]
struct Catalog {
    rows: Vec<Row>,
    starred: HashSet<String>,
}

/// Search service answering from a fixed list of rows.
#[derive(Debug, Clone)]
pub struct MemorySearchService {
    catalog: Arc<Catalog>,
    page_size: usize,
}

impl MemorySearchService {
    /// Build a service over `rows` with the given starred uids.
    pub fn new(rows: Vec<Row>, starred: impl IntoIterator<Item = String>) -> Result<Self> {
        validate_rows(&rows)?;
        Ok(Self {
            catalog: Arc::new(Catalog {
                rows,
                starred: starred.into_iter().collect(),
            }),
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Load a catalog from a JSON file of the form `{"rows": [...], "starred": [...]}`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::new(file.rows, file.starred)
    }

    /// Set how many rows each produced view materializes per page.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn rows(&self) -> &[Row] {
        &self.catalog.rows
    }

    fn matching(&self, query: &SearchQuery, starred_only: bool) -> Vec<Row> {
        let mut rows: Vec<Row> = self
            .catalog
            .rows
            .iter()
            .filter(|row| !starred_only || self.catalog.starred.contains(&row.uid))
            .filter(|row| matches_query(row, query))
            .cloned()
            .collect();
        sort_rows(&mut rows, query.sort.as_deref());
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        rows
    }

    fn respond(&self, query: &SearchQuery, starred_only: bool) -> QueryResponse {
        let rows = self.matching(query, starred_only);
        tracing::debug!(
            query = %query.query,
            starred_only,
            hits = rows.len(),
            "memory search"
        );
        QueryResponse::new(ResultView::new(PagedRowView::new(rows, self.page_size)))
    }
}

impl SearchService for MemorySearchService {
    fn search(&self, query: SearchQuery) -> BoxFuture<'static, Result<QueryResponse>> {
        future::ready(Ok(self.respond(&query, false))).boxed()
    }

    fn search_starred(&self, query: SearchQuery) -> BoxFuture<'static, Result<QueryResponse>> {
        future::ready(Ok(self.respond(&query, true))).boxed()
    }

    fn tag_options(&self, query: SearchQuery) -> BoxFuture<'static, Result<Vec<TermCount>>> {
        // Facets describe the unfiltered-by-tag result set.
        let query = SearchQuery {
            tags: Vec::new(),
            limit: None,
            ..query
        };
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for row in self.matching(&query, false) {
            for tag in row.tags {
                *counts.entry(tag).or_default() += 1;
            }
        }
        let options = counts
            .into_iter()
            .map(|(term, count)| TermCount { term, count })
            .collect();
        future::ready(Ok(options)).boxed()
    }

    fn sort_options(&self) -> BoxFuture<'static, Result<Vec<SortOption>>> {
        future::ready(Ok(vec![
            SortOption::new(SORT_ALPHA_ASC, "Alphabetically (A–Z)"),
            SortOption::new(SORT_ALPHA_DESC, "Alphabetically (Z–A)"),
        ]))
        .boxed()
    }
}

fn validate_rows(rows: &[Row]) -> Result<()> {
    let mut seen = HashSet::new();
    for (index, row) in rows.iter().enumerate() {
        if row.uid.trim().is_empty() {
            return Err(ClientError::InvalidCatalog(format!(
                "row {index} has an empty uid"
            )));
        }
        if row.kind.trim().is_empty() {
            return Err(ClientError::InvalidCatalog(format!(
                "row {index} ({}) has an empty kind",
                row.uid
            )));
        }
        if !seen.insert((row.kind.as_str(), row.uid.as_str())) {
            return Err(ClientError::InvalidCatalog(format!(
                "duplicate {} uid {}",
                row.kind, row.uid
            )));
        }
    }
    Ok(())
}

fn matches_query(row: &Row, query: &SearchQuery) -> bool {
    if !query.accepts_kind(&row.kind) {
        return false;
    }
    if !query.is_wildcard() && !query.query.is_empty() {
        let needle = query.query.to_lowercase();
        if !row.name.to_lowercase().contains(&needle) {
            return false;
        }
    }
    if !query.tags.iter().all(|tag| row.tags.contains(tag)) {
        return false;
    }
    if let Some(ds) = &query.ds_uid
        && !row.datasources.iter().any(|d| d == ds)
    {
        return false;
    }
    if let Some(panel_type) = &query.panel_type
        && row.panel_type.as_deref() != Some(panel_type.as_str())
    {
        return false;
    }
    if let Some(location) = &query.location
        && !row.is_within(location)
    {
        return false;
    }
    true
}

fn sort_rows(rows: &mut [Row], sort: Option<&str>) {
    let by_name = |a: &Row, b: &Row| -> Ordering {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.uid.cmp(&b.uid))
    };
    match sort {
        Some(SORT_ALPHA_ASC) => rows.sort_by(by_name),
        Some(SORT_ALPHA_DESC) => rows.sort_by(|a, b| by_name(b, a)),
        Some(other) => {
            tracing::debug!(sort = other, "unknown sort, keeping catalog order");
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KIND_DASHBOARD, KIND_FOLDER, KIND_PANEL, container_kinds};

    fn row(kind: &str, uid: &str, name: &str, location: &str, tags: &[&str]) -> Row {
        Row {
            kind: kind.to_string(),
            uid: uid.to_string(),
            name: name.to_string(),
            url: format!("/{kind}/{uid}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            location: location.to_string(),
            panel_type: None,
            datasources: vec![],
        }
    }

    fn service() -> MemorySearchService {
        let mut panel = row(KIND_PANEL, "p1", "Latency graph", "f1", &["prod"]);
        panel.panel_type = Some("timeseries".to_string());
        panel.datasources = vec!["prom".to_string()];
        MemorySearchService::new(
            vec![
                row(KIND_FOLDER, "f1", "Operations", "", &[]),
                row(KIND_DASHBOARD, "d2", "node exporter", "f1", &["prod", "linux"]),
                row(KIND_DASHBOARD, "d1", "API latency", "", &["prod"]),
                panel,
            ],
            vec!["d1".to_string()],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_term_is_case_insensitive_substring() {
        let response = service()
            .search(SearchQuery {
                query: "LATENCY".to_string(),
                ..SearchQuery::default()
            })
            .await
            .unwrap();
        let uids: Vec<_> = response.view.loaded().into_iter().map(|r| r.uid).collect();
        assert_eq!(uids, vec!["d1", "p1"]);
    }

    #[tokio::test]
    async fn test_kind_filter_and_sort() {
        let response = service()
            .search(SearchQuery {
                query: "*".to_string(),
                kind: Some(container_kinds()),
                sort: Some(SORT_ALPHA_ASC.to_string()),
                ..SearchQuery::default()
            })
            .await
            .unwrap();
        let names: Vec<_> = response.view.loaded().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["API latency", "node exporter", "Operations"]);
    }

    #[tokio::test]
    async fn test_starred_only() {
        let response = service()
            .search_starred(SearchQuery::browse_all())
            .await
            .unwrap();
        assert_eq!(response.total_rows, 1);
        assert_eq!(response.view.get(0).unwrap().uid, "d1");
    }

    #[tokio::test]
    async fn test_location_panel_type_and_datasource_filters() {
        let svc = service();
        let in_folder = svc
            .search(SearchQuery {
                query: "*".to_string(),
                location: Some("f1".to_string()),
                ..SearchQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(in_folder.total_rows, 2);

        let panels = svc
            .search(SearchQuery {
                query: "*".to_string(),
                panel_type: Some("timeseries".to_string()),
                ds_uid: Some("prom".to_string()),
                ..SearchQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(panels.total_rows, 1);
    }

    #[tokio::test]
    async fn test_tag_options_ignore_tag_filter() {
        let options = service()
            .tag_options(SearchQuery {
                query: "*".to_string(),
                tags: vec!["linux".to_string()],
                kind: Some(container_kinds()),
                ..SearchQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(
            options,
            vec![
                TermCount {
                    term: "linux".to_string(),
                    count: 1
                },
                TermCount {
                    term: "prod".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_duplicate_uid_rejected() {
        let err = MemorySearchService::new(
            vec![
                row(KIND_DASHBOARD, "d1", "a", "", &[]),
                row(KIND_DASHBOARD, "d1", "b", "", &[]),
            ],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, ClientError::InvalidCatalog(_)));
    }

    #[test]
    fn test_from_json_str() {
        let svc = MemorySearchService::from_json_str(
            r#"{"rows":[{"kind":"folder","uid":"f1","name":"Ops","url":"/f/f1"}],"starred":["f1"]}"#,
        )
        .unwrap();
        assert_eq!(svc.rows().len(), 1);
    }
}
