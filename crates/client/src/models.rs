//! Data models shared between the search core and its backends.
//!
//! Responsibilities:
//! - Define the row shape every result view exposes (`Row`).
//! - Define the backend query (`SearchQuery`) the core derives from user state.
//! - Define auxiliary option types (`TermCount`, `SortOption`).
//!
//! Does NOT handle:
//! - Deriving queries from user state (see `dashbrowse-state`).
//! - Executing queries (see `service.rs` and `memory.rs`).

use serde::{Deserialize, Serialize};

/// Kind of a container item that holds dashboards.
pub const KIND_FOLDER: &str = "folder";

/// Kind of a dashboard item.
pub const KIND_DASHBOARD: &str = "dashboard";

/// Kind of a panel item (lives inside a dashboard).
pub const KIND_PANEL: &str = "panel";

/// Term that matches everything.
pub const WILDCARD_TERM: &str = "*";

/// Kinds returned when panels must be excluded.
pub fn container_kinds() -> Vec<String> {
    vec![KIND_DASHBOARD.to_string(), KIND_FOLDER.to_string()]
}

/// Kinds returned when only panels are wanted.
pub fn panel_kinds() -> Vec<String> {
    vec![KIND_PANEL.to_string()]
}

/// A single result row.
///
/// `(kind, uid)` is stable across pages and re-sorts and is the key the
/// selection model correlates on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub kind: String,
    pub uid: String,
    pub name: String,
    /// Navigation target, possibly prefixed with the application base path.
    pub url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Slash separated chain of ancestor folder uids (empty at the root).
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub datasources: Vec<String>,
}

impl Row {
    /// Folder uids this row is nested under, outermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.location.split('/').filter(|s| !s.is_empty())
    }

    /// Whether this row lives (directly or transitively) under `folder_uid`.
    pub fn is_within(&self, folder_uid: &str) -> bool {
        self.ancestors().any(|uid| uid == folder_uid)
    }
}

/// Query sent to a search backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free text; `*` matches everything.
    pub query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Restrict to these kinds; `None` means every kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ds_uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_type: Option<String>,
    /// Folder uid restricting results to a subtree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// The query used for auxiliary lookups before anything was dispatched.
    pub fn browse_all() -> Self {
        Self {
            query: WILDCARD_TERM.to_string(),
            kind: Some(container_kinds()),
            ..Self::default()
        }
    }

    /// Whether this query matches everything textually.
    pub fn is_wildcard(&self) -> bool {
        self.query == WILDCARD_TERM
    }

    /// Whether `kind` passes this query's kind filter.
    pub fn accepts_kind(&self, kind: &str) -> bool {
        self.kind
            .as_ref()
            .is_none_or(|kinds| kinds.iter().any(|k| k == kind))
    }
}

/// A tag and how many matching rows carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// A sort the backend understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOption {
    /// Value placed in `SearchQuery::sort`.
    pub value: String,
    pub label: String,
}

impl SortOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(location: &str) -> Row {
        Row {
            kind: KIND_DASHBOARD.to_string(),
            uid: "d1".to_string(),
            name: "CPU".to_string(),
            url: "/d/d1".to_string(),
            tags: vec![],
            location: location.to_string(),
            panel_type: None,
            datasources: vec![],
        }
    }

    #[test]
    fn test_row_is_within_nested_location() {
        let r = row("f1/f2");
        assert!(r.is_within("f1"));
        assert!(r.is_within("f2"));
        assert!(!r.is_within("f3"));
        assert!(!row("").is_within("f1"));
    }

    #[test]
    fn test_accepts_kind() {
        let mut q = SearchQuery::default();
        assert!(q.accepts_kind(KIND_PANEL));

        q.kind = Some(container_kinds());
        assert!(q.accepts_kind(KIND_FOLDER));
        assert!(!q.accepts_kind(KIND_PANEL));
    }

    #[test]
    fn test_browse_all_excludes_panels() {
        let q = SearchQuery::browse_all();
        assert!(q.is_wildcard());
        assert_eq!(q.kind, Some(container_kinds()));
    }

    #[test]
    fn test_row_deserializes_with_defaults() {
        let r: Row = serde_json::from_str(
            r#"{"kind":"folder","uid":"f1","name":"Ops","url":"/dashboards/f/f1"}"#,
        )
        .unwrap();
        assert!(r.tags.is_empty());
        assert_eq!(r.location, "");
        assert_eq!(r.panel_type, None);
    }
}
