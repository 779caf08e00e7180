//! Query state and its transitions.
//!
//! Responsibilities:
//! - Define `QueryState`, the canonical shape of what the user is asking for.
//! - Define `QueryAction` and the single transition function `QueryState::apply`.
//! - Normalize invalid layout combinations at read time.
//!
//! Does NOT handle:
//! - Building backend queries (see `derive`).
//! - Route or preference I/O (see `route`).
//!
//! Invariants:
//! - `Layout::Folders` cannot express a filtered view; `effective_layout()`
//!   reports `List` whenever a filter is active. The stored layout is kept so
//!   clearing the filters brings Folders back.
//! - Switching to Folders parks `sort` in `prev_sort`; leaving Folders
//!   restores it when no sort is set.
//! - `tags` keeps insertion order and never holds duplicates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How results are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Folders,
    List,
    Grid,
}

impl Layout {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Layout::Folders => "folders",
            Layout::List => "list",
            Layout::Grid => "grid",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a layout name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLayout(pub String);

impl fmt::Display for UnknownLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown layout '{}' (expected folders, list or grid)", self.0)
    }
}

impl std::error::Error for UnknownLayout {}

impl FromStr for Layout {
    type Err = UnknownLayout;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "folders" => Ok(Layout::Folders),
            "list" => Ok(Layout::List),
            "grid" => Ok(Layout::Grid),
            _ => Err(UnknownLayout(s.to_string())),
        }
    }
}

/// What the user is asking for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    /// Free text; empty means "everything".
    pub term: String,
    pub tags: Vec<String>,
    pub datasource: Option<String>,
    pub panel_type: Option<String>,
    pub starred: bool,
    /// Folder uid restricting results to a subtree.
    pub folder_scope: Option<String>,
    pub sort: Option<String>,
    /// Sort parked while the Folders layout is shown. Never serialized to routes.
    pub prev_sort: Option<String>,
    pub layout: Layout,
    pub include_sub_items: bool,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            term: String::new(),
            tags: Vec::new(),
            datasource: None,
            panel_type: None,
            starred: false,
            folder_scope: None,
            sort: None,
            prev_sort: None,
            layout: Layout::default(),
            include_sub_items: true,
        }
    }
}

impl QueryState {
    /// Whether any filter that Folders cannot express is active.
    pub fn has_filters(&self) -> bool {
        !self.term.is_empty()
            || !self.tags.is_empty()
            || self.datasource.is_some()
            || self.panel_type.is_some()
            || self.starred
            || self.sort.is_some()
    }

    /// The layout the view should render.
    pub fn effective_layout(&self) -> Layout {
        if self.layout == Layout::Folders && self.has_filters() {
            Layout::List
        } else {
            self.layout
        }
    }

    /// A copy with the layout normalized for reading.
    pub fn normalized(&self) -> QueryState {
        QueryState {
            layout: self.effective_layout(),
            ..self.clone()
        }
    }

    /// Apply one transition.
    pub fn apply(&mut self, action: QueryAction) {
        match action {
            QueryAction::SetTerm(term) => self.term = term,
            QueryAction::AddTag(tag) => {
                if !tag.is_empty() && !self.tags.contains(&tag) {
                    self.tags.push(tag);
                }
            }
            QueryAction::RemoveTag(tag) => self.tags.retain(|t| *t != tag),
            QueryAction::SetTags(tags) => self.tags = dedup_tags(tags),
            QueryAction::SetDatasource(datasource) => self.datasource = non_empty(datasource),
            QueryAction::SetPanelType(panel_type) => self.panel_type = non_empty(panel_type),
            QueryAction::SetStarred(starred) => self.starred = starred,
            QueryAction::SetSort(sort) => self.set_sort(non_empty(sort)),
            QueryAction::SetLayout(layout) => self.set_layout(layout),
            QueryAction::SetFolderScope(folder) => self.folder_scope = non_empty(folder),
            QueryAction::SetIncludeSubItems(include) => self.include_sub_items = include,
            QueryAction::ClearFilters => {
                self.term.clear();
                self.tags.clear();
                self.datasource = None;
                self.panel_type = None;
                self.starred = false;
                self.sort = None;
            }
            QueryAction::Merge(patch) => patch.merge_into(self),
        }
    }

    fn set_sort(&mut self, sort: Option<String>) {
        if sort.is_some() && self.layout == Layout::Folders {
            // A sort is a filter; Folders cannot show it.
            self.layout = Layout::List;
        }
        self.prev_sort = None;
        self.sort = sort;
    }

    fn set_layout(&mut self, layout: Layout) {
        if layout == Layout::Folders {
            if let Some(sort) = self.sort.take() {
                self.prev_sort = Some(sort);
            }
        } else if self.layout == Layout::Folders && self.sort.is_none() {
            self.sort = self.prev_sort.take();
        }
        self.layout = layout;
    }
}

/// A transition of `QueryState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryAction {
    SetTerm(String),
    AddTag(String),
    RemoveTag(String),
    SetTags(Vec<String>),
    SetDatasource(Option<String>),
    SetPanelType(Option<String>),
    SetStarred(bool),
    SetSort(Option<String>),
    SetLayout(Layout),
    SetFolderScope(Option<String>),
    SetIncludeSubItems(bool),
    /// Clear term, tags, datasource, panel type, starred and sort.
    ClearFilters,
    /// Overwrite the fields present in the patch, without the sort/layout coupling.
    Merge(QueryPatch),
}

/// A partial `QueryState`.
///
/// `None` leaves a field untouched. For clearable fields, `Some(None)` clears.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryPatch {
    pub term: Option<String>,
    pub tags: Option<Vec<String>>,
    pub datasource: Option<Option<String>>,
    pub panel_type: Option<Option<String>>,
    pub starred: Option<bool>,
    pub folder_scope: Option<Option<String>>,
    pub sort: Option<Option<String>>,
    pub layout: Option<Layout>,
    pub include_sub_items: Option<bool>,
}

impl QueryPatch {
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn merge_into(self, state: &mut QueryState) {
        if let Some(term) = self.term {
            state.term = term;
        }
        if let Some(tags) = self.tags {
            state.tags = dedup_tags(tags);
        }
        if let Some(datasource) = self.datasource {
            state.datasource = non_empty(datasource);
        }
        if let Some(panel_type) = self.panel_type {
            state.panel_type = non_empty(panel_type);
        }
        if let Some(starred) = self.starred {
            state.starred = starred;
        }
        if let Some(folder) = self.folder_scope {
            state.folder_scope = non_empty(folder);
        }
        if let Some(sort) = self.sort {
            state.sort = non_empty(sort);
        }
        if let Some(layout) = self.layout {
            state.layout = layout;
        }
        if let Some(include) = self.include_sub_items {
            state.include_sub_items = include;
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(sort: &str) -> QueryState {
        QueryState {
            sort: Some(sort.to_string()),
            layout: Layout::List,
            ..QueryState::default()
        }
    }

    #[test]
    fn test_default_state() {
        let state = QueryState::default();
        assert_eq!(state.layout, Layout::Folders);
        assert!(state.include_sub_items);
        assert!(!state.has_filters());
    }

    #[test]
    fn test_folders_normalized_to_list_when_filtered() {
        let mut state = QueryState::default();
        state.apply(QueryAction::SetTerm("cpu".to_string()));
        assert_eq!(state.layout, Layout::Folders);
        assert_eq!(state.effective_layout(), Layout::List);
        assert_eq!(state.normalized().layout, Layout::List);

        state.apply(QueryAction::SetTerm(String::new()));
        assert_eq!(state.effective_layout(), Layout::Folders);
    }

    #[test]
    fn test_grid_not_normalized() {
        let state = QueryState {
            layout: Layout::Grid,
            starred: true,
            ..QueryState::default()
        };
        assert_eq!(state.effective_layout(), Layout::Grid);
    }

    #[test]
    fn test_folders_parks_sort_and_list_restores_it() {
        let mut state = sorted("alpha-asc");
        state.apply(QueryAction::SetLayout(Layout::Folders));
        assert_eq!(state.layout, Layout::Folders);
        assert_eq!(state.sort, None);
        assert_eq!(state.prev_sort.as_deref(), Some("alpha-asc"));

        state.apply(QueryAction::SetLayout(Layout::List));
        assert_eq!(state.sort.as_deref(), Some("alpha-asc"));
        assert_eq!(state.prev_sort, None);
    }

    #[test]
    fn test_leaving_folders_keeps_explicit_sort() {
        let mut state = QueryState {
            prev_sort: Some("alpha-desc".to_string()),
            ..QueryState::default()
        };
        state.sort = Some("views".to_string());
        state.apply(QueryAction::SetLayout(Layout::Grid));
        assert_eq!(state.sort.as_deref(), Some("views"));
        assert_eq!(state.prev_sort.as_deref(), Some("alpha-desc"));
    }

    #[test]
    fn test_sort_in_folders_switches_to_list() {
        let mut state = QueryState::default();
        state.apply(QueryAction::SetSort(Some("alpha-desc".to_string())));
        assert_eq!(state.layout, Layout::List);
        assert_eq!(state.sort.as_deref(), Some("alpha-desc"));

        state.apply(QueryAction::SetSort(None));
        assert_eq!(state.sort, None);
        assert_eq!(state.layout, Layout::List);
    }

    #[test]
    fn test_tags_unique_and_ordered() {
        let mut state = QueryState::default();
        for tag in ["b", "a", "b", ""] {
            state.apply(QueryAction::AddTag(tag.to_string()));
        }
        assert_eq!(state.tags, vec!["b", "a"]);

        state.apply(QueryAction::RemoveTag("b".to_string()));
        assert_eq!(state.tags, vec!["a"]);

        state.apply(QueryAction::SetTags(vec!["x".into(), "x".into(), "y".into()]));
        assert_eq!(state.tags, vec!["x", "y"]);
    }

    #[test]
    fn test_clear_filters_keeps_layout_scope_and_sub_items() {
        let mut state = QueryState {
            term: "cpu".to_string(),
            tags: vec!["prod".to_string()],
            datasource: Some("prom".to_string()),
            panel_type: Some("graph".to_string()),
            starred: true,
            sort: Some("alpha-asc".to_string()),
            folder_scope: Some("f1".to_string()),
            layout: Layout::Grid,
            include_sub_items: false,
            prev_sort: None,
        };
        state.apply(QueryAction::ClearFilters);
        assert!(!state.has_filters());
        assert_eq!(state.layout, Layout::Grid);
        assert_eq!(state.folder_scope.as_deref(), Some("f1"));
        assert!(!state.include_sub_items);
    }

    #[test]
    fn test_merge_patch() {
        let mut state = QueryState {
            datasource: Some("prom".to_string()),
            ..QueryState::default()
        };
        let patch = QueryPatch {
            term: Some("mem".to_string()),
            datasource: Some(None),
            starred: Some(true),
            ..QueryPatch::default()
        };
        state.apply(QueryAction::Merge(patch));
        assert_eq!(state.term, "mem");
        assert_eq!(state.datasource, None);
        assert!(state.starred);
        assert!(QueryPatch::default().is_empty());
    }

    #[test]
    fn test_empty_scalars_clear() {
        let mut state = QueryState::default();
        state.apply(QueryAction::SetDatasource(Some(String::new())));
        state.apply(QueryAction::SetFolderScope(Some(String::new())));
        assert_eq!(state.datasource, None);
        assert_eq!(state.folder_scope, None);
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!("GRID".parse::<Layout>(), Ok(Layout::Grid));
        assert_eq!(" list ".parse::<Layout>(), Ok(Layout::List));
        assert!("tiles".parse::<Layout>().is_err());
        assert_eq!(Layout::Folders.to_string(), "folders");
    }

    mod transitions {
        use super::*;
        use proptest::prelude::*;

        fn value() -> impl Strategy<Value = String> {
            prop_oneof![Just(String::new()), "[a-z ]{1,6}"]
        }

        fn layout() -> impl Strategy<Value = Layout> {
            prop_oneof![Just(Layout::Folders), Just(Layout::List), Just(Layout::Grid)]
        }

        fn action() -> impl Strategy<Value = QueryAction> {
            prop_oneof![
                value().prop_map(QueryAction::SetTerm),
                value().prop_map(QueryAction::AddTag),
                value().prop_map(QueryAction::RemoveTag),
                prop::collection::vec(value(), 0..3).prop_map(QueryAction::SetTags),
                proptest::option::of(value()).prop_map(QueryAction::SetDatasource),
                proptest::option::of(value()).prop_map(QueryAction::SetPanelType),
                any::<bool>().prop_map(QueryAction::SetStarred),
                proptest::option::of(value()).prop_map(QueryAction::SetSort),
                layout().prop_map(QueryAction::SetLayout),
                proptest::option::of(value()).prop_map(QueryAction::SetFolderScope),
                any::<bool>().prop_map(QueryAction::SetIncludeSubItems),
                Just(QueryAction::ClearFilters),
                (proptest::option::of(value()), proptest::option::of(layout())).prop_map(
                    |(term, layout)| QueryAction::Merge(QueryPatch {
                        term,
                        layout,
                        ..QueryPatch::default()
                    })
                ),
            ]
        }

        proptest! {
            #[test]
            fn folders_never_shown_with_filters(
                actions in prop::collection::vec(action(), 0..40)
            ) {
                let mut state = QueryState::default();
                for action in actions {
                    state.apply(action);
                    let shown = state.normalized();
                    if shown.layout == Layout::Folders {
                        prop_assert!(!shown.has_filters(), "folders shown for {:?}", shown);
                    }
                    let distinct: std::collections::HashSet<&String> = shown.tags.iter().collect();
                    prop_assert_eq!(distinct.len(), shown.tags.len());
                }
            }
        }
    }
}
