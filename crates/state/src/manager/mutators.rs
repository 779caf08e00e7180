//! View-facing mutators.
//!
//! Each mutator is a thin wrapper over `dispatch`; layout, sort and
//! include-sub-items changes also write the preference store.

use serde_json::Value;

use super::StateManager;
use crate::query::{Layout, QueryAction};
use crate::telemetry::EVENT_SEARCH_RESULT_CLICKED;

impl StateManager {
    pub fn on_query_change(&self, term: impl Into<String>) {
        self.dispatch(QueryAction::SetTerm(term.into()));
    }

    pub fn on_tag_add(&self, tag: impl Into<String>) {
        self.dispatch(QueryAction::AddTag(tag.into()));
    }

    pub fn on_tag_remove(&self, tag: impl Into<String>) {
        self.dispatch(QueryAction::RemoveTag(tag.into()));
    }

    /// Replace the tag filter.
    pub fn on_tag_filter_change(&self, tags: Vec<String>) {
        self.dispatch(QueryAction::SetTags(tags));
    }

    pub fn on_datasource_change(&self, datasource: Option<String>) {
        self.dispatch(QueryAction::SetDatasource(datasource));
    }

    pub fn on_panel_type_change(&self, panel_type: Option<String>) {
        self.dispatch(QueryAction::SetPanelType(panel_type));
    }

    pub fn on_starred_filter_change(&self, starred: bool) {
        self.dispatch(QueryAction::SetStarred(starred));
    }

    pub fn on_clear_starred(&self) {
        self.dispatch(QueryAction::SetStarred(false));
    }

    /// Change the sort. Clearing it also removes the stored preference.
    ///
    /// A sort picked under Folders switches to List; that layout is stored
    /// too, so the next session does not park the sort again.
    pub fn on_sort_change(&self, sort: Option<String>) {
        let sort = sort.filter(|s| !s.is_empty());
        self.shared.route.persist_sort(sort.as_deref());
        let previous = self.query_state().layout;
        self.dispatch(QueryAction::SetSort(sort));
        let layout = self.query_state().layout;
        if layout != previous {
            self.shared.route.persist_layout(layout);
        }
    }

    pub fn on_layout_change(&self, layout: Layout) {
        self.shared.route.persist_layout(layout);
        self.dispatch(QueryAction::SetLayout(layout));
    }

    pub fn on_set_include_sub_items(&self, include: bool) {
        self.shared.route.persist_include_sub_items(include);
        self.dispatch(QueryAction::SetIncludeSubItems(include));
    }

    pub fn on_folder_scope_change(&self, folder_uid: Option<String>) {
        self.dispatch(QueryAction::SetFolderScope(folder_uid));
    }

    pub fn on_clear_filters(&self) {
        self.dispatch(QueryAction::ClearFilters);
    }

    /// Report a click on the result at `position`. Does not search.
    pub fn on_search_item_clicked(&self, item_kind: &str, position: usize) {
        let mut properties = self.query_properties();
        properties.insert("item_kind".to_string(), Value::from(item_kind));
        properties.insert("position".to_string(), Value::from(position));
        self.report(EVENT_SEARCH_RESULT_CLICKED, &properties);
    }
}
