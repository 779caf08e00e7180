//! Selection model.
//!
//! Tracks which `(kind, id)` pairs are checked. Updates consume the model and
//! return the next one, so a snapshot taken before a bulk action stays intact.
//!
//! Invariants:
//! - Only kinds with at least one selected id are present; removing the last
//!   id of a kind removes the kind.
//! - Unknown kinds or ids are simply "not selected".
//! - Result changes never touch the selection.

use std::collections::{BTreeMap, BTreeSet};

use dashbrowse_client::{KIND_FOLDER, ResultView};
use serde::Serialize;

/// Wildcard accepted by `is_selected` for both kind and id.
pub const ANY: &str = "*";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SelectionModel {
    items: BTreeMap<String, BTreeSet<String>>,
}

/// A transition of `SelectionModel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    Toggle {
        kind: String,
        id: String,
        selected: bool,
    },
    SelectMany {
        kind: String,
        ids: Vec<String>,
        selected: bool,
    },
    Clear,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership query. `id == "*"` asks whether anything of `kind` is
    /// selected; `kind == "*"` searches every kind.
    pub fn is_selected(&self, kind: &str, id: &str) -> bool {
        if kind == ANY {
            if id == ANY {
                return !self.items.is_empty();
            }
            return self.items.values().any(|ids| ids.contains(id));
        }
        match self.items.get(kind) {
            Some(ids) => id == ANY || ids.contains(id),
            None => false,
        }
    }

    pub fn toggle(mut self, kind: &str, id: &str, selected: bool) -> Self {
        self.set(kind, id, selected);
        self
    }

    pub fn select_many<I, S>(mut self, kind: &str, ids: I, selected: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.set(kind, id.as_ref(), selected);
        }
        self
    }

    /// Select or deselect every loaded row of `view`, grouped by kind.
    pub fn select_loaded_rows(mut self, view: &ResultView, selected: bool) -> Self {
        for row in view.loaded() {
            self.set(&row.kind, &row.uid, selected);
        }
        self
    }

    /// Select or deselect a folder together with its loaded descendants.
    pub fn select_folder_with_children(
        mut self,
        folder_uid: &str,
        view: &ResultView,
        selected: bool,
    ) -> Self {
        self.set(KIND_FOLDER, folder_uid, selected);
        for row in view.loaded().iter().filter(|row| row.is_within(folder_uid)) {
            self.set(&row.kind, &row.uid, selected);
        }
        self
    }

    pub fn apply(self, action: SelectionAction) -> Self {
        match action {
            SelectionAction::Toggle { kind, id, selected } => self.toggle(&kind, &id, selected),
            SelectionAction::SelectMany {
                kind,
                ids,
                selected,
            } => self.select_many(&kind, ids, selected),
            SelectionAction::Clear => Self::default(),
        }
    }

    fn set(&mut self, kind: &str, id: &str, selected: bool) {
        if id == ANY {
            // Deselecting the wildcard drops the whole kind; selecting it
            // names no concrete item.
            if !selected {
                self.items.remove(kind);
            }
            return;
        }
        if selected {
            self.items
                .entry(kind.to_string())
                .or_default()
                .insert(id.to_string());
        } else if let Some(ids) = self.items.get_mut(kind) {
            ids.remove(id);
            if ids.is_empty() {
                self.items.remove(kind);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of selected items across all kinds.
    pub fn count(&self) -> usize {
        self.items.values().map(BTreeSet::len).sum()
    }

    pub fn contains_kind(&self, kind: &str) -> bool {
        self.items.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    pub fn selected_ids(&self, kind: &str) -> impl Iterator<Item = &str> {
        self.items
            .get(kind)
            .into_iter()
            .flat_map(|ids| ids.iter().map(String::as_str))
    }

    /// Every selected `(kind, id)` pair.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items
            .iter()
            .flat_map(|(kind, ids)| ids.iter().map(move |id| (kind.as_str(), id.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashbrowse_client::QueryResponse;
    use dashbrowse_client::testing::generators::CatalogGenerator;

    #[test]
    fn test_fresh_model_selects_nothing() {
        let model = SelectionModel::new();
        assert!(!model.is_selected(ANY, ANY));
        assert!(!model.is_selected("folder", ANY));
        assert!(!model.is_selected("nope", "nope"));
    }

    #[test]
    fn test_mixed_kinds_scenario() {
        let model = SelectionModel::new()
            .toggle("folder", "f1", true)
            .toggle("dashboard", "d1", true)
            .toggle("folder", "f1", false);

        assert!(!model.is_selected("folder", "f1"));
        assert!(model.is_selected("dashboard", "d1"));
        assert!(model.is_selected(ANY, ANY));
        assert!(!model.contains_kind("folder"));
    }

    #[test]
    fn test_wildcards() {
        let model = SelectionModel::new().toggle("dashboard", "d1", true);
        assert!(model.is_selected("dashboard", ANY));
        assert!(!model.is_selected("folder", ANY));
        assert!(model.is_selected(ANY, "d1"));
        assert!(!model.is_selected(ANY, "d2"));
    }

    #[test]
    fn test_wildcard_toggle() {
        let model = SelectionModel::new()
            .select_many("dashboard", ["d1", "d2"], true)
            .toggle("dashboard", ANY, true);
        assert_eq!(model.count(), 2);

        let model = model.toggle("dashboard", ANY, false);
        assert!(model.is_empty());
    }

    #[test]
    fn test_deselect_unknown_is_noop() {
        let model = SelectionModel::new()
            .toggle("folder", "x", false)
            .toggle("dashboard", "d1", true)
            .toggle("dashboard", "zzz", false);
        assert_eq!(model.count(), 1);
        assert_eq!(model.kinds().collect::<Vec<_>>(), vec!["dashboard"]);
    }

    #[test]
    fn test_select_loaded_rows_groups_by_kind() {
        let rows = CatalogGenerator::new()
            .with_folders(1)
            .with_dashboards_per_folder(2)
            .generate();
        let view = QueryResponse::from_rows(rows).view;
        let model = SelectionModel::new().select_loaded_rows(&view, true);
        assert_eq!(model.selected_ids("folder").collect::<Vec<_>>(), vec!["f0"]);
        assert_eq!(
            model.selected_ids("dashboard").collect::<Vec<_>>(),
            vec!["d0-0", "d0-1"]
        );

        let model = model.select_loaded_rows(&view, false);
        assert!(model.is_empty());
    }

    #[test]
    fn test_select_folder_with_children() {
        let rows = CatalogGenerator::new()
            .with_folders(2)
            .with_dashboards_per_folder(2)
            .generate();
        let view = QueryResponse::from_rows(rows).view;
        let model = SelectionModel::new().select_folder_with_children("f1", &view, true);

        assert!(model.is_selected("folder", "f1"));
        assert!(model.is_selected("dashboard", "d1-0"));
        assert!(!model.is_selected("dashboard", "d0-0"));
        assert_eq!(model.count(), 3);
    }

    #[test]
    fn test_apply_actions() {
        let model = SelectionModel::new()
            .apply(SelectionAction::SelectMany {
                kind: "dashboard".to_string(),
                ids: vec!["a".to_string(), "b".to_string()],
                selected: true,
            })
            .apply(SelectionAction::Toggle {
                kind: "dashboard".to_string(),
                id: "a".to_string(),
                selected: false,
            });
        assert_eq!(model.iter().collect::<Vec<_>>(), vec![("dashboard", "b")]);
        assert!(model.apply(SelectionAction::Clear).is_empty());
    }
}
