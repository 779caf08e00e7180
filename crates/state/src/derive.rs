//! Backend query derivation.
//!
//! Rules are applied in order, later rules overwriting the kind filter set by
//! earlier ones:
//! 1. A sort that does not reference the name field excludes panels.
//! 2. An empty term becomes the wildcard; without a folder scope, wildcard
//!    browsing excludes panels.
//! 3. Excluding sub items excludes panels unless a kind filter is already set.
//! 4. A panel type filter restricts results to panels.
//! 5. A wildcard term without a sort defaults to name ascending.

use dashbrowse_client::SORT_ALPHA_ASC;
use dashbrowse_client::models::{SearchQuery, WILDCARD_TERM, container_kinds, panel_kinds};

use crate::query::QueryState;

/// Whether `sort` orders by the name field.
pub fn sort_references_name(sort: &str) -> bool {
    let sort = sort.to_ascii_lowercase();
    sort.starts_with("alpha") || sort.contains("name")
}

/// Build the backend query for `state`.
pub fn derive_search_query(state: &QueryState) -> SearchQuery {
    let mut query = SearchQuery {
        query: state.term.clone(),
        tags: state.tags.clone(),
        kind: None,
        ds_uid: state.datasource.clone(),
        panel_type: state.panel_type.clone(),
        location: state.folder_scope.clone(),
        sort: state.sort.clone(),
        limit: None,
    };

    if state.sort.as_deref().is_some_and(|s| !sort_references_name(s)) {
        query.kind = Some(container_kinds());
    }

    if query.query.is_empty() {
        query.query = WILDCARD_TERM.to_string();
        if state.folder_scope.is_none() {
            query.kind = Some(container_kinds());
        }
    }

    if !state.include_sub_items && query.kind.is_none() {
        query.kind = Some(container_kinds());
    }

    if state.panel_type.is_some() {
        query.kind = Some(panel_kinds());
    }

    if query.is_wildcard() && query.sort.is_none() {
        query.sort = Some(SORT_ALPHA_ASC.to_string());
    }

    query
}
