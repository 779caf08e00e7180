//! Route synchronization.
//!
//! Responsibilities:
//! - Map `QueryState` to and from route parameters (`parse_from_route`,
//!   `to_route_params`, `to_route_update`).
//! - Encode and decode query strings (`to_query_string`, `parse_query_string`).
//! - Define the `Router` collaborator and an in-memory implementation.
//! - Build the startup state from the route and stored preferences, and write
//!   layout/sort preferences back (`RouteSync`).
//!
//! Does NOT handle:
//! - Debouncing route writes (the state manager owns the timers).
//!
//! Invariants:
//! - Parsing never fails: missing keys are dropped, unparseable values ignored.
//! - A scalar `tag` parameter is read back as a one-element list.
//! - Values are read back verbatim; only empty ones are dropped.
//! - `prev_sort` and `include_sub_items` are never written to the route.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dashbrowse_config::PreferenceStore;
use dashbrowse_config::constants::{PREF_SEARCH_INCLUDE_SUB_ITEMS, PREF_SEARCH_LAYOUT, PREF_SEARCH_SORT};
use serde::Serialize;

use crate::query::{Layout, QueryPatch, QueryState};

pub const PARAM_QUERY: &str = "query";
pub const PARAM_TAG: &str = "tag";
pub const PARAM_DATASOURCE: &str = "datasource";
pub const PARAM_PANEL_TYPE: &str = "panel_type";
pub const PARAM_STARRED: &str = "starred";
pub const PARAM_SORT: &str = "sort";
pub const PARAM_LAYOUT: &str = "layout";
pub const PARAM_FOLDER: &str = "folder";

/// Every parameter this module owns.
pub const ROUTE_KEYS: &[&str] = &[
    PARAM_QUERY,
    PARAM_TAG,
    PARAM_DATASOURCE,
    PARAM_PANEL_TYPE,
    PARAM_STARRED,
    PARAM_SORT,
    PARAM_LAYOUT,
    PARAM_FOLDER,
];

/// A route parameter value. Routes may collapse one-element lists to scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// The first value, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            ParamValue::Single(v) => Some(v),
            ParamValue::Many(vs) => vs.first().map(String::as_str),
        }
    }

    pub fn to_vec(&self) -> Vec<String> {
        match self {
            ParamValue::Single(v) => vec![v.clone()],
            ParamValue::Many(vs) => vs.clone(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

/// Current route parameters.
pub type RouteParams = BTreeMap<String, ParamValue>;

/// A partial route write; `None` removes the key.
pub type RouteUpdate = BTreeMap<String, Option<ParamValue>>;

fn scalar(params: &RouteParams, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(ParamValue::first)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Read the externally visible query fields present in `params`.
pub fn parse_from_route(params: &RouteParams) -> QueryPatch {
    let mut patch = QueryPatch::default();

    if let Some(value) = params.get(PARAM_QUERY).and_then(ParamValue::first) {
        patch.term = Some(value.to_string());
    }
    if let Some(value) = params.get(PARAM_TAG) {
        let tags: Vec<String> = value
            .to_vec()
            .into_iter()
            .filter(|t| !t.is_empty())
            .collect();
        if !tags.is_empty() {
            patch.tags = Some(tags);
        }
    }
    if let Some(ds) = scalar(params, PARAM_DATASOURCE) {
        patch.datasource = Some(Some(ds));
    }
    if let Some(panel_type) = scalar(params, PARAM_PANEL_TYPE) {
        patch.panel_type = Some(Some(panel_type));
    }
    match scalar(params, PARAM_STARRED).as_deref().map(str::trim) {
        Some("true") => patch.starred = Some(true),
        Some("false") => patch.starred = Some(false),
        _ => {}
    }
    if let Some(sort) = scalar(params, PARAM_SORT) {
        patch.sort = Some(Some(sort));
    }
    if let Some(layout) = scalar(params, PARAM_LAYOUT).and_then(|v| v.parse::<Layout>().ok()) {
        patch.layout = Some(layout);
    }
    if let Some(folder) = scalar(params, PARAM_FOLDER) {
        patch.folder_scope = Some(Some(folder));
    }

    patch
}

/// Project `state` onto route parameters. Empty fields are omitted.
pub fn to_route_params(state: &QueryState) -> RouteParams {
    to_route_update(state)
        .into_iter()
        .filter_map(|(key, value)| value.map(|v| (key, v)))
        .collect()
}

/// A write covering every owned key, clearing the ones `state` leaves empty.
pub fn to_route_update(state: &QueryState) -> RouteUpdate {
    let mut update = RouteUpdate::new();
    let single = |v: &str| Some(ParamValue::Single(v.to_string()));

    update.insert(
        PARAM_QUERY.to_string(),
        (!state.term.is_empty()).then(|| ParamValue::Single(state.term.clone())),
    );
    update.insert(
        PARAM_TAG.to_string(),
        (!state.tags.is_empty()).then(|| ParamValue::Many(state.tags.clone())),
    );
    update.insert(
        PARAM_DATASOURCE.to_string(),
        state.datasource.as_deref().and_then(single),
    );
    update.insert(
        PARAM_PANEL_TYPE.to_string(),
        state.panel_type.as_deref().and_then(single),
    );
    update.insert(
        PARAM_STARRED.to_string(),
        state.starred.then(|| ParamValue::Single("true".to_string())),
    );
    update.insert(PARAM_SORT.to_string(), state.sort.as_deref().and_then(single));
    update.insert(
        PARAM_LAYOUT.to_string(),
        single(state.effective_layout().as_str()),
    );
    update.insert(
        PARAM_FOLDER.to_string(),
        state.folder_scope.as_deref().and_then(single),
    );
    update
}

/// Encode parameters as a query string; lists become repeated keys.
pub fn to_query_string(params: &RouteParams) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            ParamValue::Single(v) => {
                serializer.append_pair(key, v);
            }
            ParamValue::Many(vs) => {
                for v in vs {
                    serializer.append_pair(key, v);
                }
            }
        }
    }
    serializer.finish()
}

/// Decode a query string; repeated keys collapse into lists.
pub fn parse_query_string(input: &str) -> RouteParams {
    let input = input.strip_prefix('?').unwrap_or(input);
    let mut params = RouteParams::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        let key = key.into_owned();
        let value = value.into_owned();
        match params.remove(&key) {
            None => {
                params.insert(key, ParamValue::Single(value));
            }
            Some(ParamValue::Single(first)) => {
                params.insert(key, ParamValue::Many(vec![first, value]));
            }
            Some(ParamValue::Many(mut values)) => {
                values.push(value);
                params.insert(key, ParamValue::Many(values));
            }
        }
    }
    params
}

/// Reads and writes query-string state for the current location.
pub trait Router: Send + Sync {
    fn search_params(&self) -> RouteParams;

    /// Apply a partial update; `replace` overwrites the current history entry.
    fn set_search_params(&self, update: RouteUpdate, replace: bool);

    /// Navigate to `path`.
    fn push(&self, path: &str);
}

/// A recorded `set_search_params` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteWrite {
    pub update: RouteUpdate,
    pub replace: bool,
}

#[derive(Debug, Default)]
struct MemoryRouterState {
    params: RouteParams,
    writes: Vec<RouteWrite>,
    history: Vec<RouteParams>,
    pushed: Vec<String>,
}

/// Router that keeps its location in memory and records every write.
#[derive(Debug, Default)]
pub struct MemoryRouter {
    state: Mutex<MemoryRouterState>,
}

impl MemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_query_string(query: &str) -> Self {
        Self::with_params(parse_query_string(query))
    }

    pub fn with_params(params: RouteParams) -> Self {
        Self {
            state: Mutex::new(MemoryRouterState {
                params,
                ..MemoryRouterState::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryRouterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current location's query string.
    pub fn query_string(&self) -> String {
        to_query_string(&self.lock().params)
    }

    pub fn writes(&self) -> Vec<RouteWrite> {
        self.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    /// Locations left behind by non-replacing writes.
    pub fn history(&self) -> Vec<RouteParams> {
        self.lock().history.clone()
    }

    /// Paths passed to `push`, oldest first.
    pub fn pushed(&self) -> Vec<String> {
        self.lock().pushed.clone()
    }
}

impl Router for MemoryRouter {
    fn search_params(&self) -> RouteParams {
        self.lock().params.clone()
    }

    fn set_search_params(&self, update: RouteUpdate, replace: bool) {
        let mut state = self.lock();
        if !replace {
            let previous = state.params.clone();
            state.history.push(previous);
        }
        for (key, value) in &update {
            match value {
                Some(v) => {
                    state.params.insert(key.clone(), v.clone());
                }
                None => {
                    state.params.remove(key);
                }
            }
        }
        state.writes.push(RouteWrite { update, replace });
    }

    fn push(&self, path: &str) {
        self.lock().pushed.push(path.to_string());
    }
}

/// Keeps route, preferences and query state in step.
#[derive(Clone)]
pub struct RouteSync {
    router: Arc<dyn Router>,
    preferences: Arc<dyn PreferenceStore>,
}

impl RouteSync {
    pub fn new(router: Arc<dyn Router>, preferences: Arc<dyn PreferenceStore>) -> Self {
        Self {
            router,
            preferences,
        }
    }

    pub fn router(&self) -> &Arc<dyn Router> {
        &self.router
    }

    /// Build the startup state from the route, falling back to stored preferences.
    pub fn initial_state(&self) -> QueryState {
        let params = self.router.search_params();
        let patch = parse_from_route(&params);

        let stored_layout = self
            .preferences
            .get(PREF_SEARCH_LAYOUT)
            .and_then(|v| v.parse::<Layout>().ok());
        let stored_sort = self
            .preferences
            .get(PREF_SEARCH_SORT)
            .filter(|v| !v.is_empty());

        let forces_list = patch.term.as_deref().is_some_and(|t| !t.is_empty())
            || patch.datasource.is_some()
            || patch.panel_type.is_some();
        let route_layout = patch.layout;
        let route_sort = patch.sort.clone().flatten();

        let mut state = QueryState {
            include_sub_items: self
                .preferences
                .get_bool(PREF_SEARCH_INCLUDE_SUB_ITEMS, true),
            ..QueryState::default()
        };
        patch.merge_into(&mut state);

        state.layout = if forces_list {
            Layout::List
        } else {
            route_layout.or(stored_layout).unwrap_or_default()
        };

        if route_sort.is_none() {
            if state.layout == Layout::Folders {
                state.prev_sort = stored_sort;
            } else {
                state.sort = stored_sort;
            }
        }

        tracing::debug!(
            layout = %state.layout,
            sort = ?state.sort,
            "query state initialized from route"
        );
        state
    }

    /// Write `state` to the route, replacing the current history entry.
    pub fn push(&self, state: &QueryState) {
        let update = to_route_update(state);
        tracing::debug!(keys = update.len(), "writing route");
        self.router.set_search_params(update, true);
    }

    pub fn persist_layout(&self, layout: Layout) {
        if let Err(e) = self.preferences.set(PREF_SEARCH_LAYOUT, layout.as_str()) {
            tracing::warn!(error = %e, "failed to persist layout preference");
        }
    }

    pub fn persist_sort(&self, sort: Option<&str>) {
        let result = match sort {
            Some(sort) => self.preferences.set(PREF_SEARCH_SORT, sort),
            None => self.preferences.remove(PREF_SEARCH_SORT),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist sort preference");
        }
    }

    pub fn persist_include_sub_items(&self, include: bool) {
        let value = if include { "true" } else { "false" };
        if let Err(e) = self.preferences.set(PREF_SEARCH_INCLUDE_SUB_ITEMS, value) {
            tracing::warn!(error = %e, "failed to persist include sub items preference");
        }
    }
}
