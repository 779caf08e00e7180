//! Search state coordination for dashbrowse.
//!
//! This crate turns bursty user input into one coherent, debounced search
//! against a `SearchService`, keeps the route and stored preferences in step,
//! tracks the item selection, and routes keyboard navigation into list or grid
//! cursors over the current result view.
//!
//! One `StateManager` owns one browsing session; build it with
//! `StateManager::builder`.

pub mod cursor;
pub mod debounce;
pub mod derive;
pub mod keyboard;
pub mod manager;
pub mod query;
pub mod route;
pub mod selection;
pub mod telemetry;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use cursor::{
    CursorHandle, CursorMode, CursorOutcome, CursorPosition, CursorReport, CursorTracker,
    spawn_cursor_tracker, strip_base_from_url,
};
pub use debounce::Debouncer;
pub use derive::{derive_search_query, sort_references_name};
pub use keyboard::{KeyboardNavigationRouter, NavigationAction};
pub use manager::{SearchSnapshot, SearchStatus, StateManager, StateManagerBuilder};
pub use query::{Layout, QueryAction, QueryPatch, QueryState};
pub use route::{
    MemoryRouter, ParamValue, RouteParams, RouteSync, RouteUpdate, Router, parse_from_route,
    parse_query_string, to_query_string, to_route_params, to_route_update,
};
pub use selection::{SelectionAction, SelectionModel};
pub use telemetry::{
    InteractionReporter, MetricsInteractionReporter, NoopReporter, Properties, event_name,
};
