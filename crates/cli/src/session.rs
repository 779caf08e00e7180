//! One browsing session driven from the command line.
//!
//! Responsibilities:
//! - Resolve configuration, the catalog and the preference store from CLI flags.
//! - Build a `StateManager` over the in-memory catalog and a memory router.
//! - Apply command-line filters through the same mutators a UI would call.
//! - Settle debounced effects immediately and replay navigation keys.
//!
//! Does NOT handle:
//! - Output formatting (see `formatters`).
//!
//! Invariants:
//! - Filters are applied after `init_from_route`, so flags override the route.
//! - Keys are replayed one at a time; each is processed before the next is sent.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use dashbrowse_client::{MemorySearchService, Row, SortOption, TermCount};
use dashbrowse_config::{
    BrowseConfig, ConfigLoader, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore,
    default_config_path, default_preferences_path,
};
use dashbrowse_state::{
    CursorMode, CursorReport, MemoryRouter, NavigationAction, SearchSnapshot, SearchStatus,
    StateManager,
};

use crate::args::{Cli, FilterArgs};
use crate::error::SearchFailed;

/// A manager plus the in-memory router it writes to.
pub struct Session {
    pub manager: StateManager,
    pub router: Arc<MemoryRouter>,
}

/// Cursor state after replaying keys.
#[derive(Debug, Clone)]
pub struct Navigation {
    pub mode: CursorMode,
    pub report: CursorReport,
    /// Path the last Enter navigated to, if any.
    pub target: Option<String>,
}

impl Navigation {
    /// Row under the cursor.
    pub fn row_index(&self) -> Option<usize> {
        self.report.position.row_index(self.mode)
    }
}

impl Session {
    /// Open a session from global CLI flags and read the initial route.
    pub fn open(cli: &Cli) -> Result<Self> {
        let config = load_config(cli)?;

        let catalog = cli
            .catalog
            .as_ref()
            .context("No catalog given. Pass --catalog FILE or set DASHBROWSE_CATALOG")?;
        let service = MemorySearchService::from_json_file(catalog)
            .with_context(|| format!("Failed to load catalog {}", catalog.display()))?;
        tracing::debug!(rows = service.rows().len(), "catalog loaded");

        let preferences = open_preferences(cli.fresh, &config)?;
        let router = Arc::new(MemoryRouter::from_query_string(
            cli.route.as_deref().unwrap_or_default(),
        ));

        let manager = StateManager::builder(Arc::new(service), router.clone())
            .config(config)
            .preferences(preferences)
            .build();
        manager.init_from_route(false);

        Ok(Self { manager, router })
    }

    /// Apply command-line filters on top of the restored state.
    pub fn apply_filters(&self, filters: &FilterArgs) {
        let patch = filters.patch();
        if !patch.is_empty() {
            self.manager.set_query_and_search(patch);
        }
        if let Some(layout) = filters.layout {
            self.manager.on_layout_change(layout);
        }
        if let Some(sort) = &filters.sort {
            self.manager.on_sort_change(Some(sort.clone()));
        }
        if filters.no_sub_items {
            self.manager.on_set_include_sub_items(false);
        }
    }

    /// Search with the current state and wait for the result.
    pub async fn search(&self) -> Result<SearchSnapshot> {
        if self.manager.has_pending_effects() {
            self.manager.flush().await;
        } else {
            self.manager.do_search().await;
        }

        let snapshot = self.manager.snapshot();
        if let SearchStatus::Errored(message) = &snapshot.status {
            return Err(SearchFailed(message.clone()).into());
        }
        Ok(snapshot)
    }

    /// Replay `keys` against a cursor over the current result view.
    pub async fn replay_keys(&self, keys: &[NavigationAction]) -> Option<Navigation> {
        if keys.is_empty() {
            return None;
        }

        let layout = self.manager.snapshot().query.layout;
        let mode = self.manager.cursor_mode_for(layout);
        let mut cursor = self.manager.spawn_cursor(mode);

        let mut target = None;
        let mut report = cursor.report();
        for (sent, key) in (1u64..).zip(keys) {
            self.manager.keyboard().emit(*key);
            report = cursor.wait_for(|r| r.processed >= sent).await;
            tracing::debug!(key = %key, position = ?report.position, "replayed key");
            if let dashbrowse_state::CursorOutcome::Navigate(path) = &report.last_outcome {
                target = Some(path.clone());
            }
        }

        Some(Navigation {
            mode,
            report,
            target,
        })
    }

    /// Apply selection flags against the loaded rows.
    pub fn select(&self, select_all: bool, folder: Option<&str>) {
        if select_all {
            self.manager.select_loaded_rows(true);
        }
        if let Some(uid) = folder {
            self.manager.select_folder_with_children(uid, true);
        }
    }

    pub async fn tag_options(&self) -> Result<Vec<TermCount>> {
        Ok(self.manager.tag_options().await?)
    }

    pub async fn sort_options(&self) -> Result<Vec<SortOption>> {
        Ok(self.manager.sort_options().await?)
    }
}

/// Rows currently loaded in `snapshot`'s view.
pub fn loaded_rows(snapshot: &SearchSnapshot) -> Vec<Row> {
    snapshot
        .result
        .as_ref()
        .map(|response| response.view.loaded())
        .unwrap_or_default()
}

fn load_config(cli: &Cli) -> Result<BrowseConfig> {
    let mut loader = ConfigLoader::new();

    // Blank values are ignored so an empty env var falls back to the default file.
    let explicit = cli
        .config_path
        .as_ref()
        .filter(|path| !path.to_string_lossy().trim().is_empty());
    match explicit {
        Some(path) => loader = loader.with_config_path(path.clone()),
        None => {
            if let Ok(path) = default_config_path()
                && path.exists()
            {
                loader = loader.with_config_path(path);
            }
        }
    }

    if let Some(base_path) = &cli.base_path {
        loader = loader.with_base_path(base_path.clone());
    }
    if let Some(path) = &cli.preferences_path {
        loader = loader.with_preferences_path(path.clone());
    }

    let config = loader
        .from_file()?
        .from_env()?
        .build()
        .context("Failed to build configuration")?;
    Ok(config)
}

fn open_preferences(fresh: bool, config: &BrowseConfig) -> Result<Arc<dyn PreferenceStore>> {
    if fresh {
        return Ok(Arc::new(MemoryPreferenceStore::new()));
    }

    let path: PathBuf = match &config.preferences_path {
        Some(path) => path.clone(),
        None => default_preferences_path()?,
    };
    let store = FilePreferenceStore::open(path.clone())
        .with_context(|| format!("Failed to open preferences {}", path.display()))?;
    Ok(Arc::new(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use dashbrowse_state::{CursorOutcome, CursorPosition, Layout};
    use std::io::Write;

    const CATALOG: &str = r#"{
        "rows": [
            {"kind": "folder", "uid": "ops", "name": "Ops", "url": "/grafana/dashboards/f/ops"},
            {"kind": "dashboard", "uid": "cpu", "name": "CPU usage", "url": "/grafana/d/cpu",
             "tags": ["prod"], "location": "ops"},
            {"kind": "dashboard", "uid": "mem", "name": "Memory", "url": "/grafana/d/mem",
             "tags": ["prod", "db"], "location": "ops"}
        ],
        "starred": ["mem"]
    }"#;

    fn catalog_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();
        file
    }

    fn cli(catalog: &tempfile::NamedTempFile, extra: &[&str]) -> Cli {
        let mut args = vec![
            "dashbrowse".to_string(),
            "--fresh".to_string(),
            "--base-path".to_string(),
            "/grafana".to_string(),
            "--catalog".to_string(),
            catalog.path().display().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        args.push("sorts".to_string());
        Cli::try_parse_from(args).unwrap()
    }

    #[tokio::test]
    async fn test_browse_defaults_to_name_order() {
        let catalog = catalog_file();
        let session = Session::open(&cli(&catalog, &[])).unwrap();

        let snapshot = session.search().await.unwrap();
        let names: Vec<_> = loaded_rows(&snapshot).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["CPU usage", "Memory", "Ops"]);
        assert_eq!(snapshot.query.layout, Layout::Folders);
    }

    #[tokio::test]
    async fn test_route_and_filters_combine() {
        let catalog = catalog_file();
        let session = Session::open(&cli(&catalog, &["--route", "tag=prod"])).unwrap();
        session.apply_filters(&FilterArgs {
            starred: true,
            ..FilterArgs::default()
        });

        let snapshot = session.search().await.unwrap();
        let uids: Vec<_> = loaded_rows(&snapshot).into_iter().map(|r| r.uid).collect();
        assert_eq!(uids, vec!["mem"]);
        assert_eq!(
            session.router.query_string(),
            "layout=list&starred=true&tag=prod"
        );
    }

    #[tokio::test]
    async fn test_replay_keys_navigates_without_base_path() {
        let catalog = catalog_file();
        let session = Session::open(&cli(&catalog, &[])).unwrap();
        session.search().await.unwrap();

        let navigation = session
            .replay_keys(&[
                NavigationAction::Down,
                NavigationAction::Down,
                NavigationAction::Enter,
            ])
            .await
            .unwrap();

        assert_eq!(navigation.report.position, CursorPosition::Index(1));
        assert_eq!(navigation.row_index(), Some(1));
        assert_eq!(navigation.target.as_deref(), Some("/d/mem"));
        assert_eq!(
            navigation.report.last_outcome,
            CursorOutcome::Navigate("/d/mem".to_string())
        );
        assert_eq!(session.router.pushed(), vec!["/d/mem".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_catalog_is_an_error() {
        let cli = Cli::try_parse_from(["dashbrowse", "--fresh", "sorts"]).unwrap();
        let err = Session::open(&cli).err().unwrap();
        assert!(err.to_string().contains("No catalog given"));
    }

    #[tokio::test]
    async fn test_folder_selection_includes_children() {
        let catalog = catalog_file();
        let session = Session::open(&cli(&catalog, &[])).unwrap();
        session.search().await.unwrap();

        session.select(false, Some("ops"));
        let selection = session.manager.selection();
        assert!(selection.is_selected("folder", "ops"));
        assert!(selection.is_selected("dashboard", "cpu"));
        assert_eq!(selection.count(), 3);
    }
}
