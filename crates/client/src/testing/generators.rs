//! Deterministic catalog generators.
//!
//! Builds folder/dashboard/panel trees with predictable uids, names, urls and
//! tags so tests can assert on exact rows.

use crate::models::{KIND_DASHBOARD, KIND_FOLDER, KIND_PANEL, Row};

/// Tags assigned round-robin to generated dashboards.
const TAG_POOL: &[&str] = &["prod", "staging", "linux", "network", "database"];

/// Generates a catalog of folders, dashboards and optional panels.
///
/// Layout for folder `i`, dashboard `j`, panel `k`:
/// - folder `f{i}`, url `{base}/dashboards/f/f{i}`
/// - dashboard `d{i}-{j}` in location `f{i}`, url `{base}/d/d{i}-{j}`
/// - panel `p{i}-{j}-{k}` in location `f{i}`, url `{base}/d/d{i}-{j}?viewPanel={k}`
#[derive(Debug, Clone)]
pub struct CatalogGenerator {
    folders: usize,
    dashboards_per_folder: usize,
    panels_per_dashboard: usize,
    base_path: String,
}

impl Default for CatalogGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogGenerator {
    pub fn new() -> Self {
        Self {
            folders: 2,
            dashboards_per_folder: 3,
            panels_per_dashboard: 0,
            base_path: String::new(),
        }
    }

    pub fn with_folders(mut self, folders: usize) -> Self {
        self.folders = folders;
        self
    }

    pub fn with_dashboards_per_folder(mut self, dashboards: usize) -> Self {
        self.dashboards_per_folder = dashboards;
        self
    }

    pub fn with_panels_per_dashboard(mut self, panels: usize) -> Self {
        self.panels_per_dashboard = panels;
        self
    }

    /// Prefix every generated url with `base_path` (e.g. `/grafana`).
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn generate(&self) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut tag_cursor = 0usize;
        for i in 0..self.folders {
            let folder_uid = format!("f{i}");
            rows.push(Row {
                kind: KIND_FOLDER.to_string(),
                uid: folder_uid.clone(),
                name: format!("Folder {i}"),
                url: format!("{}/dashboards/f/{folder_uid}", self.base_path),
                tags: Vec::new(),
                location: String::new(),
                panel_type: None,
                datasources: Vec::new(),
            });
            for j in 0..self.dashboards_per_folder {
                let dash_uid = format!("d{i}-{j}");
                let tag = TAG_POOL[tag_cursor % TAG_POOL.len()];
                tag_cursor += 1;
                rows.push(Row {
                    kind: KIND_DASHBOARD.to_string(),
                    uid: dash_uid.clone(),
                    name: format!("Dashboard {i}-{j}"),
                    url: format!("{}/d/{dash_uid}", self.base_path),
                    tags: vec![tag.to_string()],
                    location: folder_uid.clone(),
                    panel_type: None,
                    datasources: vec!["prometheus".to_string()],
                });
                for k in 0..self.panels_per_dashboard {
                    rows.push(Row {
                        kind: KIND_PANEL.to_string(),
                        uid: format!("p{i}-{j}-{k}"),
                        name: format!("Panel {i}-{j}-{k}"),
                        url: format!("{}/d/{dash_uid}?viewPanel={k}", self.base_path),
                        tags: Vec::new(),
                        location: folder_uid.clone(),
                        panel_type: Some("timeseries".to_string()),
                        datasources: vec!["prometheus".to_string()],
                    });
                }
            }
        }
        rows
    }
}
