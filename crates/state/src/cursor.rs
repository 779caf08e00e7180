//! Keyboard cursor over the current result view.
//!
//! Responsibilities:
//! - Track a 1-D (list) or 2-D (grid) cursor driven by `NavigationAction`s.
//! - Reset the cursor whenever the result view is replaced (identity, not
//!   contents).
//! - Resolve Enter into a navigation target with the base path stripped.
//! - Run a tracker task bound to a snapshot stream and an intent stream.
//!
//! Invariants:
//! - The list cursor starts at -1 and the grid cursor at (0, -1).
//! - Down has no upper clamp; the cursor may point past loaded rows, in which
//!   case Enter is a no-op.

use std::sync::Arc;

use dashbrowse_client::ResultView;
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::keyboard::NavigationAction;
use crate::manager::SearchSnapshot;
use crate::route::Router;

/// Which cursor shape to track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMode {
    List,
    Grid { columns: usize },
}

/// Logical cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CursorPosition {
    Index(i64),
    Cell { x: i64, y: i64 },
}

impl CursorPosition {
    const LIST_INITIAL: CursorPosition = CursorPosition::Index(-1);
    const GRID_INITIAL: CursorPosition = CursorPosition::Cell { x: 0, y: -1 };

    /// Row index this position points at under `mode`, if any.
    pub fn row_index(&self, mode: CursorMode) -> Option<usize> {
        let index = match (*self, mode) {
            (CursorPosition::Index(i), _) => i,
            (CursorPosition::Cell { x, y }, CursorMode::Grid { columns }) => {
                if y < 0 {
                    return None;
                }
                y * columns as i64 + x
            }
            (CursorPosition::Cell { .. }, CursorMode::List) => return None,
        };
        usize::try_from(index).ok()
    }
}

/// What a navigation intent did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "target", rename_all = "snake_case")]
pub enum CursorOutcome {
    /// Nothing changed.
    Unchanged,
    Moved,
    /// Enter resolved to this path.
    Navigate(String),
    /// Escape reset the cursor.
    Dismiss,
}

/// Cursor state machine for one result surface.
#[derive(Debug, Clone)]
pub struct CursorTracker {
    mode: CursorMode,
    position: CursorPosition,
    view: Option<ResultView>,
    base_path: String,
}

impl CursorTracker {
    pub fn new(mode: CursorMode, base_path: impl Into<String>) -> Self {
        let mode = match mode {
            CursorMode::Grid { columns } => CursorMode::Grid {
                columns: columns.max(1),
            },
            CursorMode::List => CursorMode::List,
        };
        Self {
            mode,
            position: Self::initial(mode),
            view: None,
            base_path: base_path.into(),
        }
    }

    pub fn list(base_path: impl Into<String>) -> Self {
        Self::new(CursorMode::List, base_path)
    }

    pub fn grid(columns: usize, base_path: impl Into<String>) -> Self {
        Self::new(CursorMode::Grid { columns }, base_path)
    }

    fn initial(mode: CursorMode) -> CursorPosition {
        match mode {
            CursorMode::List => CursorPosition::LIST_INITIAL,
            CursorMode::Grid { .. } => CursorPosition::GRID_INITIAL,
        }
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub fn position(&self) -> CursorPosition {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = Self::initial(self.mode);
    }

    /// Bind to `view`. Resets and returns true if it is a different view.
    pub fn sync_view(&mut self, view: Option<&ResultView>) -> bool {
        let same = match (&self.view, view) {
            (Some(current), Some(next)) => current.same_view(next),
            (None, None) => true,
            _ => false,
        };
        if same {
            return false;
        }
        self.view = view.cloned();
        self.reset();
        true
    }

    /// Row index under the cursor, if it points at a row position.
    pub fn row_index(&self) -> Option<usize> {
        self.position.row_index(self.mode)
    }

    pub fn apply(&mut self, action: NavigationAction) -> CursorOutcome {
        match action {
            NavigationAction::Enter => self.resolve(),
            NavigationAction::Escape => {
                self.reset();
                CursorOutcome::Dismiss
            }
            _ => {
                let next = self.step(action);
                if next == self.position {
                    CursorOutcome::Unchanged
                } else {
                    self.position = next;
                    CursorOutcome::Moved
                }
            }
        }
    }

    fn step(&self, action: NavigationAction) -> CursorPosition {
        match (self.position, self.mode) {
            (CursorPosition::Index(i), _) => match action {
                NavigationAction::Down => CursorPosition::Index(i + 1),
                NavigationAction::Up => CursorPosition::Index((i - 1).max(0)),
                _ => self.position,
            },
            (CursorPosition::Cell { x, y }, CursorMode::Grid { columns }) => {
                let max_x = columns as i64;
                match action {
                    NavigationAction::Down => CursorPosition::Cell { x, y: y + 1 },
                    NavigationAction::Up => CursorPosition::Cell {
                        x,
                        y: (y - 1).max(0),
                    },
                    NavigationAction::Right => CursorPosition::Cell {
                        x: (x + 1).clamp(0, max_x),
                        y,
                    },
                    NavigationAction::Left => CursorPosition::Cell {
                        x: (x - 1).clamp(0, max_x),
                        y,
                    },
                    _ => self.position,
                }
            }
            (CursorPosition::Cell { .. }, CursorMode::List) => self.position,
        }
    }

    fn resolve(&self) -> CursorOutcome {
        let url = self
            .row_index()
            .zip(self.view.as_ref())
            .and_then(|(index, view)| view.url_at(index));
        match url {
            Some(url) => CursorOutcome::Navigate(strip_base_from_url(&url, &self.base_path)),
            None => CursorOutcome::Unchanged,
        }
    }
}

/// Remove the application base path prefix from `url`.
pub fn strip_base_from_url(url: &str, base_path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if base.is_empty() {
        return url.to_string();
    }
    match url.strip_prefix(base) {
        Some("") => "/".to_string(),
        Some(rest) if rest.starts_with(['/', '?', '#']) => rest.to_string(),
        _ => url.to_string(),
    }
}

/// Cursor state published by a tracker task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CursorReport {
    pub position: CursorPosition,
    pub last_outcome: CursorOutcome,
    /// Intents processed so far.
    pub processed: u64,
}

/// Handle to a running tracker task. Dropping it stops the task.
#[derive(Debug)]
pub struct CursorHandle {
    report: watch::Receiver<CursorReport>,
    task: JoinHandle<()>,
}

impl CursorHandle {
    pub fn report(&self) -> CursorReport {
        self.report.borrow().clone()
    }

    pub fn position(&self) -> CursorPosition {
        self.report.borrow().position
    }

    /// Wait until the published report satisfies `predicate`.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&CursorReport) -> bool) -> CursorReport {
        let waited = self.report.wait_for(predicate).await.map(|r| r.clone());
        match waited {
            Ok(report) => report,
            // The tracker stopped; return whatever it published last.
            Err(_) => self.report.borrow().clone(),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<CursorReport> {
        self.report.clone()
    }
}

impl Drop for CursorHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn current_view(snapshots: &watch::Receiver<SearchSnapshot>) -> Option<ResultView> {
    snapshots
        .borrow()
        .result
        .as_ref()
        .map(|response| response.view.clone())
}

/// Run `tracker` against a snapshot stream and an intent stream.
///
/// Enter targets are pushed to `router`. A replaced result view resets the
/// cursor before the next intent is applied.
pub fn spawn_cursor_tracker(
    mut tracker: CursorTracker,
    mut snapshots: watch::Receiver<SearchSnapshot>,
    mut intents: broadcast::Receiver<NavigationAction>,
    router: Arc<dyn Router>,
) -> CursorHandle {
    tracker.sync_view(current_view(&snapshots).as_ref());
    snapshots.mark_unchanged();

    let (report_tx, report_rx) = watch::channel(CursorReport {
        position: tracker.position(),
        last_outcome: CursorOutcome::Unchanged,
        processed: 0,
    });

    let task = tokio::spawn(async move {
        let mut processed = 0u64;
        loop {
            tokio::select! {
                biased;
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = current_view(&snapshots);
                    if tracker.sync_view(view.as_ref()) {
                        tracing::debug!("result view replaced, cursor reset");
                        report_tx.send_modify(|report| report.position = tracker.position());
                    }
                }
                intent = intents.recv() => {
                    let action = match intent {
                        Ok(action) => action,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "cursor tracker lagged behind navigation intents");
                            continue;
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    };
                    // A commit that raced the intent must win.
                    tracker.sync_view(current_view(&snapshots).as_ref());
                    let outcome = tracker.apply(action);
                    if let CursorOutcome::Navigate(path) = &outcome {
                        tracing::debug!(path = %path, "cursor navigation");
                        router.push(path);
                    }
                    processed += 1;
                    report_tx.send_replace(CursorReport {
                        position: tracker.position(),
                        last_outcome: outcome,
                        processed,
                    });
                }
            }
        }
    });

    CursorHandle {
        report: report_rx,
        task,
    }
}
