//! Output formatters for CLI commands.
//!
//! Provides table and JSON renderings of search results, tag facets and
//! sort options. Table output is meant for people; JSON output is stable
//! for scripts.

use anyhow::Result;
use dashbrowse_client::{Row, SortOption, TermCount};
use dashbrowse_state::{CursorReport, QueryState, SearchStatus, SelectionModel};
use serde::Serialize;

use crate::args::OutputFormat;

/// Everything a `search` run produced.
#[derive(Debug, Serialize)]
pub struct SearchOutput<'a> {
    pub query: &'a QueryState,
    /// Query string the route now reflects.
    pub route: String,
    pub status: &'a SearchStatus,
    pub generation: u64,
    pub total_rows: usize,
    pub rows: &'a [Row],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<&'a CursorReport>,
    /// Row the cursor points at, used to mark it in table output.
    #[serde(skip)]
    pub cursor_row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigated_to: Option<&'a str>,
    #[serde(skip_serializing_if = "no_selection")]
    pub selection: &'a SelectionModel,
}

fn no_selection(selection: &&SelectionModel) -> bool {
    selection.is_empty()
}

/// Formatter trait for different output types.
pub trait Formatter {
    fn format_search(&self, output: &SearchOutput<'_>) -> Result<String>;

    fn format_tags(&self, tags: &[TermCount]) -> Result<String>;

    fn format_sorts(&self, sorts: &[SortOption]) -> Result<String>;
}

/// Pick the formatter for `format`.
pub fn get_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Table => Box::new(TableFormatter),
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_search(&self, output: &SearchOutput<'_>) -> Result<String> {
        Ok(serde_json::to_string_pretty(output)?)
    }

    fn format_tags(&self, tags: &[TermCount]) -> Result<String> {
        Ok(serde_json::to_string_pretty(tags)?)
    }

    fn format_sorts(&self, sorts: &[SortOption]) -> Result<String> {
        Ok(serde_json::to_string_pretty(sorts)?)
    }
}

/// Plain-text table formatter.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_search(&self, output: &SearchOutput<'_>) -> Result<String> {
        let mut out = String::new();
        out.push_str(&format!(
            "{} result(s), layout {}",
            output.total_rows, output.query.layout
        ));
        if !output.route.is_empty() {
            out.push_str(&format!(", route ?{}", output.route));
        }
        out.push('\n');

        if output.rows.is_empty() {
            out.push_str("No results found.\n");
        } else {
            let rows: Vec<Vec<String>> = output
                .rows
                .iter()
                .enumerate()
                .map(|(index, row)| {
                    let marker = if output.cursor_row == Some(index) { ">" } else { "" };
                    let selected = if output.selection.is_selected(&row.kind, &row.uid) {
                        "*"
                    } else {
                        ""
                    };
                    vec![
                        format!("{marker}{selected}"),
                        row.kind.clone(),
                        row.uid.clone(),
                        row.name.clone(),
                        row.tags.join(","),
                        row.location.clone(),
                    ]
                })
                .collect();
            out.push_str(&render_table(
                &["", "KIND", "UID", "NAME", "TAGS", "LOCATION"],
                &rows,
            ));
        }

        if !output.selection.is_empty() {
            out.push_str(&format!("\n{} item(s) selected\n", output.selection.count()));
        }
        if let Some(target) = output.navigated_to {
            out.push_str(&format!("\nNavigate: {target}\n"));
        }
        Ok(out)
    }

    fn format_tags(&self, tags: &[TermCount]) -> Result<String> {
        if tags.is_empty() {
            return Ok("No tags found.\n".to_string());
        }
        let rows: Vec<Vec<String>> = tags
            .iter()
            .map(|t| vec![t.term.clone(), t.count.to_string()])
            .collect();
        Ok(render_table(&["TAG", "COUNT"], &rows))
    }

    fn format_sorts(&self, sorts: &[SortOption]) -> Result<String> {
        let rows: Vec<Vec<String>> = sorts
            .iter()
            .map(|s| vec![s.value.clone(), s.label.clone()])
            .collect();
        Ok(render_table(&["VALUE", "LABEL"], &rows))
    }
}

/// Left-aligned columns separated by two spaces; trailing padding is trimmed.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        format!("{}\n", padded.join("  ").trim_end())
    };

    let mut out = line(headers.to_vec());
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
    }
    out
}
