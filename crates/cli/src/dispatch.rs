//! Command dispatch.
//!
//! Responsibilities:
//! - Open a `Session` and route each subcommand to it.
//! - Hand results to the selected formatter and print them to stdout.
//!
//! Does NOT handle:
//! - Argument parsing (see `args`) or exit code mapping (see `error`).

use anyhow::Result;

use crate::args::{Cli, Commands};
use crate::formatters::{SearchOutput, get_formatter};
use crate::session::{Session, loaded_rows};

/// Run the parsed command to completion.
pub async fn run_command(cli: Cli) -> Result<()> {
    let session = Session::open(&cli)?;
    let formatter = get_formatter(cli.output);

    let rendered = match &cli.command {
        Commands::Search {
            filters,
            keys,
            select_all,
            select_folder,
        } => {
            session.apply_filters(filters);
            session.search().await?;
            session.select(*select_all, select_folder.as_deref());
            let navigation = session.replay_keys(keys).await;

            let snapshot = session.manager.snapshot();
            let rows = loaded_rows(&snapshot);
            let output = SearchOutput {
                query: &snapshot.query,
                route: snapshot.route_query_string(),
                status: &snapshot.status,
                generation: snapshot.generation,
                total_rows: snapshot.result.as_ref().map_or(0, |r| r.total_rows),
                rows: &rows,
                cursor: navigation.as_ref().map(|n| &n.report),
                cursor_row: navigation.as_ref().and_then(|n| n.row_index()),
                navigated_to: navigation.as_ref().and_then(|n| n.target.as_deref()),
                selection: &snapshot.selection,
            };
            formatter.format_search(&output)?
        }
        Commands::Tags { filters } => {
            session.apply_filters(filters);
            session.search().await?;
            let tags = session.tag_options().await?;
            formatter.format_tags(&tags)?
        }
        Commands::Sorts => {
            let sorts = session.sort_options().await?;
            formatter.format_sorts(&sorts)?
        }
    };

    print!("{rendered}");
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
