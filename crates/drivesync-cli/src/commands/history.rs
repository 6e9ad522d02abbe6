//! History command - print the transfer ledger
//!
//! Provides the `drivesync history` CLI command, which lists every recorded
//! transfer oldest first as `N. [timestamp] actor uploaded file -> id`.

use anyhow::{Context, Result};
use clap::Args;

use drivesync_core::domain::HistoryEntry;
use drivesync_core::ports::IHistoryLedger;
use drivesync_history::JsonHistoryLedger;

use super::AppContext;
use crate::output::{get_formatter, OutputFormat};

/// Show the transfer history of the sync root
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Only show the most recent N entries
    #[arg(long)]
    pub limit: Option<usize>,
}

impl HistoryCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let ledger = ctx.history_ledger();
        let entries = read_entries(&ledger).await?;
        let skip = first_visible(entries.len(), self.limit);

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "path": ledger.path().display().to_string(),
                "count": entries.len() - skip,
                "entries": &entries[skip..],
            }));
            return Ok(());
        }

        if entries.is_empty() {
            formatter.warn(NO_HISTORY);
            return Ok(());
        }

        for line in visible_lines(&entries, self.limit) {
            formatter.line(&line);
        }
        Ok(())
    }
}

const NO_HISTORY: &str = "No history found.";

/// All ledger entries, or none when no ledger has been written yet
async fn read_entries(ledger: &JsonHistoryLedger) -> Result<Vec<HistoryEntry>> {
    if !ledger.exists().await {
        return Ok(Vec::new());
    }
    ledger
        .read_all()
        .await
        .context("Failed to read history ledger")
}

/// Index of the first entry shown when keeping the last `limit` of `len`
fn first_visible(len: usize, limit: Option<usize>) -> usize {
    limit.map(|limit| len.saturating_sub(limit)).unwrap_or(0)
}

/// Numbered lines for the shown entries; numbers stay ledger positions
fn visible_lines(entries: &[HistoryEntry], limit: Option<usize>) -> Vec<String> {
    let skip = first_visible(entries.len(), limit);
    entries
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(index, entry)| history_line(index, entry))
        .collect()
}

/// Renders the 1-based `index`-th ledger entry
fn history_line(index: usize, entry: &HistoryEntry) -> String {
    format!("{}. {}", index + 1, entry.describe())
}
