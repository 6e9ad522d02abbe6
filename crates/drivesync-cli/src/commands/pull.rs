//! Pull command - download the Drive folder into the sync root

use anyhow::Result;
use clap::Args;

use super::AppContext;
use crate::output::{get_formatter, OutputFormat};

/// Download every file in the Drive folder
#[derive(Debug, Args)]
pub struct PullCommand {}

impl PullCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let engine = ctx.build_engine().await?;

        let report = engine.pull().await?;

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "folder": engine.folder_name(),
                "root": ctx.root().display().to_string(),
                "downloaded_count": report.downloaded.len(),
                "downloaded": report.downloaded,
                "skipped": report.skipped,
            }));
            return Ok(());
        }

        for name in &report.skipped {
            formatter.warn(&format!("Skipped folder {name}"));
        }
        if report.downloaded.is_empty() {
            formatter.info(&format!(
                "Folder '{}' has no files to pull.",
                engine.folder_name()
            ));
            return Ok(());
        }
        for record in &report.downloaded {
            formatter.success(&format!(
                "Downloaded {} ({} bytes)",
                record.file, record.bytes
            ));
        }
        formatter.info(&format!(
            "{} downloaded into {}",
            report.downloaded.len(),
            ctx.root().display()
        ));
        Ok(())
    }
}
