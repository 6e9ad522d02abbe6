//! Push command - upload local files to Drive
//!
//! Provides the `drivesync push [file]` CLI command which:
//! 1. Checks that a named file exists before touching the token or Drive
//! 2. Uploads the named file, or every eligible file in the sync root
//! 3. Reports each upload and each isolated failure
//! 4. Prints a summary (or the full report with `--json`)

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use drivesync_core::domain::DomainError;
use drivesync_sync::engine::PushReport;

use super::AppContext;
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Upload a file, or every eligible file in the root
#[derive(Debug, Args)]
pub struct PushCommand {
    /// File to upload (relative paths resolve against the sync root)
    pub file: Option<PathBuf>,
}

impl PushCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        if let Some(file) = &self.file {
            let full = ctx.root().join(file);
            let exists = tokio::fs::try_exists(&full)
                .await
                .with_context(|| format!("Failed to check {}", full.display()))?;
            if !exists {
                formatter.error(&DomainError::FileNotFound(full).to_string());
                return Ok(());
            }
        }

        let engine = ctx.build_engine().await?;

        let paths: Vec<PathBuf> = self.file.iter().cloned().collect();
        info!(explicit = paths.len(), "Running push");

        let report = match engine.push(&paths).await {
            Ok(report) => report,
            Err(e) => {
                if let Some(not_found @ DomainError::FileNotFound(_)) = e.downcast_ref::<DomainError>() {
                    formatter.error(&not_found.to_string());
                    return Ok(());
                }
                return Err(e);
            }
        };

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "folder": engine.folder_name(),
                "uploaded_count": report.uploaded.len(),
                "failed_count": report.failed.len(),
                "uploaded": report.uploaded,
                "failed": report.failed,
            }));
            return Ok(());
        }

        print_report(formatter.as_ref(), &report, engine.folder_name());
        Ok(())
    }
}

fn print_report(formatter: &dyn OutputFormatter, report: &PushReport, folder: &str) {
    if report.attempted() == 0 {
        formatter.info("Nothing to push.");
        return;
    }

    for record in &report.uploaded {
        formatter.success(&format!("Uploaded {} -> {}", record.file, record.remote_id));
    }
    for failure in &report.failed {
        formatter.error(&format!(
            "Failed to upload {}: {}",
            failure.path.display(),
            failure.error
        ));
    }

    formatter.info(&format!(
        "{} uploaded, {} failed (folder '{}')",
        report.uploaded.len(),
        report.failed.len(),
        folder
    ));
}
