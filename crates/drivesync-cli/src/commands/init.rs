//! Init command - authorization guidance
//!
//! Provides the `drivesync init` CLI command which explains where the OAuth
//! token and the OAuth client credentials are expected, and reports whether
//! a usable token is present and whether it can be refreshed. It never
//! writes anything.

use anyhow::Result;
use clap::Args;

use drivesync_drive::auth::{StoredToken, DRIVE_SCOPE};
use drivesync_drive::DriveError;

use super::AppContext;
use crate::output::{get_formatter, OutputFormat};

/// Show how to authorize drivesync
#[derive(Debug, Args)]
pub struct InitCommand {}

impl InitCommand {
    pub async fn execute(&self, ctx: &AppContext, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let token_path = ctx.config().token_path();
        let credentials_path = ctx.config().credentials_path();
        let can_refresh = ctx.token_refresher()?.is_some();

        let status = match StoredToken::load(&token_path) {
            Ok(token) => Ok(token),
            Err(DriveError::TokenMissing(_)) => Err(None),
            Err(e) => Err(Some(e)),
        };

        if format.is_json() {
            let (present, valid, expired, error) = match &status {
                Ok(token) => (true, true, token.is_expired(), None),
                Err(None) => (false, false, false, None),
                Err(Some(e)) => (true, false, false, Some(e.to_string())),
            };
            formatter.print_json(&serde_json::json!({
                "token_path": token_path.display().to_string(),
                "token_present": present,
                "token_valid": valid,
                "token_expired": expired,
                "credentials_path": credentials_path.display().to_string(),
                "refresh_enabled": can_refresh,
                "error": error,
                "scope": DRIVE_SCOPE,
                "config_path": ctx.config_path().display().to_string(),
                "root": ctx.root().display().to_string(),
                "folder": ctx.config().remote.folder_name,
            }));
            return Ok(());
        }

        formatter.line("drivesync uses an OAuth token created by an external authorization tool.");
        formatter.info(&format!("Required scope: {DRIVE_SCOPE}"));
        formatter.info(&format!("Token file:     {}", token_path.display()));
        formatter.info(&format!("Credentials:    {}", credentials_path.display()));
        formatter.info(&format!("Config file:    {}", ctx.config_path().display()));
        formatter.info(&format!("Sync root:      {}", ctx.root().display()));
        formatter.info(&format!("Drive folder:   {}", ctx.config().remote.folder_name));

        match status {
            Ok(token) if token.is_expired() && can_refresh && token.refresh_token.is_some() => {
                formatter.info("Token expired; it will be refreshed on the next push or pull.");
            }
            Ok(token) if token.is_expired() => {
                formatter.warn(
                    "Token found but expired and cannot be refreshed. Add the client credentials or re-run the authorization tool.",
                );
            }
            Ok(token) => {
                if !token.has_drive_scope() {
                    formatter.warn("Token does not list the Drive scope; requests may be rejected.");
                }
                formatter.success("Token found. Ready to push and pull.");
                if !can_refresh {
                    formatter.info("No client credentials found; the token will not be refreshed when it expires.");
                }
            }
            Err(None) => {
                formatter.warn(
                    "Token not found. Run the authorization tool and save its output at the path above.",
                );
            }
            Err(Some(e)) => formatter.error(&e.to_string()),
        }

        Ok(())
    }
}
