//! drivesync CLI - Command-line interface for drivesync
//!
//! Provides commands for:
//! - Checking authorization setup
//! - Pushing local files to the Drive folder
//! - Pulling the Drive folder into the local root
//! - Viewing the transfer history

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    history::HistoryCommand, init::InitCommand, pull::PullCommand, push::PushCommand, AppContext,
    GlobalOptions,
};
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "drivesync",
    version,
    about = "Push and pull a project directory to a Google Drive folder"
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory to sync (defaults to the configured root, then the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Name of the Drive folder to sync with
    #[arg(long, global = true)]
    folder: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show how to authorize and whether a token is present
    Init(InitCommand),
    /// Upload a file, or every eligible file in the root
    Push(PushCommand),
    /// Download every file in the Drive folder into the root
    Pull(PullCommand),
    /// Show the transfer history
    History(HistoryCommand),
}

impl Cli {
    fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            config: self.config.clone(),
            root: self.root.clone(),
            folder: self.folder.clone(),
        }
    }
}

/// Log filter: `-v` wins, then the configured level
fn log_filter(verbose: u8, configured: &str) -> String {
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

async fn run(cli: &Cli, format: OutputFormat) -> Result<()> {
    let ctx = AppContext::load(&cli.global_options())?;

    let filter = log_filter(cli.verbose, &ctx.config().logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Init(cmd) => cmd.execute(&ctx, format).await,
        Commands::Push(cmd) => cmd.execute(&ctx, format).await,
        Commands::Pull(cmd) => cmd.execute(&ctx, format).await,
        Commands::History(cmd) => cmd.execute(&ctx, format).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = OutputFormat::from_flag(cli.json);

    if let Err(e) = run(&cli, format).await {
        get_formatter(format).error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_push_with_file() {
        let cli = Cli::try_parse_from(["drivesync", "push", "notes.md"]).unwrap();
        match cli.command {
            Commands::Push(cmd) => assert_eq!(cmd.file, Some(PathBuf::from("notes.md"))),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_push_without_file() {
        let cli = Cli::try_parse_from(["drivesync", "push"]).unwrap();
        assert!(matches!(cli.command, Commands::Push(PushCommand { file: None })));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "drivesync",
            "pull",
            "--json",
            "-vv",
            "--root",
            "/srv/project",
            "--folder",
            "team-share",
        ])
        .unwrap();

        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        let options = cli.global_options();
        assert_eq!(options.root, Some(PathBuf::from("/srv/project")));
        assert_eq!(options.folder.as_deref(), Some("team-share"));
        assert!(options.config.is_none());
    }

    #[test]
    fn test_history_limit() {
        let cli = Cli::try_parse_from(["drivesync", "history", "--limit", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::History(HistoryCommand { limit: Some(5) })
        ));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Cli::try_parse_from(["drivesync", "sync"]).is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0, "warn"), "warn");
        assert_eq!(log_filter(1, "warn"), "debug");
        assert_eq!(log_filter(3, "warn"), "trace");
    }
}
