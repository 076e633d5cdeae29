//! `chatscrub` - find chat messages by keyword and delete them in bulk.
//!
//! Works on a JSON export of one server. Deletions are written back to the
//! export file.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod command;
mod console;
mod settings;

use std::path::PathBuf;

use anyhow::Context;
use chatscrub_core::{ArchiveExport, ExclusionStore, MemoryOrigin};
use clap::Parser;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::console::Console;
use crate::settings::{load_settings_or_default, settings_path};

/// Find chat messages by keyword and delete them in bulk.
#[derive(Debug, Parser)]
#[command(name = "chatscrub", version, about)]
struct Cli {
    /// JSON export of the server to search.
    export: PathBuf,

    /// Settings file.
    #[arg(long, env = "CHATSCRUB_SETTINGS")]
    settings: Option<PathBuf>,

    /// Exclusion list file (overrides the settings file).
    #[arg(long, env = "CHATSCRUB_EXCLUSIONS")]
    exclusions: Option<PathBuf>,

    /// Results per page (overrides the settings file).
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    page_size: Option<u16>,

    /// Do not write deletions back to the export file.
    #[arg(long)]
    dry_export: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatscrub=info,chatscrub_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    info!("Starting chatscrub");

    let mut settings =
        load_settings_or_default(&cli.settings.clone().unwrap_or_else(settings_path)).await;
    if let Some(path) = cli.exclusions {
        settings.exclusions_path = Some(path);
    }
    if let Some(page_size) = cli.page_size {
        settings.page_size = usize::from(page_size);
    }

    let export = ArchiveExport::load(&cli.export)
        .await
        .with_context(|| format!("Failed to load export {}", cli.export.display()))?;
    let origin = MemoryOrigin::from_export(export);
    info!(
        scope = %origin.scope(),
        name = origin.scope_name(),
        "Loaded export"
    );

    let exclusions = ExclusionStore::load(settings.exclusions_path()).await;

    let mut console = Console::new(origin, exclusions, settings, std::io::stdout());
    if !cli.dry_export {
        console = console.with_export_path(cli.export);
    }

    console.run(BufReader::new(tokio::io::stdin())).await
}
