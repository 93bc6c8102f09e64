//! Stats command - usage counters.

use anyhow::Result;
use clap::Args;
use inspector_store::{SettingsStore, StatsStore};

use crate::commands::emit;
use crate::output::TextFormatter;
use crate::Cli;

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    /// Reset all counters.
    #[arg(long)]
    pub reset: bool,
}

/// Runs the stats command.
pub async fn run(args: &StatsArgs, cli: &Cli) -> Result<()> {
    let stats = StatsStore::load_default().await;
    if args.reset {
        stats.reset().await?;
    }

    let date_format = SettingsStore::load_default().await?.get().await.date_format;
    let formatter = TextFormatter::new(!cli.no_color).with_date_format(date_format);

    let current = stats.get().await;
    emit(cli, &current, || formatter.format_stats(&current))
}
