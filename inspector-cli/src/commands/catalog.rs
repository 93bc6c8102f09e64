//! Catalog command - endpoints listed by the OpenAPI document.

use anyhow::Result;
use clap::Args;

use crate::app::App;
use crate::commands::emit;
use crate::Cli;

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only show paths containing this text.
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

/// Runs the catalog command.
pub async fn run(args: &CatalogArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let catalog = app.explorer.catalog().await?;
    let endpoints = catalog.search(args.search.as_deref().unwrap_or_default());

    let formatter = app.text_formatter(cli);
    emit(cli, &endpoints, || formatter.format_catalog(&catalog, &endpoints))
}
