//! Objects command - metadata browser.

use anyhow::Result;
use clap::{Args, Subcommand};
use inspector_explorer::filter_objects;

use crate::app::App;
use crate::commands::emit;
use crate::Cli;

/// Arguments for the objects command.
#[derive(Args)]
pub struct ObjectsArgs {
    #[command(subcommand)]
    pub action: ObjectsAction,
}

/// Objects subcommands.
#[derive(Subcommand)]
pub enum ObjectsAction {
    /// List objects.
    List {
        /// Case-insensitive label filter.
        #[arg(long, short = 's')]
        filter: Option<String>,
    },

    /// Describe an object's fields.
    Describe {
        /// Object name.
        name: String,
    },
}

/// Runs the objects command.
pub async fn run(args: &ObjectsArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let formatter = app.text_formatter(cli);

    match &args.action {
        ObjectsAction::List { filter } => {
            let objects = app.explorer.list_objects().await?;
            let shown = filter_objects(&objects, filter.as_deref().unwrap_or_default());
            emit(cli, &shown, || formatter.format_objects(&shown))
        }
        ObjectsAction::Describe { name } => {
            let description = app.explorer.describe_object(name).await?;
            emit(cli, &description, || formatter.format_description(&description))
        }
    }
}
