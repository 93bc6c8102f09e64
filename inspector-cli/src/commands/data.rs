//! Data command - raw data browser.

use anyhow::Result;
use clap::Args;
use inspector_explorer::{records_to_csv, DataQuery};

use crate::app::App;
use crate::commands::emit;
use crate::Cli;

/// Arguments for the data command.
#[derive(Args)]
pub struct DataArgs {
    /// Object name.
    pub object: String,

    /// Comma-separated fields, or `*` for all.
    #[arg(long)]
    pub fields: Option<String>,

    /// Filter expression.
    #[arg(long = "where", short = 'w')]
    pub where_clause: Option<String>,

    /// Row limit. Defaults to the `maxResults` setting.
    #[arg(long, short = 'n')]
    pub limit: Option<u32>,

    /// Print rows as CSV.
    #[arg(long)]
    pub csv: bool,
}

impl From<&DataArgs> for DataQuery {
    fn from(args: &DataArgs) -> Self {
        Self {
            object: args.object.clone(),
            fields: args.fields.clone(),
            where_clause: args.where_clause.clone(),
            limit: args.limit,
        }
    }
}

/// Runs the data command.
pub async fn run(args: &DataArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let records = app.explorer.browse(&DataQuery::from(args)).await?;

    if args.csv {
        print!("{}", records_to_csv(&records));
        return Ok(());
    }

    let formatter = app.text_formatter(cli);
    emit(cli, &records, || formatter.format_records(&records))
}
