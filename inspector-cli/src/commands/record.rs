//! Record command - view or export the record shown by a page.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use inspector_explorer::{write_export, ExportOptions};
use inspector_store::ExportFormat;

use crate::app::App;
use crate::commands::emit;
use crate::output::ExportOutput;
use crate::Cli;

/// Arguments for the record command.
#[derive(Args)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub action: RecordAction,
}

/// Export format override.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Pretty-printed JSON.
    Json,
    /// CSV with a header row.
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

/// Record subcommands.
#[derive(Subcommand)]
pub enum RecordAction {
    /// Fetch and print the record.
    View {
        /// Page URL.
        url: String,
    },

    /// Write the record to a file.
    Export {
        /// Page URL.
        url: String,

        /// Output directory.
        #[arg(long, short = 'o', default_value = ".")]
        dir: PathBuf,

        /// Export format. Defaults to the `exportFormat` setting.
        #[arg(long = "as", value_enum)]
        format: Option<FormatArg>,

        /// Omit the metadata wrapper regardless of the `includeMetadata` setting.
        #[arg(long)]
        no_metadata: bool,
    },
}

/// Runs the record command.
pub async fn run(args: &RecordArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;

    match &args.action {
        RecordAction::View { url } => {
            let view = app.explorer.view_record(url).await?;
            let formatter = app.text_formatter(cli);
            emit(cli, &view, || formatter.format_record(&view))
        }
        RecordAction::Export {
            url,
            dir,
            format,
            no_metadata,
        } => {
            let options = ExportOptions {
                format: format.map_or(app.settings.export_format, ExportFormat::from),
                include_metadata: app.settings.include_metadata && !no_metadata,
            };
            let view = app.explorer.view_record(url).await?;
            let path = write_export(dir, &view.location, &view.data, options).await?;
            let output =
                ExportOutput::new(&path, &view.location.record_id, options.format.extension());
            emit(cli, &output, || format!("Exported to {}", path.display()))
        }
    }
}
