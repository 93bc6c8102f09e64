//! Classify command - object type and record id of page URLs.

use anyhow::Result;
use clap::Args;
use inspector_core::classify;

use crate::commands::emit;
use crate::output::{ClassificationOutput, TextFormatter};
use crate::Cli;

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Page URLs or paths.
    #[arg(required = true)]
    pub urls: Vec<String>,
}

/// Runs the classify command. No network access.
pub fn run(args: &ClassifyArgs, cli: &Cli) -> Result<()> {
    let outputs: Vec<ClassificationOutput> = args
        .urls
        .iter()
        .map(|url| ClassificationOutput::new(url, classify(url)))
        .collect();

    let formatter = TextFormatter::new(!cli.no_color);
    let text = || {
        outputs
            .iter()
            .map(|o| formatter.format_classification(o))
            .collect::<Vec<_>>()
            .join("\n\n")
    };

    if outputs.len() == 1 {
        emit(cli, &outputs[0], text)
    } else {
        emit(cli, &outputs, text)
    }
}
