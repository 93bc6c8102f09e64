//! Output formatting for CLI.

mod json;
mod text;

pub use json::{ClassificationOutput, ExportOutput, JsonFormatter, TokenStatusOutput};
pub use text::TextFormatter;
#[cfg(test)]
mod tests;
