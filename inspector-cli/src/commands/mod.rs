//! CLI command implementations.

pub mod call;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod data;
pub mod objects;
pub mod query;
pub mod record;
pub mod serve;
pub mod stats;
pub mod token;
pub mod watch;

use anyhow::Result;
use serde::Serialize;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Prints `data` as JSON, or the text rendering otherwise.
pub(crate) fn emit<T: Serialize>(cli: &Cli, data: &T, text: impl FnOnce() -> String) -> Result<()> {
    match cli.format {
        OutputFormat::Text => println!("{}", text()),
        OutputFormat::Json => println!("{}", JsonFormatter::new(cli.pretty).format(data)?),
    }
    Ok(())
}

/// Parses `Name: value` header arguments.
pub(crate) fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|h| {
            let (name, value) = h
                .split_once(':')
                .ok_or_else(|| anyhow::anyhow!("Invalid header (expected 'Name: value'): {h}"))?;
            Ok((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&["X-Trace: abc".into(), "Accept:application/json".into()])
            .unwrap();
        assert_eq!(
            headers,
            vec![
                ("X-Trace".to_string(), "abc".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ]
        );
        assert!(parse_headers(&["no-colon".into()]).is_err());
    }
}
