//! Serve command - answer backend messages over stdin/stdout.
//!
//! Each input line is one JSON message such as `{"action": "getToken"}`.
//! Each output line is the matching response.

use anyhow::Result;
use inspector_explorer::Response;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::app::App;
use crate::output::JsonFormatter;

/// Runs the serve command until stdin closes.
pub async fn run() -> Result<()> {
    let app = App::load().await?;
    let formatter = JsonFormatter::new(false);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0usize;

    info!("Serving backend messages on stdin");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Ok(message) => app.backend.handle_value(message).await,
            Err(e) => {
                debug!(error = %e, "Malformed message");
                Response::failure(format!("Invalid JSON: {e}"))
            }
        };

        let mut out = formatter.format_line(&response)?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
        handled += 1;
    }

    debug!(handled, "Input closed");
    Ok(())
}
