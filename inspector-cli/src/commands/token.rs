//! Token command - obtain, inspect and clear the bearer token.

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::app::App;
use crate::commands::emit;
use crate::output::TokenStatusOutput;
use crate::Cli;

/// Arguments for the token command.
#[derive(Args)]
pub struct TokenArgs {
    #[command(subcommand)]
    pub action: Option<TokenAction>,
}

/// Token subcommands.
#[derive(Subcommand, Clone, Copy)]
pub enum TokenAction {
    /// Print a valid bearer token, exchanging credentials if needed.
    Get,

    /// Show whether a token is cached and when it expires (default).
    Status,

    /// Forget the cached token.
    Clear,
}

/// Runs the token command.
pub async fn run(args: &TokenArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;

    match args.action.unwrap_or(TokenAction::Status) {
        TokenAction::Get => {
            let token = app.backend.get_token().await?;
            emit(cli, &serde_json::json!({ "token": token }), || token.clone())
        }
        TokenAction::Status => {
            let credential = app.fetch.broker.credential().await;
            let config = app.fetch.broker.config();
            let status = TokenStatusOutput::new(
                credential.as_ref(),
                &config.token_url,
                &config.client_id,
                app.secret_source.clone(),
            );
            emit(cli, &status, || app.text_formatter(cli).format_token_status(&status))
        }
        TokenAction::Clear => {
            app.fetch.broker.clear_token().await;
            emit(cli, &serde_json::json!({ "cleared": true }), || {
                "Token cleared".to_string()
            })
        }
    }
}
