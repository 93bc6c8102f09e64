//! Call command - raw data API call.

use anyhow::Result;
use clap::Args;
use inspector_core::HttpMethod;
use inspector_explorer::QueryRequest;

use crate::app::App;
use crate::commands::{emit, parse_headers};
use crate::Cli;

/// Arguments for the call command.
#[derive(Args)]
pub struct CallArgs {
    /// Endpoint relative to the API base URL, or an absolute URL.
    pub endpoint: String,

    /// HTTP method.
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: HttpMethod,

    /// Extra header, `Name: value`. Repeatable.
    #[arg(long = "header", short = 'H')]
    pub headers: Vec<String>,

    /// Query parameters: a JSON object or a raw query string.
    #[arg(long, short = 'p', default_value = "")]
    pub params: String,

    /// JSON request body (POST, PUT, PATCH).
    #[arg(long, short = 'd', default_value = "")]
    pub data: String,
}

/// Runs the call command.
pub async fn run(args: &CallArgs, cli: &Cli) -> Result<()> {
    let request = QueryRequest {
        method: args.method,
        endpoint: args.endpoint.clone(),
        query_params: args.params.clone(),
        request_body: args.data.clone(),
    };

    let mut options = request.call_options()?;
    options.headers = parse_headers(&args.headers)?;

    let app = App::load().await?;
    let data = app.backend.api_call(&request.url(), options).await?;

    emit(cli, &data, || {
        serde_json::to_string_pretty(&data).unwrap_or_default()
    })
}
