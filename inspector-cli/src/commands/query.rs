//! Query command - run and manage explorer queries.

use anyhow::Result;
use clap::{Args, Subcommand};
use inspector_core::HttpMethod;
use inspector_explorer::QueryRequest;

use crate::app::App;
use crate::commands::emit;
use crate::Cli;

/// Arguments for the query command.
#[derive(Args)]
pub struct QueryArgs {
    #[command(subcommand)]
    pub action: QueryAction,
}

/// Query fields shared by `run` and `save`.
#[derive(Args, Clone)]
pub struct QueryFields {
    /// Endpoint relative to the API base URL, or an absolute URL.
    pub endpoint: String,

    /// HTTP method.
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: HttpMethod,

    /// Query parameters: a JSON object or a raw query string.
    #[arg(long, short = 'p', default_value = "")]
    pub params: String,

    /// JSON request body (POST, PUT, PATCH).
    #[arg(long, short = 'b', default_value = "")]
    pub body: String,
}

impl From<&QueryFields> for QueryRequest {
    fn from(fields: &QueryFields) -> Self {
        Self {
            method: fields.method,
            endpoint: fields.endpoint.clone(),
            query_params: fields.params.clone(),
            request_body: fields.body.clone(),
        }
    }
}

/// Query subcommands.
#[derive(Subcommand)]
pub enum QueryAction {
    /// Run a query.
    Run {
        #[command(flatten)]
        fields: QueryFields,

        /// Also save the query under this name.
        #[arg(long)]
        save: Option<String>,
    },

    /// Save a query without running it.
    Save {
        /// Query name.
        name: String,

        #[command(flatten)]
        fields: QueryFields,
    },

    /// List saved queries.
    List,

    /// Show a saved query.
    Show {
        /// Query id.
        id: i64,
    },

    /// Run a saved query.
    Exec {
        /// Query id.
        id: i64,
    },

    /// Delete a saved query.
    Delete {
        /// Query id.
        id: i64,
    },
}

/// Runs the query command.
pub async fn run(args: &QueryArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let explorer = &app.explorer;
    let formatter = app.text_formatter(cli);

    match &args.action {
        QueryAction::Run { fields, save } => {
            let request = QueryRequest::from(fields);
            let result = explorer.execute(&request).await?;
            if let Some(name) = save {
                let saved = explorer.save_query(name, &request).await?;
                eprintln!("Saved as #{}", saved.id);
            }
            emit(cli, &result, || {
                formatter.format_query_result(request.method.as_str(), &result)
            })
        }
        QueryAction::Save { name, fields } => {
            let request = QueryRequest::from(fields);
            request.body()?;
            let saved = explorer.save_query(name, &request).await?;
            emit(cli, &saved, || format!("Saved query #{} ({})", saved.id, saved.name))
        }
        QueryAction::List => {
            let queries = explorer.saved_queries().await;
            emit(cli, &queries, || formatter.format_queries(&queries))
        }
        QueryAction::Show { id } => {
            let query = explorer.saved_query(*id).await?;
            emit(cli, &query, || formatter.format_saved_query(&query))
        }
        QueryAction::Exec { id } => {
            let query = explorer.saved_query(*id).await?;
            let result = explorer.run_saved(*id).await?;
            emit(cli, &result, || {
                formatter.format_query_result(query.method.as_str(), &result)
            })
        }
        QueryAction::Delete { id } => {
            explorer.delete_query(*id).await?;
            emit(cli, &serde_json::json!({ "deleted": id }), || {
                format!("Deleted query #{id}")
            })
        }
    }
}
