//! Watch command - print network tap events while calling endpoints.

use anyhow::Result;
use clap::Args;
use futures::future::join_all;
use inspector_core::TapEvent;
use inspector_fetch::CallOptions;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{info, warn};

use crate::app::App;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Endpoints to GET concurrently.
    pub endpoints: Vec<String>,

    /// Page URL to announce before the calls.
    #[arg(long)]
    pub page: Option<String>,

    /// Keep listening after the calls finish, until Ctrl+C.
    #[arg(long)]
    pub follow: bool,
}

/// Prints events in the selected output format.
struct EventPrinter {
    json: Option<JsonFormatter>,
    text: TextFormatter,
}

impl EventPrinter {
    fn print(&self, event: &TapEvent) -> Result<()> {
        match &self.json {
            Some(json) => println!("{}", json.format_line(event)?),
            None => println!("{}", self.text.format_event(event)),
        }
        Ok(())
    }

    fn received(&self, event: Result<TapEvent, RecvError>) -> Result<bool> {
        match event {
            Ok(event) => self.print(&event).map(|()| true),
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event listener fell behind");
                Ok(true)
            }
            Err(RecvError::Closed) => Ok(false),
        }
    }
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli) -> Result<()> {
    let app = App::load().await?;
    let tap = app.fetch.tap.clone().ok_or_else(|| {
        anyhow::anyhow!("Network interception is disabled (interceptNetworkRequests is false)")
    })?;

    let printer = EventPrinter {
        json: (cli.format == OutputFormat::Json).then(|| JsonFormatter::new(cli.pretty)),
        text: app.text_formatter(cli),
    };
    let mut events = tap.subscribe();

    info!(endpoints = args.endpoints.len(), "Starting watch");

    if let Some(page) = &args.page {
        tap.navigate(page).await;
    }

    let backend = app.backend.clone();
    let calls = join_all(args.endpoints.iter().map(|endpoint| {
        let backend = backend.clone();
        async move { (endpoint, backend.api_call(endpoint, CallOptions::get()).await) }
    }));
    tokio::pin!(calls);

    let results = loop {
        tokio::select! {
            event = events.recv() => {
                if !printer.received(event)? {
                    break (&mut calls).await;
                }
            }
            results = &mut calls => break results,
        }
    };

    loop {
        match events.try_recv() {
            Ok(event) => printer.print(&event)?,
            Err(TryRecvError::Lagged(skipped)) => warn!(skipped, "Event listener fell behind"),
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }

    for (endpoint, result) in &results {
        if let Err(e) = result {
            eprintln!("{}", printer.text.format_error(endpoint, &e.to_string()));
        }
    }

    if let Some(page) = &args.page {
        let metadata = tap.page_metadata(page).await;
        match &printer.json {
            Some(json) => println!("{}", json.format_line(&metadata)?),
            None => println!("\n{}", printer.text.format_page_metadata(&metadata)),
        }
    }

    if args.follow {
        eprintln!("Listening for events, press Ctrl+C to exit");
        loop {
            tokio::select! {
                event = events.recv() => {
                    if !printer.received(event)? {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }
    }

    Ok(())
}
