//! Config command - manage settings and the client secret.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use inspector_fetch::SystemKeychain;
use inspector_store::keychain::{
    delete_client_secret, resolve_client_secret_with_source, store_client_secret,
};
use inspector_store::{
    default_config_dir, default_queries_path, default_settings_path, default_stats_path,
    default_token_cache_path, Access, JsonFile, SettingsStore,
};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::commands::emit;
use crate::output::TextFormatter;
use crate::Cli;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current settings.
    Show,

    /// Show file locations.
    Path,

    /// Set one setting, e.g. `maxResults 50` or `platform.clientId abc`.
    Set {
        /// Setting name (camelCase or snake_case).
        key: String,
        /// New value.
        value: String,
    },

    /// Restore default settings. The platform connection is kept.
    Reset,

    /// Export settings as JSON.
    Export {
        /// Output file or directory. Prints to stdout if omitted.
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Import settings from an exported JSON file.
    Import {
        /// Exported settings file.
        path: PathBuf,
    },

    /// Manage the client secret in the system keychain.
    Secret {
        #[command(subcommand)]
        action: SecretAction,
    },
}

/// Secret subcommands.
#[derive(Subcommand)]
pub enum SecretAction {
    /// Store the secret. Reads stdin if no value is given.
    Set {
        /// Client secret.
        value: Option<String>,
    },

    /// Remove the stored secret.
    Delete,

    /// Show where the secret is resolved from.
    Status,
}

/// Runs the config command.
pub async fn run(args: &ConfigArgs, cli: &Cli) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => show_paths(cli),
        ConfigAction::Set { key, value } => set_value(key, value).await,
        ConfigAction::Reset => reset_config().await,
        ConfigAction::Export { output } => export_config(output.as_deref(), cli).await,
        ConfigAction::Import { path } => import_config(path).await,
        ConfigAction::Secret { action } => secret(action, cli).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let settings = store.get().await;
    let formatter = TextFormatter::new(!cli.no_color);
    emit(cli, &settings, || formatter.format_settings(&settings))
}

fn show_paths(cli: &Cli) -> Result<()> {
    let paths = [
        ("configDir", default_config_dir()),
        ("settingsFile", default_settings_path()),
        ("queriesFile", default_queries_path()),
        ("statsFile", default_stats_path()),
        ("tokenCache", default_token_cache_path()),
    ];

    let json: serde_json::Map<String, serde_json::Value> = paths
        .iter()
        .map(|(name, path)| ((*name).to_string(), path.display().to_string().into()))
        .collect();

    emit(cli, &json, || {
        let mut lines = vec!["Configuration Paths".to_string(), "─".repeat(40), String::new()];
        lines.push(format!("Config dir:    {}", paths[0].1.display()));
        lines.push(format!("Settings file: {}", paths[1].1.display()));
        lines.push(format!("Queries file:  {}", paths[2].1.display()));
        lines.push(format!("Stats file:    {}", paths[3].1.display()));
        lines.push(format!("Token cache:   {}", paths[4].1.display()));
        lines.join("\n")
    })
}

async fn set_value(key: &str, value: &str) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    store.set_field(key, value).await?;

    info!(key, "Setting updated");
    println!("{key} = {value}");
    Ok(())
}

async fn reset_config() -> Result<()> {
    let store = SettingsStore::load_default().await?;
    store.reset().await?;

    info!(path = %store.path().display(), "Settings reset");
    println!("Settings reset to defaults");
    Ok(())
}

async fn export_config(output: Option<&Path>, cli: &Cli) -> Result<()> {
    let store = SettingsStore::load_default().await?;
    let export = store.export().await;

    let Some(output) = output else {
        let pretty = crate::output::JsonFormatter::new(true);
        println!("{}", pretty.format(&export)?);
        return Ok(());
    };

    let path = if output.is_dir() {
        output.join(export.file_name())
    } else {
        output.to_path_buf()
    };
    // Exports carry custom headers.
    JsonFile::new(&path, Access::Private).write(&export).await?;

    info!(path = %path.display(), "Settings exported");
    emit(cli, &serde_json::json!({ "path": path.display().to_string() }), || {
        format!("Exported to {}", path.display())
    })
}

async fn import_config(path: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document: serde_json::Value =
        serde_json::from_str(&content).context("Import file is not valid JSON")?;

    let store = SettingsStore::load_default().await?;
    store.import(&document).await?;

    println!("Imported settings from {}", path.display());
    Ok(())
}

async fn secret(action: &SecretAction, cli: &Cli) -> Result<()> {
    let keychain = SystemKeychain::new();

    match action {
        SecretAction::Set { value } => {
            let secret = match value {
                Some(value) => value.trim().to_string(),
                None => {
                    let mut input = String::new();
                    tokio::io::stdin().read_to_string(&mut input).await?;
                    input.trim().to_string()
                }
            };
            if secret.is_empty() {
                anyhow::bail!("Client secret is empty");
            }
            store_client_secret(&keychain, &secret).await?;
            println!("Client secret stored in keychain");
        }
        SecretAction::Delete => {
            delete_client_secret(&keychain).await?;
            println!("Client secret removed from keychain");
        }
        SecretAction::Status => {
            let source = resolve_client_secret_with_source(&keychain)
                .await
                .map(|(_, source)| source.to_string());
            emit(cli, &serde_json::json!({ "configured": source.is_some(), "source": source }), || {
                match &source {
                    Some(source) => format!("Client secret: {source}"),
                    None => "Client secret: not configured".to_string(),
                }
            })?;
        }
    }

    Ok(())
}
