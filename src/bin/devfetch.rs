//! DevFetch composer CLI.
//!
//! Builds a request from command-line input, sends it directly or through
//! the proxy service, prints the envelope and keeps a local history.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use devfetch::client::{
    export_file_name, HistoryFilter, LocalHistory, LocalStorage, Preferences, RemoteHistory,
};
use devfetch::config::{self, DevFetchConfig, ObservabilityConfig};
use devfetch::observability::logging;
use devfetch::{normalize, Dispatcher, HeaderRow, Method, Outcome};

#[derive(Parser)]
#[command(name = "devfetch")]
#[command(about = "Compose, send and inspect HTTP requests", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Application backend; URLs outside it go through its proxy.
    #[arg(long)]
    base_url: Option<String>,

    /// Directory for local history and preferences.
    #[arg(long)]
    state_dir: Option<PathBuf>,

    /// Log level; defaults to warn unless the config file sets one.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a request
    Send {
        url: String,

        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Header row as "Key: Value"; repeatable. Prefix with '!' to keep it disabled.
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body text (ignored for GET, DELETE, HEAD, OPTIONS)
        #[arg(short = 'd', long = "data", default_value = "")]
        body: String,
    },
    /// Inspect or edit request history
    History {
        /// Use the server-side log instead of local history
        #[arg(long)]
        remote: bool,

        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Show or toggle the dark mode preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand)]
enum ThemeAction {
    /// Flip the preference and save it
    Toggle,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List entries, newest first
    List {
        /// all, success (2xx) or error (4xx/5xx)
        #[arg(long, default_value = "all")]
        filter: HistoryFilter,

        /// Case-insensitive match on URL or method
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show one entry
    Show { id: String },
    /// Delete one entry
    Delete { id: String },
    /// Delete every entry
    Clear,
    /// Write the history as JSON (default: devfetch-history-YYYY-MM-DD.json)
    Export { path: Option<PathBuf> },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = config::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        config.client.base_url = base_url;
    }
    if let Some(state_dir) = cli.state_dir {
        config.client.state_dir = state_dir;
    }
    config.observability.log_level = effective_log_level(cli.log_level, &config.observability.log_level);
    logging::init(&config.observability);

    let storage = LocalStorage::new(&config.client.state_dir);

    match cli.command {
        Commands::Send {
            url,
            method,
            headers,
            body,
        } => send(&config, storage, &url, &method, &headers, &body).await,
        Commands::History { remote: true, action } => remote_history(&config, action).await,
        Commands::History { remote: false, action } => local_history(storage, action),
        Commands::Theme { action } => {
            let mut prefs = Preferences::load(storage);
            let dark = match action {
                Some(ThemeAction::Toggle) => prefs.toggle_dark_mode()?,
                None => prefs.dark_mode(),
            };
            println!("dark mode: {}", if dark { "on" } else { "off" });
            Ok(())
        }
    }
}

async fn send(
    config: &DevFetchConfig,
    storage: LocalStorage,
    url: &str,
    method: &str,
    headers: &[String],
    body: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let method: Method = method.parse()?;
    let rows: Vec<HeaderRow> = headers.iter().map(|h| parse_header_row(h)).collect();
    let descriptor = normalize(url, method, &rows, body);

    let history = Arc::new(LocalHistory::load(storage));
    let dispatcher = Dispatcher::from_config(&config.client, history)?;

    let outcome = dispatcher.dispatch(&descriptor).await;
    if let Outcome::Error(envelope) = &outcome {
        eprintln!("Error: {} {}", envelope.status, envelope.status_text);
    }
    print_json(outcome.envelope())
}

fn local_history(storage: LocalStorage, action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let history = LocalHistory::load(storage);
    match action {
        HistoryAction::List { filter, search } => {
            for entry in history.filtered(filter, &search) {
                println!(
                    "{}  {}  {:<7} {:>3}  {}ms  {}",
                    entry.id,
                    entry.timestamp.to_rfc3339(),
                    entry.method.as_str(),
                    entry.response_status,
                    entry.response_time_ms,
                    entry.url
                );
            }
            let stats = history.stats();
            println!(
                "{} total, {} success, {} error, {}ms average",
                stats.total, stats.success, stats.error, stats.average_response_ms
            );
            Ok(())
        }
        HistoryAction::Show { id } => match history.get(&id) {
            Some(entry) => print_json(&entry),
            None => Err(format!("no history entry with id {id}").into()),
        },
        HistoryAction::Delete { id } => {
            if history.delete(&id) {
                println!("Request deleted");
                Ok(())
            } else {
                Err(format!("no history entry with id {id}").into())
            }
        }
        HistoryAction::Clear => {
            history.clear();
            println!("History cleared");
            Ok(())
        }
        HistoryAction::Export { path } => {
            let path = path.unwrap_or_else(default_export_path);
            history.export(&path)?;
            println!("Exported {} requests to {}", history.len(), path.display());
            Ok(())
        }
    }
}

async fn remote_history(config: &DevFetchConfig, action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let remote = RemoteHistory::new(
        &config.client.base_url,
        Duration::from_secs(config.client.timeout_secs),
    )?;
    match action {
        HistoryAction::List { filter, search } => {
            let needle = search.to_lowercase();
            let logs: Vec<_> = remote
                .list()
                .await?
                .into_iter()
                .filter(|log| filter.matches(log.response_status))
                .filter(|log| {
                    needle.is_empty()
                        || log.url.to_lowercase().contains(&needle)
                        || log.method.as_str().to_lowercase().contains(&needle)
                })
                .collect();
            print_json(&logs)
        }
        HistoryAction::Show { id } => print_json(&remote.get(&id).await?),
        HistoryAction::Delete { id } => print_json(&remote.delete(&id).await?),
        HistoryAction::Clear => print_json(&remote.clear().await?),
        HistoryAction::Export { path } => {
            let path = path.unwrap_or_else(default_export_path);
            let logs = remote.list().await?;
            std::fs::write(&path, serde_json::to_string_pretty(&logs)?)?;
            println!("Exported {} requests to {}", logs.len(), path.display());
            Ok(())
        }
    }
}

fn default_export_path() -> PathBuf {
    PathBuf::from(export_file_name(chrono::Utc::now().date_naive()))
}

/// The flag wins; a level left at the server default drops to warn.
fn effective_log_level(flag: Option<String>, configured: &str) -> String {
    match flag {
        Some(level) => level,
        None if configured == ObservabilityConfig::default().log_level => "warn".to_string(),
        None => configured.to_string(),
    }
}

/// "Key: Value" → row; a leading '!' marks the row disabled.
fn parse_header_row(raw: &str) -> HeaderRow {
    let (enabled, raw) = match raw.strip_prefix('!') {
        Some(rest) => (false, rest),
        None => (true, raw),
    };
    let (key, value) = raw.split_once(':').unwrap_or((raw, ""));
    let row = HeaderRow::new(key.trim(), value.trim());
    if enabled {
        row
    } else {
        row.disabled()
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_respects_config_and_flag() {
        assert_eq!(effective_log_level(None, "info"), "warn");
        assert_eq!(effective_log_level(None, "debug"), "debug");
        assert_eq!(effective_log_level(Some("trace".into()), "debug"), "trace");
    }

    #[test]
    fn test_history_list_args() {
        let cli = Cli::try_parse_from([
            "devfetch", "history", "list", "--filter", "error", "--search", "users",
        ])
        .unwrap();
        match cli.command {
            Commands::History {
                remote: false,
                action: HistoryAction::List { filter, search },
            } => {
                assert_eq!(filter, HistoryFilter::Error);
                assert_eq!(search, "users");
            }
            _ => panic!("unexpected command"),
        }
        assert!(Cli::try_parse_from(["devfetch", "history", "list", "--filter", "bogus"]).is_err());
    }

    #[test]
    fn test_parse_header_row() {
        assert_eq!(parse_header_row("Accept: text/plain"), HeaderRow::new("Accept", "text/plain"));
        assert_eq!(
            parse_header_row("!X-Debug: 1"),
            HeaderRow::new("X-Debug", "1").disabled()
        );
        assert_eq!(parse_header_row("Authorization: Bearer a:b"), HeaderRow::new("Authorization", "Bearer a:b"));
        assert!(!parse_header_row("NoColon").is_active());
    }
}
