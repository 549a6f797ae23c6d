use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use hnstories::app::{build_http_client, App, AppEvent};
use hnstories::config::Config;
use hnstories::feed::spawn_orchestrator;
use hnstories::search::SearchClient;
use hnstories::storage::{Database, DatabaseError, PreferenceStore, Unavailable};
use hnstories::ui;

/// Get the config directory path (~/.config/hnstories/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("hnstories");
    Ok(config_dir)
}

/// Log to a file: the terminal belongs to the TUI.
///
/// `HNSTORIES_LOG` takes precedence over `RUST_LOG`; with neither set only
/// warnings and errors are written.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join("hnstories.log");
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file '{}'", log_path.display()))?;

    let filter = EnvFilter::try_from_env("HNSTORIES_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// SEC-007: Set directory permissions on Unix (user-only access)
#[cfg(unix)]
fn restrict_dir_permissions(dir: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700)) {
        tracing::warn!(
            path = %dir.display(),
            error = %e,
            "Failed to set config directory permissions to 0700"
        );
    }
}

/// Open the preference database, or fall back to a store that remembers
/// nothing. Storage problems never stop the app from starting.
async fn open_preferences(db_path: &Path) -> Arc<dyn PreferenceStore> {
    let Some(path) = db_path.to_str() else {
        tracing::warn!(path = %db_path.display(), "Non UTF-8 database path, preferences disabled");
        return Arc::new(Unavailable);
    };

    match Database::open(path).await {
        Ok(db) => Arc::new(db),
        Err(DatabaseError::InstanceLocked) => {
            tracing::warn!("Preference database is locked by another instance, preferences disabled");
            Arc::new(Unavailable)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open preference database, preferences disabled");
            Arc::new(Unavailable)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "hnstories", about = "Search Hacker News stories from the terminal")]
struct Args {
    /// Commit this search term on startup (replaces the stored one)
    #[arg(long, short)]
    term: Option<String>,

    /// Search endpoint; the encoded term is appended to it
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,

    /// Config file (default: ~/.config/hnstories/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Forget stored preferences (delete the preference database)
    #[arg(long)]
    reset_prefs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }
    init_logging(&config_dir)?;

    #[cfg(unix)]
    restrict_dir_permissions(&config_dir);

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let mut config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;
    if let Some(endpoint) = args.endpoint {
        config.search_endpoint = endpoint;
    }

    let db_path = config_dir.join("prefs.db");
    if args.reset_prefs && db_path.exists() {
        std::fs::remove_file(&db_path).context("Failed to delete preference database")?;
        println!("Preferences reset.");
    }

    let prefs = open_preferences(&db_path).await;

    let client = SearchClient::new(
        build_http_client()?,
        config.search_endpoint.clone(),
        config.request_timeout(),
    )
    .context("Invalid search endpoint (https required)")?;
    tracing::info!(endpoint = %client.endpoint(), "Search client ready");

    let (mut app, term_rx) = App::mount(prefs, &config).await;
    if let Some(term) = args.term {
        app.on_search_term_changed(term).await;
    }

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let orchestrator = spawn_orchestrator(Arc::new(client), event_tx, term_rx);

    let result = ui::run(&mut app, event_rx).await;
    orchestrator.abort();
    result
}
