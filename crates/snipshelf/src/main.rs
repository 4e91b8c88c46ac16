//! Snipshelf - a shelf for code snippets and tool configs.
//!
//! This is the main entry point for the snipshelf CLI.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use snipshelf_auth::{AccessGate, ClientCredentials, IdentityProvider, OAuthClient, Provider};
use snipshelf_core::config::{Config, StorageBackend};
use snipshelf_core::{
    derive_defaults, seed, Overrides, Repository, Snippet, StoreRepository, ThemeState,
    ToolConfig, ToolKind,
};
use snipshelf_server::AppState;
use snipshelf_storage::{JsonStorage, MemoryStorage};
use snipshelf_util::log::{self, LogConfig, LogLevel};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser)]
#[command(name = "snipshelf")]
#[command(author, version, about = "Store and browse code snippets and tool configs", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to bind to (defaults to server.address from config)
        #[arg(short, long)]
        address: Option<String>,
        /// Keep records in memory instead of on disk
        #[arg(long)]
        memory: bool,
    },
    /// Search stored snippets or configs
    Search {
        /// Case-insensitive text to look for
        query: String,
        /// Which collection to search
        #[arg(short, long, value_enum, default_value = "snippets")]
        kind: Kind,
        /// Search the sample records in memory instead of the store on disk
        #[arg(long)]
        memory: bool,
    },
    /// Show the default file path and language for a tool
    Defaults {
        /// vscode, neovim, zed or other
        tool: String,
    },
    /// Show configuration
    Config,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Snippets,
    Configs,
}

struct Repositories {
    snippets: Arc<dyn Repository<Snippet>>,
    configs: Arc<dyn Repository<ToolConfig>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir()?;
    let (config, sources) = Config::load(Some(&cwd)).await?;

    // The server logs to stdout; everything else keeps stdout for its output.
    let serving = matches!(cli.command, Commands::Serve { .. });
    init_logging(&config, cli.verbose, serving);
    debug!(sources = sources.len(), "Configuration loaded");

    match cli.command {
        Commands::Serve { address, memory } => run_server(&config, address, memory).await,
        Commands::Search {
            query,
            kind,
            memory,
        } => run_search(&config, &query, kind, memory).await,
        Commands::Defaults { tool } => show_defaults(&tool),
        Commands::Config => show_config(&config, &sources),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn init_logging(config: &Config, verbose: bool, serving: bool) {
    let level = if verbose {
        LogLevel::Debug
    } else {
        config.log_level().unwrap_or_default()
    };

    let log_config = LogConfig {
        level,
        file: if serving { None } else { log::default_log_path() },
        ..Default::default()
    };

    if let Err(e) = log::init(log_config) {
        eprintln!("Warning: Could not initialize logging: {}", e);
    }
}

/// Open the configured store, seeding it when it is empty.
async fn open_repositories(config: &Config, memory: bool) -> anyhow::Result<Repositories> {
    let backend = if memory {
        StorageBackend::Memory
    } else {
        config.storage_backend()
    };

    let repos = match backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage");
            Repositories {
                snippets: Arc::new(StoreRepository::<Snippet, _>::new(MemoryStorage::new())),
                configs: Arc::new(StoreRepository::<ToolConfig, _>::new(MemoryStorage::new())),
            }
        }
        StorageBackend::Json => {
            let root = config
                .storage_path()
                .context("no data directory found; set storage.path")?;
            info!(path = %root.display(), "Using JSON storage");
            let storage = JsonStorage::new(root);
            Repositories {
                snippets: Arc::new(StoreRepository::<Snippet, _>::new(storage.clone())),
                configs: Arc::new(StoreRepository::<ToolConfig, _>::new(storage)),
            }
        }
    };

    if config.seed_enabled() {
        seed::seed_if_empty(repos.snippets.as_ref(), repos.configs.as_ref()).await?;
    }

    Ok(repos)
}

/// Build the OAuth client from whatever provider credentials are configured.
fn identity(config: &Config) -> Arc<dyn IdentityProvider> {
    let credentials: HashMap<Provider, ClientCredentials> = Provider::ALL
        .into_iter()
        .filter_map(|provider| {
            let creds = config.provider_credentials(provider.id())?;
            Some((
                provider,
                ClientCredentials {
                    client_id: creds.client_id,
                    client_secret: creds.client_secret,
                },
            ))
        })
        .collect();

    if credentials.is_empty() && !config.auth_disabled() {
        warn!("No sign-in providers configured; set AUTH_GITHUB_ID or AUTH_GOOGLE_ID");
    }
    for provider in credentials.keys() {
        debug!(%provider, "Sign-in provider configured");
    }

    Arc::new(OAuthClient::new(credentials))
}

async fn run_server(
    config: &Config,
    address: Option<String>,
    memory: bool,
) -> anyhow::Result<()> {
    let address = address.unwrap_or_else(|| config.server_address());
    info!("Starting snipshelf server on {}", address);

    let repos = open_repositories(config, memory).await?;

    let signin_path = config.signin_path();
    let gate = if config.auth_disabled() {
        warn!("Sign-in is disabled; every route is public");
        AccessGate::disabled(signin_path)
    } else {
        AccessGate::new(signin_path)
    };

    let state = AppState::new(repos.snippets, repos.configs, identity(config))
        .with_gate(gate)
        .with_theme(ThemeState::new(config.theme()))
        .with_base_url(config.base_url())
        .with_callback_url(config.callback_url());

    snipshelf_server::serve(state, &address)
        .await
        .with_context(|| format!("server on {address} stopped"))?;

    Ok(())
}

async fn run_search(
    config: &Config,
    query: &str,
    kind: Kind,
    memory: bool,
) -> anyhow::Result<()> {
    let repos = open_repositories(config, memory).await?;

    match kind {
        Kind::Snippets => {
            let found = repos.snippets.search(query).await?;
            if found.is_empty() {
                println!("No snippets match '{}'", query);
            }
            for snippet in found {
                println!(
                    "{:<12} {:<32} {:<12} {}",
                    snippet.id,
                    snippet.title,
                    snippet.language,
                    snippet.tags.join(", ")
                );
            }
        }
        Kind::Configs => {
            let found = repos.configs.search(query).await?;
            if found.is_empty() {
                println!("No configs match '{}'", query);
            }
            for config in found {
                println!(
                    "{:<12} {:<32} {:<8} {}",
                    config.id,
                    config.name,
                    config.tool.label(),
                    config.file_path
                );
            }
        }
    }

    Ok(())
}

fn show_defaults(tool: &str) -> anyhow::Result<()> {
    let tool: ToolKind = tool.parse()?;
    let defaults = derive_defaults(tool, &Overrides::default());

    println!("Tool:      {}", tool.label());
    println!("File path: {}", defaults.file_path);
    println!("Language:  {}", defaults.language.label());

    Ok(())
}

fn show_config(config: &Config, sources: &[std::path::PathBuf]) -> anyhow::Result<()> {
    println!("Configuration sources:");
    if sources.is_empty() {
        println!("  (none)");
    } else {
        for source in sources {
            println!("  {}", source.display());
        }
    }
    println!();

    println!("Current configuration:");
    println!("{}", serde_json::to_string_pretty(config)?);

    Ok(())
}

/// Print version information.
fn print_version() {
    println!("snipshelf {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("A shelf for code snippets and tool configs.");
}
