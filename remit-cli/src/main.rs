//! Remit CLI - command-line front end for the Remit admin backend
//!
//! Signs in with a bearer token, queries the dashboard resources and hosts an
//! interactive console that runs the inactivity session lifecycle.

mod console;
mod terminal;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use console::SessionConsole;
use remit_client::{ApiClient, ProfileService, Report};
use remit_core::{
    init_logging, log_operation_error, log_operation_start, log_operation_success,
    CredentialStore, RemitConfig, RemitResult,
};
use remit_session::{
    ActivityHub, FileStore, SessionCollaborators, SessionLifecycleManager, SessionTimings,
    StoredCredentials,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use terminal::{TerminalNotifier, TerminalTerminator};
use tokio::sync::Notify;
use tracing::info;

#[derive(Parser)]
#[command(name = "remit")]
#[command(about = "Admin client for the Remit money transfer backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an access token obtained from the web login
    Login {
        /// Bearer token
        #[arg(short, long)]
        token: String,

        /// Refresh token, if the backend issued one
        #[arg(long)]
        refresh_token: Option<String>,
    },

    /// Forget the stored credentials and cached profile
    Logout,

    /// Show whether a login is stored
    Status,

    /// Show the signed-in user's profile
    Profile {
        /// Bypass the profile cache
        #[arg(long)]
        refresh: bool,
    },

    /// List a collection
    List {
        #[arg(value_enum)]
        resource: ResourceKind,
    },

    /// Fetch a report (dashboard, active-users, top-senders, statistics)
    Report { name: String },

    /// Interactive console with inactivity timeout
    Session,

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResourceKind {
    Users,
    Transactions,
    ExchangeRates,
}

/// Collaborators shared by the commands that talk to the backend
struct App {
    config: RemitConfig,
    credentials: Arc<StoredCredentials>,
    notifier: Arc<TerminalNotifier>,
}

impl App {
    fn open(config: RemitConfig) -> RemitResult<Self> {
        let store_path = config.storage.resolved_data_dir().join("store.json");
        let store = FileStore::open(&store_path)?;
        info!(path = %store_path.display(), "Opened credential store");

        let credentials = Arc::new(StoredCredentials::new(
            Arc::new(store),
            config.storage.profile_cache_ttl(),
        ));

        Ok(Self {
            config,
            credentials,
            notifier: Arc::new(TerminalNotifier::new()),
        })
    }

    fn client(&self) -> RemitResult<ApiClient> {
        ApiClient::new(
            &self.config.api,
            self.credentials.clone(),
            self.notifier.clone(),
        )
    }

    fn require_login(&self) -> Result<()> {
        if !self.credentials.is_authenticated() {
            bail!("Not signed in. Run 'remit login --token <TOKEN>' first");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    init_logging(&logging_config).context("Failed to initialize logging")?;

    info!("Starting Remit CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Config {
            show,
            init,
            validate,
        } => handle_config(cli.config.as_deref(), &config, show, init, validate),
        Commands::Login {
            token,
            refresh_token,
        } => handle_login(&App::open(config)?, &token, refresh_token.as_deref()),
        Commands::Logout => handle_logout(&App::open(config)?),
        Commands::Status => handle_status(&App::open(config)?),
        Commands::Profile { refresh } => handle_profile(&App::open(config)?, refresh).await,
        Commands::List { resource } => handle_list(&App::open(config)?, resource).await,
        Commands::Report { name } => handle_report(&App::open(config)?, &name).await,
        Commands::Session => handle_session(&App::open(config)?).await,
    }
}

fn load_config(config_path: Option<&Path>) -> Result<RemitConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        return Ok(RemitConfig::from_file(path)?);
    }

    let default_paths = [
        dirs::config_dir().map(|d| d.join("remit").join("config.toml")),
        Some(PathBuf::from("remit.toml")),
    ];

    for path in default_paths.iter().flatten() {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            return Ok(RemitConfig::from_file(path)?);
        }
    }

    Ok(RemitConfig::default())
}

fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|d| d.join("remit").join("config.toml"))
        .context("Could not determine a configuration directory")
}

fn handle_login(app: &App, token: &str, refresh_token: Option<&str>) -> Result<()> {
    log_operation_start!("login");

    if token.trim().is_empty() {
        bail!("Token must not be empty");
    }

    app.credentials
        .save_login::<serde_json::Value>(token.trim(), refresh_token, None)
        .map_err(|e| {
            log_operation_error!("login", e);
            e
        })?;

    log_operation_success!("login");
    println!("✅ Signed in");
    Ok(())
}

fn handle_logout(app: &App) -> Result<()> {
    app.credentials.clear_token()?;
    app.credentials.clear_profile()?;
    println!("👋 Signed out");
    Ok(())
}

fn handle_status(app: &App) -> Result<()> {
    if !app.credentials.is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }

    println!("Signed in against {}", app.config.api.base_url);
    match app
        .credentials
        .profile_cache()
        .load::<remit_client::UserProfile>()
    {
        Some(profile) => println!("Cached profile: {} <{}>", profile.full_name(), profile.email),
        None => println!("No cached profile"),
    }
    Ok(())
}

async fn handle_profile(app: &App, refresh: bool) -> Result<()> {
    log_operation_start!("profile", refresh = refresh);

    let service = ProfileService::new(Arc::new(app.client()?), app.credentials.clone());
    let profile = service.get_profile(refresh).await.map_err(|e| {
        log_operation_error!("profile", e);
        e
    })?;

    log_operation_success!("profile", user_id = profile.id);
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

async fn handle_list(app: &App, resource: ResourceKind) -> Result<()> {
    app.require_login()?;
    let client = app.client()?;
    let handle = match resource {
        ResourceKind::Users => client.users(),
        ResourceKind::Transactions => client.transactions(),
        ResourceKind::ExchangeRates => client.exchange_rates(),
    };

    log_operation_start!("list", path = handle.path());
    let items = handle.list().await?;
    log_operation_success!("list", path = handle.path());

    print_payload(items)
}

async fn handle_report(app: &App, name: &str) -> Result<()> {
    app.require_login()?;
    let report: Report = name.parse()?;

    log_operation_start!("report", report = %report);
    let payload = app.client()?.report(report).await?;
    log_operation_success!("report", report = %report);

    print_payload(payload)
}

async fn handle_session(app: &App) -> Result<()> {
    app.require_login()?;
    log_operation_start!("session");

    let ended = Arc::new(Notify::new());
    let hub = Arc::new(ActivityHub::new());
    let manager = SessionLifecycleManager::start(
        SessionTimings::default(),
        SessionCollaborators {
            notifier: app.notifier.clone(),
            credentials: app.credentials.clone(),
            terminator: Arc::new(TerminalTerminator::new(ended.clone())),
        },
        hub.as_ref(),
    )?;

    let client = Arc::new(app.client()?.with_session(manager.clone()));
    let profiles =
        ProfileService::new(client, app.credentials.clone()).with_session(manager.clone());
    match profiles.get_profile(false).await {
        Ok(profile) => println!("Welcome, {}", profile.full_name()),
        Err(e) if e.is_auth_failure() => return Ok(()),
        Err(e) => {
            log_operation_error!("session", e, step = "load_profile");
        }
    }

    let console = SessionConsole {
        manager,
        hub,
        notifier: app.notifier.clone(),
        ended,
    };
    console.run().await?;

    log_operation_success!("session");
    Ok(())
}

fn handle_config(
    config_path: Option<&Path>,
    config: &RemitConfig,
    show: bool,
    init: bool,
    validate: bool,
) -> Result<()> {
    if init {
        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => default_config_path()?,
        };
        RemitConfig::default().save_to_file(&path)?;
        println!("✅ Configuration initialized at: {:?}", path);
    }

    if show {
        println!("📋 Current configuration:");
        println!("{}", toml::to_string_pretty(config)?);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e.into());
            }
        }
    }

    if !(init || show || validate) {
        println!("Nothing to do. Use --init, --show or --validate.");
    }
    Ok(())
}

fn print_payload(payload: Option<serde_json::Value>) -> Result<()> {
    match payload {
        Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        None => println!("(no data)"),
    }
    Ok(())
}
