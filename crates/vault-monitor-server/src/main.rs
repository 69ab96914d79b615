//! Vault Monitor Server
//!
//! Web dashboard for creating, verifying and restoring vault database backups
//! through the external backup scripts, and for browsing their logs.

mod error;
mod handlers;
mod response;
mod router;

use anyhow::{Context, Result};
use clap::{builder::FalseyValueParser, Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use vault_monitor_core::config::{
    DEFAULT_BACKUP_DIR, DEFAULT_RESTORE_LOG_DIR, DEFAULT_SCRIPTS_DIR,
    DEFAULT_VERIFICATION_LOG_DIR,
};
use vault_monitor_core::{
    auth, Authenticator, CommandRunner, MonitorConfig, PasswordAuthenticator, ProcessRunner,
    StatusAggregator,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<MonitorConfig>,
    pub runner: Arc<dyn CommandRunner>,
    pub auth: Arc<dyn Authenticator>,
    pub status: Arc<StatusAggregator>,
}

impl AppState {
    pub fn new(
        config: MonitorConfig,
        runner: Arc<dyn CommandRunner>,
        auth: Arc<dyn Authenticator>,
    ) -> Self {
        let config = Arc::new(config);
        let status = Arc::new(StatusAggregator::new(config.clone(), runner.clone()));
        Self {
            config,
            runner,
            auth,
            status,
        }
    }
}

#[derive(Parser)]
#[command(name = "vault-monitor")]
#[command(author, version, about = "Vault backup & restore monitoring dashboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print an Argon2 hash of a password for MONITOR_PASSWORD_HASH
    HashPassword {
        /// Password to hash
        password: String,
    },
}

#[derive(Args)]
struct ServeArgs {
    /// Directory holding *.sql and *.sql.gz backups
    #[arg(long, env = "BACKUP_DIR", default_value = DEFAULT_BACKUP_DIR)]
    backup_dir: PathBuf,

    /// Directory holding restore logs
    #[arg(long, env = "RESTORE_LOG_DIR", default_value = DEFAULT_RESTORE_LOG_DIR)]
    restore_log_dir: PathBuf,

    /// Directory holding verification logs
    #[arg(long, env = "VERIFICATION_LOG_DIR", default_value = DEFAULT_VERIFICATION_LOG_DIR)]
    verification_log_dir: PathBuf,

    /// Directory containing backup-vault.sh, restore-vault.sh and verify-backup.sh
    #[arg(long, env = "SCRIPTS_DIR", default_value = DEFAULT_SCRIPTS_DIR)]
    scripts_dir: PathBuf,

    /// Argon2 hash of the admin password
    #[arg(long, env = "MONITOR_PASSWORD_HASH", hide_env_values = true)]
    password_hash: Option<String>,

    /// Address to listen on
    #[arg(long, env = "MONITOR_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "MONITOR_PORT", default_value_t = 5000)]
    port: u16,

    /// Enable debug logging
    #[arg(long, env = "MONITOR_DEBUG", value_parser = FalseyValueParser::new())]
    debug: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Commands::HashPassword { password }) = &cli.command {
        match auth::hash_password(password) {
            Ok(hash) => println!("{}", hash),
            Err(e) => {
                eprintln!("Failed to hash password: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Set up panic hook to log crashes
    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()));
        tracing::error!("PANIC at {:?}: {}", location, info);
    }));

    let default_level = if cli.serve.debug { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("Starting Vault Monitor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run_server(cli.serve).await {
        error!("Server failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let config = MonitorConfig {
        backup_dir: args.backup_dir,
        restore_log_dir: args.restore_log_dir,
        verification_log_dir: args.verification_log_dir,
        scripts_dir: args.scripts_dir,
    }
    .prepare()
    .context("Failed to prepare directories")?;

    let authenticator = match args.password_hash {
        Some(hash) => PasswordAuthenticator::from_hash(hash)
            .context("MONITOR_PASSWORD_HASH is not a valid Argon2 hash")?,
        None => {
            warn!("MONITOR_PASSWORD_HASH not set, using default password (insecure for production)");
            PasswordAuthenticator::from_password("admin")
                .context("Failed to hash default password")?
        }
    };

    let runner = Arc::new(ProcessRunner::new(config.scripts_dir.clone()));
    let state = AppState::new(config, runner, Arc::new(authenticator));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .context("Failed to parse listen address")?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, router::app(state))
        .await
        .context("Server error")?;

    Ok(())
}
