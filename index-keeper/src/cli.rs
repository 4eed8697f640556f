//! Command-line interface.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use index_keeper_repository::{ConnectionConfig, RetryConfig};
use index_keeper_shared::{validate, ConfigError, DesiredState};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{Dependencies, ReconcilerConfig, DEFAULT_PROBE_PREFIX};
use crate::context::RunContext;
use crate::KeeperError;

/// Reconcile search-engine indices and aliases against a declarative config.
#[derive(Parser, Debug)]
#[command(name = "index-keeper")]
#[command(version)]
#[command(
    long_about = "Reads the desired indices and aliases as YAML from standard input (or --file), \
                  validates them and converges the cluster towards them. Re-running with an \
                  unchanged config performs no changes."
)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Read the config from this file instead of standard input
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Pre-check, converge indices, cut over aliases and verify
    Sync,

    /// Validate the config without contacting the cluster
    Validate,
}

/// Cluster connection flags.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Cluster node URLs, comma separated
    #[arg(
        short = 'e',
        long = "url",
        global = true,
        env = "INDEX_KEEPER_URL",
        value_delimiter = ',',
        default_value = index_keeper_repository::config::DEFAULT_URL
    )]
    pub urls: Vec<String>,

    /// Basic auth user
    #[arg(short, long, global = true, env = "INDEX_KEEPER_USER")]
    pub user: Option<String>,

    /// Basic auth password
    #[arg(short, long, global = true, env = "INDEX_KEEPER_PASS", hide_env_values = true)]
    pub pass: Option<String>,

    /// Abort the run after this many seconds
    #[arg(long, global = true, env = "INDEX_KEEPER_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Retries for transient engine failures
    #[arg(long, global = true, env = "INDEX_KEEPER_MAX_RETRIES", default_value_t = 3)]
    pub max_retries: u32,

    /// Prefix of pre-check probe index names
    #[arg(long, global = true, env = "INDEX_KEEPER_PROBE_PREFIX", default_value = DEFAULT_PROBE_PREFIX)]
    pub probe_prefix: String,
}

impl ConnectionArgs {
    pub fn connection_config(&self) -> ConnectionConfig {
        let config = ConnectionConfig::from_urls(&self.urls).with_retry(RetryConfig::new(self.max_retries));
        match (&self.user, &self.pass) {
            (Some(user), pass) => config.with_basic_auth(user, pass.as_deref().unwrap_or_default()),
            (None, _) => config,
        }
    }

    pub fn run_context(&self, cancel: CancellationToken) -> RunContext {
        let ctx = RunContext::new().with_cancellation(cancel);
        match self.timeout_secs {
            Some(secs) => ctx.with_timeout(Duration::from_secs(secs)),
            None => ctx,
        }
    }
}

/// Read the desired state and the directory mapping paths are relative to.
pub fn read_state(file: Option<&Path>) -> Result<(DesiredState, PathBuf), KeeperError> {
    match file {
        Some(path) => {
            let reader = File::open(path).map_err(ConfigError::from)?;
            let state = DesiredState::from_reader(reader)?;
            let base_dir = path
                .parent()
                .filter(|dir| !dir.as_os_str().is_empty())
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            Ok((state, base_dir))
        }
        None => {
            let stdin = io::stdin();
            if stdin.is_terminal() {
                return Err(KeeperError::usage("interactive mode is not supported"));
            }
            let state = DesiredState::from_reader(stdin.lock())?;
            Ok((state, PathBuf::from(".")))
        }
    }
}

/// Execute the parsed command and return the line to print on success.
pub async fn run(cli: Cli, cancel: CancellationToken) -> Result<String, KeeperError> {
    let (state, base_dir) = read_state(cli.file.as_deref())?;

    match cli.command {
        Command::Validate => {
            validate(state, &base_dir).map_err(ConfigError::from)?;
            info!("Config is valid");
            Ok("pass".to_string())
        }
        Command::Sync => {
            let config = ReconcilerConfig::with_probe_prefix(&cli.connection.probe_prefix);
            let deps = Dependencies::new(cli.connection.connection_config(), config)?;
            let ctx = cli.connection.run_context(cancel);
            let report = deps.reconciler.sync_state(state, &base_dir, &ctx).await?;
            Ok(report.summary())
        }
    }
}
